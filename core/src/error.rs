use crate::assembly::PieceId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("tab size {0} must lie in (0, 0.25)")]
    TabSize(f32),
    #[error("jitter {0} must lie in [0, 0.1)")]
    Jitter(f32),
    #[error("unit {0} must be a positive whole number")]
    Unit(f32),
    #[error("snap distance {0} must be positive and finite")]
    SnapDistance(f32),
    #[error("point divisor must be non-zero")]
    PointDivisor,
    #[error("layout band {0} must be non-negative and finite")]
    Layout(f32),
    #[error("config parse failed: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("piece count {0} is not a perfect square")]
    NotSquare(u32),
    #[error("grid of {0}x{0} is too small, need at least 2x2")]
    TooSmall(u32),
    #[error("expected {expected} placements, got {actual}")]
    PlacementCount { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    #[error("group {0} is already being dragged")]
    AlreadyDragging(usize),
    #[error("unknown piece {0}")]
    UnknownPiece(PieceId),
    #[error("container has no area")]
    DegenerateContainer,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Drag(#[from] DragError),
}

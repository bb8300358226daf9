pub mod assembly;
pub mod clock;
pub mod completion;
pub mod config;
pub mod drag;
pub mod edge;
pub mod error;
pub mod grid;
pub mod input;
pub mod layout;
pub mod outline;
pub mod session;

pub use assembly::{Assembly, GroupId, GroupIndex, MergeEvent, Piece, PieceId, SnapOutcome};
pub use clock::{format_elapsed, SessionTimer};
pub use completion::{CompletionDetector, CompletionEvent};
pub use config::{EngineConfig, LayoutSettings, ScoringRules, ShapeSettings, SnapRules};
pub use drag::DragController;
pub use edge::{Axis, CurvePoint, EdgeCurve, EdgeMap, EdgeParams};
pub use error::{ConfigError, DragError, EngineError, GridError};
pub use grid::{Cell, Grid, PuzzleSpec};
pub use input::{Letterbox, PointerInputMapper, Size};
pub use layout::{home_position, scatter_layout, solved_layout, Placement};
pub use outline::{build_outlines, PieceOutline, Point, Side, SideKind, Span};
pub use session::{RenderPiece, Session, SnapReport};

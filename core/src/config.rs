use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const TAB_SIZE_DEFAULT: f32 = 0.1;
pub const TAB_SIZE_MAX: f32 = 0.25;
pub const JITTER_DEFAULT: f32 = 0.04;
pub const JITTER_MAX: f32 = 0.1;

pub const UNIT_DEFAULT: f32 = 50.0;
pub const SNAP_DISTANCE_DEFAULT: f32 = 15.0;

pub const MERGE_AWARD_DEFAULT: u32 = 50;
pub const BASE_BONUS_DEFAULT: u32 = 500;
pub const BONUS_DECAY_DEFAULT: u32 = 2;
pub const POINT_DIVISOR_DEFAULT: u32 = 10;

pub const TRAY_GAP_DEFAULT: f32 = 30.0;
pub const TRAY_DEPTH_DEFAULT: f32 = 80.0;
pub const TRAY_HEIGHT_DEFAULT: f32 = 140.0;

pub const HIGHLIGHT_MS_DEFAULT: u64 = 600;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeSettings {
    pub tab_size: f32,
    pub jitter: f32,
}

impl Default for ShapeSettings {
    fn default() -> Self {
        Self {
            tab_size: TAB_SIZE_DEFAULT,
            jitter: JITTER_DEFAULT,
        }
    }
}

impl ShapeSettings {
    /// Tabs wider than a quarter of the edge, or jitter of a tenth or more,
    /// can fold the outline over itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tab_size > 0.0 && self.tab_size < TAB_SIZE_MAX) {
            return Err(ConfigError::TabSize(self.tab_size));
        }
        if !(self.jitter >= 0.0 && self.jitter < JITTER_MAX) {
            return Err(ConfigError::Jitter(self.jitter));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapRules {
    pub unit: f32,
    pub snap_distance: f32,
}

impl Default for SnapRules {
    fn default() -> Self {
        Self {
            unit: UNIT_DEFAULT,
            snap_distance: SNAP_DISTANCE_DEFAULT,
        }
    }
}

impl SnapRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Merged groups are kept on integer coordinates, so the cell pitch
        // has to be integral too.
        if !(self.unit.is_finite() && self.unit >= 1.0 && self.unit.fract() == 0.0) {
            return Err(ConfigError::Unit(self.unit));
        }
        if !(self.snap_distance.is_finite() && self.snap_distance > 0.0) {
            return Err(ConfigError::SnapDistance(self.snap_distance));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub merge_award: u32,
    pub base_bonus: u32,
    pub bonus_decay_per_second: u32,
    pub point_divisor: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            merge_award: MERGE_AWARD_DEFAULT,
            base_bonus: BASE_BONUS_DEFAULT,
            bonus_decay_per_second: BONUS_DECAY_DEFAULT,
            point_divisor: POINT_DIVISOR_DEFAULT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub tray_gap: f32,
    pub tray_depth: f32,
    pub tray_height: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            tray_gap: TRAY_GAP_DEFAULT,
            tray_depth: TRAY_DEPTH_DEFAULT,
            tray_height: TRAY_HEIGHT_DEFAULT,
        }
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for value in [self.tray_gap, self.tray_depth, self.tray_height] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Layout(value));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub shape: ShapeSettings,
    pub snap: SnapRules,
    pub scoring: ScoringRules,
    pub layout: LayoutSettings,
    pub highlight_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shape: ShapeSettings::default(),
            snap: SnapRules::default(),
            scoring: ScoringRules::default(),
            layout: LayoutSettings::default(),
            highlight_ms: HIGHLIGHT_MS_DEFAULT,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shape.validate()?;
        self.snap.validate()?;
        if self.scoring.point_divisor == 0 {
            return Err(ConfigError::PointDivisor);
        }
        self.layout.validate()
    }
}

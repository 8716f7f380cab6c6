use bevy::prelude::*;
use bits_helpers::config::{
    ensure_board_size, ensure_non_negative, ensure_positive, ConfigError, Validate,
};
use serde::{Deserialize, Serialize};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub width: u32,
    pub height: u32,
    /// Seconds between two level-1 spawns.
    pub spawn_interval: f32,
    /// Seconds for a spawned piece to drop into its cell.
    pub spawn_drop_duration: f32,
    /// Piece scale is `base_scale + level * scale_per_level` of a cell.
    pub base_scale: f32,
    pub scale_per_level: f32,
    pub seed: Option<u64>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            width: 5,
            height: 6,
            spawn_interval: 3.0,
            spawn_drop_duration: 0.4,
            base_scale: 0.8,
            scale_per_level: 0.1,
            seed: None,
        }
    }
}

impl MergeConfig {
    pub const fn capacity(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn piece_scale(&self, level: u32) -> f32 {
        (level as f32).mul_add(self.scale_per_level, self.base_scale)
    }
}

impl Validate for MergeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        ensure_board_size(self.width, self.height)?;
        ensure_positive("spawn_interval", self.spawn_interval)?;
        ensure_non_negative("spawn_drop_duration", self.spawn_drop_duration)?;
        ensure_positive("base_scale", self.base_scale)?;
        ensure_non_negative("scale_per_level", self.scale_per_level)
    }
}

#[cfg(test)]
mod tests {
    use bits_helpers::config::from_ron_str;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MergeConfig::default();
        assert!(config.validate().is_ok(), "defaults validate");
        assert_eq!(config.capacity(), 30, "5x6 board");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = MergeConfig {
            spawn_interval: 0.0,
            ..default()
        };
        assert!(
            matches!(config.validate(), Err(ConfigError::Invalid(_))),
            "a spawn every frame is not a setting"
        );
    }

    #[test]
    fn oversized_board_is_rejected() {
        let config = MergeConfig {
            width: 70_000,
            height: 70_000,
            ..default()
        };
        assert!(
            matches!(config.validate(), Err(ConfigError::Invalid(_))),
            "cell count must not wrap"
        );
    }

    #[test]
    fn pieces_grow_with_level() {
        let config = MergeConfig::default();
        assert!((config.piece_scale(1) - 0.9).abs() < 1e-6, "level one");
        assert!(config.piece_scale(3) > config.piece_scale(2), "grows");
    }

    #[test]
    fn ron_overrides_keep_other_defaults() {
        let config: MergeConfig = from_ron_str("(spawn_interval: 1.5)").unwrap();
        assert!((config.spawn_interval - 1.5).abs() < f32::EPSILON, "override");
        assert_eq!(config.width, 5, "default kept");
    }
}

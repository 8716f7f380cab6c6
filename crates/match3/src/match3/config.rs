use bevy::prelude::*;
use bits_helpers::config::{
    ensure_at_least, ensure_board_size, ensure_non_negative, ensure_positive, ConfigError,
    Validate,
};
use serde::{Deserialize, Serialize};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Match3Config {
    pub width: u32,
    pub height: u32,
    /// Number of tile kinds, kinds are `0..kinds`. A single kind would match forever.
    pub kinds: u32,
    /// World units the pointer must travel before a drag counts as a swipe.
    pub swipe_threshold: f32,
    /// Seconds for one swap slide.
    pub swap_duration: f32,
    /// Extra delay per cell a tile falls.
    pub fall_base_delay: f32,
    /// Stagger between refilled columns.
    pub column_spawn_delay: f32,
    /// Seconds for a refilled tile to drop into place.
    pub spawn_drop_duration: f32,
    /// Pause after each refill before cascades are resolved.
    pub settle_delay: f32,
    /// Per tile stagger of the initial fill.
    pub fill_stagger: f32,
    /// Pause after the initial fill before input is accepted.
    pub fill_settle: f32,
    /// Fixed RNG seed, random when absent.
    pub seed: Option<u64>,
}

impl Default for Match3Config {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
            kinds: 6,
            swipe_threshold: 0.25,
            swap_duration: 0.12,
            fall_base_delay: 0.03,
            column_spawn_delay: 0.06,
            spawn_drop_duration: 0.12,
            settle_delay: 0.05,
            fill_stagger: 0.01,
            fill_settle: 0.08,
            seed: None,
        }
    }
}

impl Match3Config {
    pub const fn capacity(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Validate for Match3Config {
    fn validate(&self) -> Result<(), ConfigError> {
        ensure_board_size(self.width, self.height)?;
        ensure_at_least("kinds", self.kinds, 2)?;
        ensure_positive("swipe_threshold", self.swipe_threshold)?;
        for (name, value) in [
            ("swap_duration", self.swap_duration),
            ("fall_base_delay", self.fall_base_delay),
            ("column_spawn_delay", self.column_spawn_delay),
            ("spawn_drop_duration", self.spawn_drop_duration),
            ("settle_delay", self.settle_delay),
            ("fill_stagger", self.fill_stagger),
            ("fill_settle", self.fill_settle),
        ] {
            ensure_non_negative(name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Match3Config::default().validate().is_ok(), "default config");
    }

    #[test]
    fn rejects_empty_board_and_bad_threshold() {
        let config = Match3Config {
            width: 0,
            ..default()
        };
        assert!(config.validate().is_err(), "zero width");

        let config = Match3Config {
            swipe_threshold: 0.0,
            ..default()
        };
        assert!(config.validate().is_err(), "zero threshold");

        let config = Match3Config {
            settle_delay: -1.0,
            ..default()
        };
        assert!(config.validate().is_err(), "negative delay");
    }

    #[test]
    fn single_kind_is_rejected() {
        let config = Match3Config {
            kinds: 1,
            ..default()
        };
        assert!(
            matches!(config.validate(), Err(ConfigError::Invalid(_))),
            "one kind never stops cascading"
        );
        let config = Match3Config {
            kinds: 2,
            ..default()
        };
        assert!(config.validate().is_ok(), "two kinds settle");
    }

    #[test]
    fn oversized_board_is_rejected() {
        let err = bits_helpers::config::from_ron_str::<Match3Config>("(width: 70000, height: 70000)")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {err}");
    }

    #[test]
    fn parses_partial_ron() {
        let config: Match3Config =
            bits_helpers::config::from_ron_str("(width: 6, kinds: 4, seed: Some(7))").unwrap();
        assert_eq!(config.width, 6, "width");
        assert_eq!(config.height, 8, "height defaulted");
        assert_eq!(config.kinds, 4, "kinds");
        assert_eq!(config.seed, Some(7), "seed");
    }
}

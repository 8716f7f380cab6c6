use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Sanity checks run on every config before a game is built from it.
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

pub fn from_ron_str<T: DeserializeOwned + Validate>(source: &str) -> Result<T, ConfigError> {
    let config: T = ron::from_str(source)?;
    config.validate()?;
    Ok(config)
}

pub fn load_ron<T: DeserializeOwned + Validate>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let source = fs::read_to_string(path)?;
    from_ron_str(&source)
}

/// Shared helpers for `Validate` impls.
pub fn ensure_positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

pub fn ensure_non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must not be negative, got {value}"
        )))
    }
}

pub fn ensure_at_least(name: &str, value: u32, min: u32) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be at least {min}, got {value}"
        )))
    }
}

/// Largest board any game accepts, in cells.
pub const MAX_BOARD_CELLS: u32 = 4096;

/// Both sides at least one cell and the whole board within `MAX_BOARD_CELLS`.
pub fn ensure_board_size(width: u32, height: u32) -> Result<(), ConfigError> {
    ensure_at_least("width", width, 1)?;
    ensure_at_least("height", height, 1)?;
    match width.checked_mul(height) {
        Some(cells) if cells <= MAX_BOARD_CELLS => Ok(()),
        _ => Err(ConfigError::Invalid(format!(
            "a {width}x{height} board exceeds {MAX_BOARD_CELLS} cells"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize, Debug, PartialEq)]
    #[serde(default)]
    struct Sample {
        width: u32,
        speed: f32,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                width: 4,
                speed: 1.0,
            }
        }
    }

    impl Validate for Sample {
        fn validate(&self) -> Result<(), ConfigError> {
            ensure_at_least("width", self.width, 1)?;
            ensure_positive("speed", self.speed)
        }
    }

    #[test]
    fn missing_fields_take_defaults() {
        let sample: Sample = from_ron_str("(speed: 2.5)").unwrap();
        assert_eq!(
            sample,
            Sample {
                width: 4,
                speed: 2.5
            },
            "width defaulted"
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = from_ron_str::<Sample>("(width: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {err}");
    }

    #[test]
    fn syntax_errors_are_parse_errors() {
        let err = from_ron_str::<Sample>("(width: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {err}");
    }

    #[test]
    fn board_size_is_bounded() {
        assert!(ensure_board_size(64, 64).is_ok(), "exactly the limit");
        assert!(
            matches!(ensure_board_size(65, 64), Err(ConfigError::Invalid(_))),
            "one column too many"
        );
        assert!(
            matches!(ensure_board_size(70_000, 70_000), Err(ConfigError::Invalid(_))),
            "cell count overflows u32"
        );
        assert!(ensure_board_size(0, 8).is_err(), "empty board");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_ron::<Sample>("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)), "got {err}");
    }
}

use bits_helpers::config::{ConfigError, Validate};
use clap::ValueEnum;
use match3::prelude::Match3Config;
use merge::prelude::MergeConfig;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Game {
    Match3,
    Merge,
}

impl Game {
    pub const fn description(self) -> &'static str {
        match self {
            Self::Match3 => "Swipe tiles to line up three or more of a kind",
            Self::Merge => "Drag equal pieces together to level them up",
        }
    }

    pub fn run(self, config: GameConfig) {
        match self {
            Self::Match3 => match3::run_with(config.match3),
            Self::Merge => merge::run_with(config.merge),
        }
    }
}

/// Settings of every game, one section each.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub match3: Match3Config,
    pub merge: MergeConfig,
}

impl Validate for GameConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.match3.validate()?;
        self.merge.validate()
    }
}

#[cfg(test)]
mod tests {
    use bits_helpers::config::from_ron_str;

    use super::*;

    #[test]
    fn names_match_the_command_line() {
        assert_eq!(Game::Match3.to_string(), "match3", "match3");
        assert_eq!(Game::Merge.to_string(), "merge", "merge");
        assert_eq!(Game::from_str("merge", true), Ok(Game::Merge), "parsed by clap");
    }

    #[test]
    fn sections_are_optional() {
        let config: GameConfig = from_ron_str("(merge: (width: 4))").unwrap();
        assert_eq!(config.merge.width, 4, "override");
        assert_eq!(config.merge.height, 6, "merge default");
        assert_eq!(config.match3, Match3Config::default(), "match3 untouched");
    }

    #[test]
    fn invalid_sections_fail_the_whole_file() {
        let result = from_ron_str::<GameConfig>("(match3: (kinds: 0))");
        assert!(matches!(result, Err(ConfigError::Invalid(_))), "zero kinds");
    }
}

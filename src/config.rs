use std::{fmt, path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard]
    }

    /// Frames between two steps of the snake.
    pub fn movement_period(self) -> u32 {
        match self {
            Difficulty::Easy => 8,
            Difficulty::Normal => 6,
            Difficulty::Hard => 4,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        };
        f.write_str(name)
    }
}

#[derive(Parser, Debug)]
#[command(about = "A snake that only remembers where it turned")]
pub struct Args {
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240), help = "frames per second")]
    pub fps: u32,

    #[arg(short, long, value_enum, default_value_t = Difficulty::Normal, help = "difficulty selected in the start menu")]
    pub difficulty: Difficulty,

    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..), help = "frames per step, overrides any difficulty")]
    pub period: Option<u32>,

    #[arg(short, long, default_value_t = 6, value_parser = clap::value_parser!(i32).range(1..=40), help = "initial body length in cells, head excluded")]
    pub length: i32,

    #[arg(long, help = "write logs here (filtered by RUST_LOG)")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub fps: u32,
    pub difficulty: Difficulty,
    pub period: Option<u32>,
    pub initial_length: i32,
}

impl Args {
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            fps: self.fps,
            difficulty: self.difficulty,
            period: self.period,
            initial_length: self.length,
        }
    }
}

impl GameConfig {
    /// Frames per step when playing at `difficulty`, unless a fixed period
    /// was asked for.
    pub fn movement_period(&self, difficulty: Difficulty) -> u32 {
        self.period.unwrap_or_else(|| difficulty.movement_period())
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig { fps: 60, difficulty: Difficulty::Normal, period: None, initial_length: 6 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_normal_difficulty() {
        let args = Args::parse_from(["snake"]);
        assert_eq!(args.game_config(), GameConfig::default());
        assert_eq!(args.game_config().movement_period(Difficulty::Normal), 6);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn period_overrides_difficulty() {
        let config = Args::parse_from(["snake", "--difficulty", "hard"]).game_config();
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.movement_period(config.difficulty), 4);
        assert_eq!(config.movement_period(Difficulty::Easy), 8);

        let config = Args::parse_from(["snake", "--difficulty", "hard", "--period", "10"]).game_config();
        assert_eq!(config.movement_period(Difficulty::Hard), 10);
        assert_eq!(config.movement_period(Difficulty::Easy), 10);
    }

    #[test]
    fn rejects_zero_fps() {
        assert!(Args::try_parse_from(["snake", "--fps", "0"]).is_err());
    }

    #[test]
    fn rejects_zero_length() {
        assert!(Args::try_parse_from(["snake", "--length", "0"]).is_err());
        assert_eq!(Args::parse_from(["snake", "--length", "1"]).length, 1);
    }

    #[test]
    fn frame_time_survives_zero_fps() {
        let config = GameConfig { fps: 0, ..GameConfig::default() };
        assert_eq!(config.frame_time(), Duration::from_secs(1));

        let config = GameConfig { fps: 50, ..GameConfig::default() };
        assert_eq!(config.frame_time(), Duration::from_millis(20));
    }
}

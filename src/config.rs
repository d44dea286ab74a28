// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;

use crate::engine::candidate::Mode;
use crate::engine::config::DEFAULT_SESSION_SECONDS;
use crate::error::ConfigError;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Which guessing game to play.
    pub mode: Mode,
    /// Candidate data file for the mode.
    pub data_path: PathBuf,
    /// Local mirror of the image CDN. When unset every image is accepted.
    pub assets_dir: Option<PathBuf>,
    /// Length of one session in seconds.
    pub session_seconds: u32,
    /// Fixed RNG seed for reproducible round order.
    pub seed: Option<u64>,
    /// Print Prometheus metrics on exit.
    pub print_metrics: bool,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `TFTDLE_MODE` - `trait`, `tactician` or `augment` (default: `trait`)
    /// - `TFTDLE_DATA` - Candidate JSON file (default: `data/<mode>s.json`)
    /// - `TFTDLE_ASSETS` - Directory of downloaded images
    /// - `TFTDLE_SECONDS` - Session length (default: 60)
    /// - `TFTDLE_SEED` - RNG seed
    ///
    /// CLI flags override the environment:
    /// `--mode`, `--data`, `--assets`, `--seconds`, `--seed`, `--metrics`.
    pub fn load() -> Result<Self, ConfigError> {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Build a config from explicit arguments and an environment lookup.
    pub fn from_sources(
        args: &[String],
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |flag: &str, var: &str| Self::parse_cli_value(args, flag).or_else(|| env(var));

        let mode = match lookup("--mode", "TFTDLE_MODE") {
            Some(v) => v.parse()?,
            None => Mode::Trait,
        };

        let data_path = lookup("--data", "TFTDLE_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("data/{}s.json", mode.as_str())));

        let assets_dir = lookup("--assets", "TFTDLE_ASSETS").map(PathBuf::from);

        let session_seconds = match lookup("--seconds", "TFTDLE_SECONDS") {
            Some(v) => match v.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        key: "session seconds",
                        value: v,
                    })
                }
            },
            None => DEFAULT_SESSION_SECONDS,
        };

        let seed = match lookup("--seed", "TFTDLE_SEED") {
            Some(v) => Some(v.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                key: "seed",
                value: v.clone(),
            })?),
            None => None,
        };

        let print_metrics = args.iter().any(|a| a == "--metrics");

        Ok(Config {
            mode,
            data_path,
            assets_dir,
            session_seconds,
            seed,
            print_metrics,
        })
    }

    /// Parse a CLI flag value like `--mode augment`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}

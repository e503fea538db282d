use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::BoxedErrorTrait;

/// Looked up in the working directory when no explicit path is given
pub const CONFIG_FILE_PATH: &'static str = "prover.toml";

/// Tuning knobs for the verifier. Every key is optional in the file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How many times equality analysis may chain through `=` facts
    pub equality_depth: usize,
    /// Placeholders `_0` up to `_{n-1}` are usable in theorem reference arguments
    pub placeholder_slots: usize,
    /// Whether the command line prints the facts visible at each `check`
    pub print_checks: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            equality_depth: 2,
            placeholder_slots: 5,
            print_checks: true,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, BoxedErrorTrait> {
        let buf = fs::read_to_string(path)?;
        let config = Config::from_toml(&buf)?;
        Ok(config)
    }
    pub fn from_toml(source: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(source)
    }
    /// Load `prover.toml` if it exists, otherwise use the defaults
    pub fn discover() -> Result<Config, BoxedErrorTrait> {
        let path = Path::new(CONFIG_FILE_PATH);
        if path.exists() {
            debug!("loading configuration from {}", path.display());
            Config::load(path)
        } else {
            Ok(Config::default())
        }
    }
}

// Profile configuration from ~/.echome/config.yaml, with environment
// overrides for scripting.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;

pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Config {
    /// Reads the config file if it exists. A missing file is an empty
    /// config; commands then rely on the environment.
    pub fn load() -> CliResult<Self> {
        let Some(path) = config_path() else {
            return Ok(Config::default());
        };
        if !path.is_file() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }
}

/// Connection settings after the profile file and environment are merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: String,
    pub token: Option<String>,
    pub format: OutputFormat,
}

pub fn resolve_settings(profile: Option<&str>) -> CliResult<Settings> {
    let config = Config::load()?;
    let name = profile.unwrap_or(DEFAULT_PROFILE);
    let entry = match config.profile(name) {
        Some(entry) => entry.clone(),
        None if name != DEFAULT_PROFILE => {
            return Err(CliError::Config(format!(
                "profile '{}' not found in ~/.echome/config.yaml",
                name
            )));
        }
        None => Profile::default(),
    };

    let server = env::var("ECHOME_SERVER")
        .ok()
        .or(entry.server)
        .ok_or_else(|| {
            CliError::Config(
                "no server configured; set ECHOME_SERVER or add a profile to ~/.echome/config.yaml"
                    .to_string(),
            )
        })?;
    let token = env::var("ECHOME_TOKEN").ok().or(entry.token);
    let format = entry.format.unwrap_or(OutputFormat::Table);

    Ok(Settings {
        server,
        token,
        format,
    })
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".echome").join("config.yaml"))
}

/// `fixtura.toml`: marker registration and strictness.
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{runner::RunOptions, Selection};

pub const FILE_NAME: &str = "fixtura.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub strict_markers: bool,
    /// Registered markers and their description.
    #[serde(default)]
    pub markers: BTreeMap<String, String>,
}

impl Config {
    pub fn parse(path: impl AsRef<Path>, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.as_ref().to_owned(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "load config");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(path, &content)
    }

    /// Load `path` if given, otherwise `fixtura.toml` in `dir` when present.
    /// A missing default file just means the default configuration.
    pub fn discover(path: Option<&Path>, dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = dir.as_ref().join(FILE_NAME);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn run_options(&self, selection: Selection) -> RunOptions {
        RunOptions::new(selection)
            .strict_markers(self.strict_markers)
            .register_markers(self.markers.keys().cloned())
    }
}

use crate::error::{CurveError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "xpcurve.toml";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub product: String,
    pub region: String,
    /// `{region}` and `{product}` are substituted before the request.
    pub version_url: String,
    pub mirror_root: PathBuf,
    /// gametables/xp.txt
    pub xp_file_id: u32,
    /// dbfilesclient/questxp.db2
    pub reward_file_id: u32,
    pub document: PathBuf,
    pub state_file: PathBuf,
    pub signal_env: String,
    /// Resolved from `signal_env` at start-up, never read from the file.
    #[serde(skip)]
    pub signal_sink: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            product: "wow".into(),
            region: "us".into(),
            version_url: "http://{region}.patch.battle.net:1119/{product}/versions".into(),
            mirror_root: PathBuf::from("casc-mirror"),
            xp_file_id: 1391661,
            reward_file_id: 1139378,
            document: PathBuf::from("Monitor.lua"),
            state_file: PathBuf::from("buildInfo.txt"),
            signal_env: "GITHUB_OUTPUT".into(),
            signal_sink: None,
        }
    }
}

impl Config {
    /// Load `path` if it exists, else fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text)
                .map_err(|e| CurveError::Config(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CurveError::Config(e.to_string()))
    }

    pub fn with_signal_sink(mut self, sink: Option<PathBuf>) -> Self {
        self.signal_sink = sink.filter(|p| !p.as_os_str().is_empty());
        self
    }
}

//! Persisted build record and the orchestration signal.

use crate::domain::BuildVersion;
use crate::error::Result;
use crate::util::atomic::write_atomic;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct RunRecorder {
    pub state_file: PathBuf,
    pub signal_sink: Option<PathBuf>,
}

impl RunRecorder {
    pub fn new(state_file: impl Into<PathBuf>, signal_sink: Option<PathBuf>) -> Self {
        Self {
            state_file: state_file.into(),
            signal_sink,
        }
    }

    /// Last recorded build; `None` on first run or when the file holds nothing.
    pub fn previous(&self) -> Result<Option<BuildVersion>> {
        match std::fs::read_to_string(&self.state_file) {
            Ok(s) => Ok(BuildVersion::new(s).ok()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn record_success(&self, build: &BuildVersion) -> Result<()> {
        write_atomic(&self.state_file, build.as_str().as_bytes())?;
        Ok(())
    }

    /// Append `updated=true` / `build=<id>` to the sink. Returns false when no sink is set.
    pub fn emit_signal(&self, build: &BuildVersion) -> Result<bool> {
        let Some(sink) = &self.signal_sink else {
            return Ok(false);
        };
        let mut f = OpenOptions::new().create(true).append(true).open(sink)?;
        write!(f, "updated=true\nbuild={build}\n")?;
        f.flush()?;
        Ok(true)
    }
}

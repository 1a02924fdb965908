use std::path::{Path, PathBuf};

use tracing::info;
use xpcurve_core::archive::{Backend, OpenParams, open_archive};
use xpcurve_core::config::{CONFIG_FILE, Config};
use xpcurve_core::error::Result;
use xpcurve_core::table::reward::CsvTableDecoder;
use xpcurve_core::version::PatchServer;
use xpcurve_core::{Collaborators, RunOutcome, run};

/// Config from `xpcurve.toml` (if any) plus the signal sink named by its `signal_env`.
pub fn load_config(path: &Path) -> Result<Config> {
    let cfg = Config::load(path)?;
    let sink = std::env::var_os(&cfg.signal_env).map(PathBuf::from);
    Ok(cfg.with_signal_sink(sink))
}

pub fn handle_update(force: bool) -> Result<()> {
    let config = load_config(Path::new(CONFIG_FILE))?;
    let versions = PatchServer::new(config.version_url.clone())?;
    let archive = open_archive(
        Backend::Fs,
        OpenParams {
            root: config.mirror_root.clone(),
        },
    )?;
    let collab = Collaborators {
        versions: &versions,
        archive: &*archive,
        decoder: &CsvTableDecoder,
    };

    match run(&config, force, &collab)? {
        RunOutcome::UpToDate(build) => info!(%build, "nothing to do"),
        RunOutcome::Updated { build, rows } => info!(%build, rows, "experience data updated"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &p,
            "product = \"wow_classic\"\nsignal_env = \"XPCURVE_TEST_UNSET_SINK\"\n",
        )
        .unwrap();
        let cfg = load_config(&p).unwrap();
        assert_eq!(cfg.product, "wow_classic");
        assert!(cfg.signal_sink.is_none());
    }
}

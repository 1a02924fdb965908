//! One batch run: gate on the build, fetch both tables, build the curve,
//! splice it into the document and record the build.

use std::path::Path;

use tracing::info;

use crate::archive::{ContentArchive, fetch_file};
use crate::config::Config;
use crate::curve;
use crate::domain::BuildVersion;
use crate::error::{CurveError, Result};
use crate::gate::should_run;
use crate::record::RunRecorder;
use crate::splice::{Markers, render, splice};
use crate::table::reward::TableDecoder;
use crate::table::xp::XpTable;
use crate::util::atomic::write_atomic;
use crate::version::VersionSource;

pub struct Collaborators<'a> {
    pub versions: &'a dyn VersionSource,
    pub archive: &'a dyn ContentArchive,
    pub decoder: &'a dyn TableDecoder,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    UpToDate(BuildVersion),
    Updated { build: BuildVersion, rows: usize },
}

pub fn run(config: &Config, force: bool, c: &Collaborators<'_>) -> Result<RunOutcome> {
    let current = c.versions.current(&config.product, &config.region)?;
    let recorder = RunRecorder::new(&config.state_file, config.signal_sink.clone());
    let previous = recorder.previous()?;

    if !should_run(previous.as_ref(), &current, force) {
        info!(build = %current, "build is up to date");
        return Ok(RunOutcome::UpToDate(current));
    }

    info!(build = %current, previous = ?previous.as_ref().map(BuildVersion::as_str), "loading files");
    let (xp_bytes, reward_bytes) = rayon::join(
        || fetch_file(c.archive, &current, config.xp_file_id),
        || fetch_file(c.archive, &current, config.reward_file_id),
    );
    let (xp_bytes, reward_bytes) = (xp_bytes?, reward_bytes?);
    info!(
        xp_bytes = xp_bytes.len(),
        reward_bytes = reward_bytes.len(),
        "loaded files"
    );

    info!("parsing files");
    let xp_text = std::str::from_utf8(&xp_bytes)
        .map_err(|e| CurveError::Format(format!("xp table is not UTF-8: {e}")))?;
    let xp = XpTable::parse(xp_text)?;
    let rewards = c.decoder.decode(&reward_bytes)?;
    let rows = curve::build(&xp, &*rewards)?;
    info!(rows = rows.len(), level_cap = ?xp.level_cap, "parsed files");

    info!(document = %config.document.display(), "updating document");
    update_document(&config.document, &render(&rows), &Markers::default())?;
    info!("updated document");

    recorder.record_success(&current)?;
    if recorder.emit_signal(&current)? {
        info!(build = %current, "signalled update");
    }
    info!(build = %current, "recorded build");

    Ok(RunOutcome::Updated {
        build: current,
        rows: rows.len(),
    })
}

fn update_document(path: &Path, rendered: &str, markers: &Markers) -> Result<()> {
    let text = std::fs::read_to_string(path)?;
    let updated = splice(&text, rendered, markers)?;
    write_atomic(path, updated.as_bytes())?;
    Ok(())
}

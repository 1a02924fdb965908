use crate::domain::BuildVersion;

/// Whether a run with `current` has work to do.
pub fn should_run(previous: Option<&BuildVersion>, current: &BuildVersion, force: bool) -> bool {
    force || previous != Some(current)
}

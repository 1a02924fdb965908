// xpcurve_core/src/archive/mod.rs
use crate::domain::BuildVersion;
use crate::error::{CurveError, Result};
use crate::util::hex::parse_hex_array;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

pub mod fs;

pub const KEY_LEN: usize = 32;

/// Content address of a file: blake3 of its decoded bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentKey(pub [u8; KEY_LEN]);

impl ContentKey {
    pub fn of(content: &[u8]) -> Self {
        Self(*blake3::hash(content).as_bytes())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for ContentKey {
    type Err = CurveError;
    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(parse_hex_array::<KEY_LEN>(s)?))
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Game-content archive addressed by build and numeric file id.
pub trait ContentArchive: Send + Sync {
    /// Keys of `file_id` as shipped in `build`. An archive that does not hold
    /// `build` at all must fail rather than answer from another build.
    fn content_keys(&self, build: &BuildVersion, file_id: u32) -> Result<Vec<ContentKey>>;

    fn read(&self, key: &ContentKey) -> Result<Vec<u8>>;
}

#[derive(Clone, Debug)]
pub struct OpenParams {
    pub root: PathBuf,
}

pub enum Backend {
    Fs,
}

pub fn open_archive(backend: Backend, p: OpenParams) -> Result<Box<dyn ContentArchive>> {
    match backend {
        Backend::Fs => Ok(Box::new(fs::FsMirror::open(p.root)?)),
    }
}

/// Resolve `file_id` of `build` to its first content key and read it. No keys
/// or an empty file are both fatal.
pub fn fetch_file(
    archive: &dyn ContentArchive,
    build: &BuildVersion,
    file_id: u32,
) -> Result<Vec<u8>> {
    let keys = archive.content_keys(build, file_id)?;
    let key = keys.first().ok_or_else(|| {
        CurveError::Precondition(format!(
            "no content keys found for file {file_id} in build {build}"
        ))
    })?;
    if keys.len() > 1 {
        warn!(file_id, count = keys.len(), "several content keys, using the first");
    }
    debug!(file_id, ckey = %key, "reading file");
    let bytes = archive.read(key)?;
    if bytes.is_empty() {
        return Err(CurveError::Precondition(format!(
            "file {file_id} ({key}) is empty"
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemArchive {
        keys: HashMap<u32, Vec<ContentKey>>,
        blobs: HashMap<ContentKey, Vec<u8>>,
    }

    impl MemArchive {
        fn add(&mut self, id: u32, content: &[u8]) {
            let k = ContentKey::of(content);
            self.keys.entry(id).or_default().push(k);
            self.blobs.insert(k, content.to_vec());
        }
    }

    impl ContentArchive for MemArchive {
        fn content_keys(&self, _build: &BuildVersion, file_id: u32) -> Result<Vec<ContentKey>> {
            Ok(self.keys.get(&file_id).cloned().unwrap_or_default())
        }
        fn read(&self, key: &ContentKey) -> Result<Vec<u8>> {
            self.blobs
                .get(key)
                .cloned()
                .ok_or_else(|| CurveError::Precondition(format!("unknown key {key}")))
        }
    }

    fn build() -> BuildVersion {
        BuildVersion::new("56008").unwrap()
    }

    #[test]
    fn key_hex_round_trips_and_rejects_wrong_length() {
        let k = ContentKey::of(b"xp");
        assert_eq!(k.to_string().parse::<ContentKey>().unwrap(), k);
        assert!("abcd".parse::<ContentKey>().is_err());
        assert!("zz".repeat(32).parse::<ContentKey>().is_err());
    }

    #[test]
    fn fetch_uses_first_key() {
        let mut a = MemArchive::default();
        a.add(7, b"first");
        a.add(7, b"second");
        assert_eq!(fetch_file(&a, &build(), 7).unwrap(), b"first");
    }

    #[test]
    fn fetch_without_keys_or_with_empty_file_fails() {
        let mut a = MemArchive::default();
        a.add(8, b"");
        assert!(matches!(fetch_file(&a, &build(), 7), Err(CurveError::Precondition(_))));
        assert!(matches!(fetch_file(&a, &build(), 8), Err(CurveError::Precondition(_))));
    }
}

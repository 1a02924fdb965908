//! Local content-addressed mirror of the game archive.
//!
//! Layout under the mirror root:
//!
//! ```text
//! builds/<build>/index.txt  <file id>\t<content key hex>, one per line, '#' comments
//! data/<hh>/<key hex>       blob, raw or zstd-compressed, shared by all builds
//! ```
//!
//! A build without an index directory has not been mirrored.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use super::{ContentArchive, ContentKey};
use crate::codec::{CodecId, decode_blob, encode_blob};
use crate::domain::BuildVersion;
use crate::error::{CurveError, Result};
use crate::util::atomic::write_atomic;

pub const BUILDS_DIR: &str = "builds";
pub const INDEX_FILE: &str = "index.txt";
pub const DATA_DIR: &str = "data";

pub struct FsMirror {
    root: PathBuf,
}

impl FsMirror {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CurveError::Precondition(format!(
                "mirror root {} is not a directory",
                root.display()
            )));
        }
        debug!(root = %root.display(), "opened mirror");
        Ok(Self { root })
    }

    /// Open `root`, creating it when missing.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join(DATA_DIR))?;
        Self::open(root)
    }

    fn build_dir(&self, build: &BuildVersion) -> Result<PathBuf> {
        let id = build.as_str();
        let safe = !id.starts_with('.')
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !safe {
            return Err(CurveError::Precondition(format!(
                "build id {id:?} cannot name a mirror directory"
            )));
        }
        Ok(self.root.join(BUILDS_DIR).join(id))
    }

    fn blob_path(&self, key: &ContentKey) -> PathBuf {
        let hex = key.to_hex();
        self.root.join(DATA_DIR).join(&hex[..2]).join(hex)
    }

    fn load_index(&self, build: &BuildVersion) -> Result<Option<BTreeMap<u32, Vec<ContentKey>>>> {
        let path = self.build_dir(build)?.join(INDEX_FILE);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(parse_index(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store `content` as `file_id` of `build` and register it in that build's index.
    pub fn put(
        &mut self,
        build: &BuildVersion,
        file_id: u32,
        content: &[u8],
        codec: CodecId,
    ) -> Result<ContentKey> {
        let key = ContentKey::of(content);
        let path = self.blob_path(&key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_atomic(&path, &encode_blob(content, codec)?)?;

        let known = self
            .load_index(build)?
            .and_then(|idx| idx.get(&file_id).map(|keys| keys.contains(&key)))
            .unwrap_or(false);
        if !known {
            let dir = self.build_dir(build)?;
            std::fs::create_dir_all(&dir)?;
            let mut f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(INDEX_FILE))?;
            writeln!(f, "{file_id}\t{key}")?;
        }
        Ok(key)
    }
}

fn parse_index(text: &str) -> Result<BTreeMap<u32, Vec<ContentKey>>> {
    let mut index: BTreeMap<u32, Vec<ContentKey>> = BTreeMap::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (id, key) = line.split_once('\t').ok_or_else(|| {
            CurveError::Format(format!("mirror index line {}: expected <id>\\t<key>", i + 1))
        })?;
        let id = id.trim().parse::<u32>().map_err(|e| {
            CurveError::Format(format!("mirror index line {}: bad file id: {e}", i + 1))
        })?;
        let key = key
            .parse::<ContentKey>()
            .map_err(|e| CurveError::Format(format!("mirror index line {}: {e}", i + 1)))?;
        index.entry(id).or_default().push(key);
    }
    Ok(index)
}

impl ContentArchive for FsMirror {
    fn content_keys(&self, build: &BuildVersion, file_id: u32) -> Result<Vec<ContentKey>> {
        let index = self.load_index(build)?.ok_or_else(|| {
            CurveError::Precondition(format!("mirror has no files for build {build}"))
        })?;
        Ok(index.get(&file_id).cloned().unwrap_or_default())
    }

    fn read(&self, key: &ContentKey) -> Result<Vec<u8>> {
        let path = self.blob_path(key);
        let blob = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CurveError::Precondition(format!(
                    "content {key} missing from mirror"
                )));
            }
            Err(e) => return Err(e.into()),
        };
        let content = decode_blob(&blob)?;
        if ContentKey::of(&content) != *key {
            return Err(CurveError::Format(format!(
                "content {key} does not match its key"
            )));
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(id: &str) -> BuildVersion {
        BuildVersion::new(id).unwrap()
    }

    #[test]
    fn put_then_reopen_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = FsMirror::create(dir.path()).unwrap();
        let raw = m.put(&build("56008"), 1391661, b"xp table", CodecId::Store).unwrap();
        let z = m
            .put(&build("56008"), 1139378, &b"ID,Difficulty_0\n".repeat(50), CodecId::Zstd)
            .unwrap();

        let m = FsMirror::open(dir.path()).unwrap();
        assert_eq!(m.content_keys(&build("56008"), 1391661).unwrap(), vec![raw]);
        assert_eq!(m.read(&raw).unwrap(), b"xp table");
        assert_eq!(m.read(&z).unwrap(), b"ID,Difficulty_0\n".repeat(50));
        assert!(m.content_keys(&build("56008"), 42).unwrap().is_empty());
    }

    #[test]
    fn other_build_is_not_mirrored() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = FsMirror::create(dir.path()).unwrap();
        m.put(&build("56008"), 1, b"old xp", CodecId::Store).unwrap();
        assert!(matches!(
            m.content_keys(&build("56100"), 1),
            Err(CurveError::Precondition(_))
        ));
    }

    #[test]
    fn builds_share_blobs_but_not_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = FsMirror::create(dir.path()).unwrap();
        let k = m.put(&build("56008"), 1, b"same", CodecId::Store).unwrap();
        m.put(&build("56100"), 1, b"same", CodecId::Store).unwrap();
        m.put(&build("56100"), 2, b"new only", CodecId::Store).unwrap();
        assert_eq!(m.content_keys(&build("56100"), 1).unwrap(), vec![k]);
        assert!(m.content_keys(&build("56008"), 2).unwrap().is_empty());
    }

    #[test]
    fn put_is_idempotent_in_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = FsMirror::create(dir.path()).unwrap();
        m.put(&build("1"), 1, b"same", CodecId::Store).unwrap();
        m.put(&build("1"), 1, b"same", CodecId::Store).unwrap();
        let index =
            std::fs::read_to_string(dir.path().join(BUILDS_DIR).join("1").join(INDEX_FILE))
                .unwrap();
        assert_eq!(index.lines().count(), 1);
    }

    #[test]
    fn unsafe_build_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let m = FsMirror::create(dir.path()).unwrap();
        assert!(matches!(
            m.content_keys(&build("../etc"), 1),
            Err(CurveError::Precondition(_))
        ));
        assert!(m.content_keys(&build(".."), 1).is_err());
    }

    #[test]
    fn tampered_blob_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = FsMirror::create(dir.path()).unwrap();
        let k = m.put(&build("1"), 1, b"original", CodecId::Store).unwrap();
        std::fs::write(m.blob_path(&k), b"tampered").unwrap();
        assert!(matches!(m.read(&k), Err(CurveError::Format(_))));
    }

    #[test]
    fn unknown_key_is_precondition_failure() {
        let dir = tempfile::tempdir().unwrap();
        let m = FsMirror::create(dir.path()).unwrap();
        assert!(matches!(
            m.read(&ContentKey::of(b"nothing")),
            Err(CurveError::Precondition(_))
        ));
    }

    #[test]
    fn bad_index_line_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let build_dir = dir.path().join(BUILDS_DIR).join("7");
        std::fs::create_dir_all(&build_dir).unwrap();
        std::fs::write(build_dir.join(INDEX_FILE), "# mirror\n12 deadbeef\n").unwrap();
        let m = FsMirror::open(dir.path()).unwrap();
        let err = m.content_keys(&build("7"), 12).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FsMirror::open(dir.path().join("nope")).is_err());
    }
}

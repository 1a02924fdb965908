use super::{CodecId, Compressor, ZSTD_MAGIC};
use crate::error::{CurveError, Result};
use std::io::{Read, Write};

/// Raw blobs. Content that itself opens with the zstd magic cannot be stored
/// raw, since [`CodecId::detect`] would misread it.
pub struct Store;

impl Compressor for Store {
    fn id(&self) -> CodecId {
        CodecId::Store
    }

    fn compress(&self, src: &mut dyn Read, dst: &mut dyn Write, _level: i32) -> Result<u64> {
        let mut head = Vec::with_capacity(ZSTD_MAGIC.len());
        (&mut *src).take(ZSTD_MAGIC.len() as u64).read_to_end(&mut head)?;
        if head == ZSTD_MAGIC {
            return Err(CurveError::Format(
                "content starts with the zstd magic; store it compressed".into(),
            ));
        }
        dst.write_all(&head)?;
        Ok(head.len() as u64 + std::io::copy(src, dst)?)
    }

    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64> {
        Ok(std::io::copy(src, dst)?)
    }
}

use crate::error::{CurveError, Result};
use std::io::{Read, Write};

/// Little-endian zstd frame magic.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CodecId {
    Store = 0,
    Zstd = 1,
}

impl CodecId {
    /// Mirror blobs carry no header of their own; a zstd frame is recognised by its magic.
    pub fn detect(blob: &[u8]) -> Self {
        if blob.starts_with(&ZSTD_MAGIC) {
            CodecId::Zstd
        } else {
            CodecId::Store
        }
    }
}

pub trait Compressor: Send + Sync {
    fn id(&self) -> CodecId;
    fn compress(&self, src: &mut dyn Read, dst: &mut dyn Write, level: i32) -> Result<u64>;
    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64>;
}

pub fn get_codec(id: CodecId) -> &'static dyn Compressor {
    match id {
        CodecId::Store => &store::Store,
        CodecId::Zstd => &zstdc::ZstdCompressor,
    }
}

/// Decode a stored blob to its content bytes.
pub fn decode_blob(blob: &[u8]) -> Result<Vec<u8>> {
    let codec = get_codec(CodecId::detect(blob));
    let mut out = Vec::with_capacity(blob.len());
    codec
        .decompress(&mut &blob[..], &mut out)
        .map_err(|e| CurveError::Format(format!("{:?} blob decode: {e}", codec.id())))?;
    Ok(out)
}

pub fn encode_blob(content: &[u8], id: CodecId) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(content.len());
    get_codec(id).compress(&mut &content[..], &mut out, 3)?;
    Ok(out)
}

pub mod store;
pub mod zstdc;

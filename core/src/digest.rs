use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::error::SyncError;

// Hash buffer is capped at 1MB so memory use stays flat on large files
const MAX_HASH_BUF_LEN: u64 = 1_000_000;
const MIN_HASH_BUF_LEN: u64 = 4_096;

/// MD5 digest of a file's full byte content. Two files are considered
/// identical iff their digests are bit-equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentDigest([u8; 16]);

impl ContentDigest {
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{:02x}", byte)).collect()
    }
}

/// Hash the file at `path` chunk by chunk.
pub fn digest_file(path: &Path) -> Result<ContentDigest, SyncError> {
    let file = File::open(path).map_err(|error| SyncError::Read(path.to_path_buf(), error))?;
    let len = file
        .metadata()
        .map_err(|error| SyncError::Read(path.to_path_buf(), error))?
        .len();
    let buf_len = len.clamp(MIN_HASH_BUF_LEN, MAX_HASH_BUF_LEN) as usize;
    let mut buf = BufReader::with_capacity(buf_len, file);
    let mut context = md5::Context::new();
    loop {
        let part = buf
            .fill_buf()
            .map_err(|error| SyncError::Read(path.to_path_buf(), error))?;
        if part.is_empty() {
            break;
        }
        context.consume(part);
        let part_len = part.len();
        buf.consume(part_len);
    }
    Ok(ContentDigest(context.compute().0))
}

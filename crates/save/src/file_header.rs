// ---------------------------------------------------------------------------
// file_header – Save file header with magic bytes, version, and checksum
// ---------------------------------------------------------------------------
//
// Header format (28 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "TILE"
//   [4..8]   Format version (u32)
//   [8..12]  Flags (u32: bit 0 = LZ4 compressed)
//   [12..20] Timestamp (Unix epoch seconds, u64)
//   [20..24] Uncompressed payload size (u32)
//   [24..28] xxHash32 checksum of the stored payload (everything after the header)
//
// A file that does not start with the magic but does start with a JSON object
// is a bare city document (as written by external tools) and is handed back
// as `UnwrapResult::Bare`.

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;

/// Magic bytes identifying a city save file.
pub const MAGIC: [u8; 4] = *b"TILE";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 28;

/// Current header layout version.
pub const HEADER_FORMAT_VERSION: u32 = 1;

/// Payload is LZ4 block-compressed with its size prepended.
pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

/// Parsed file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub timestamp: u64,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    /// Header for a stored `payload` that expands to `uncompressed_size` bytes.
    pub fn new(payload: &[u8], flags: u32, uncompressed_size: u32) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            format_version: HEADER_FORMAT_VERSION,
            flags,
            timestamp,
            uncompressed_size,
            checksum: xxh32(payload, XXHASH_SEED),
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.format_version.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        out.extend_from_slice(&self.checksum.to_le_bytes());
    }
}

/// Prefix `payload` with a header. Returns `[header (28 bytes)] ++ payload`.
pub fn wrap_with_header(payload: &[u8], flags: u32, uncompressed_size: u32) -> Vec<u8> {
    let header = FileHeader::new(payload, flags, uncompressed_size);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    header.write_to(&mut out);
    out.extend_from_slice(payload);
    out
}

/// Result of unwrapping a save file's bytes.
#[derive(Debug)]
pub enum UnwrapResult<'a> {
    /// File has a valid header; the stored payload follows it.
    WithHeader {
        header: FileHeader,
        payload: &'a [u8],
    },
    /// Headerless JSON city document.
    Bare(&'a [u8]),
}

fn looks_like_json(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'{')
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn le_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

/// Parse and validate the file header.
///
/// # Errors
///
/// - `BadMagic` if the bytes carry neither the magic nor a JSON object
/// - `TooShort` if the magic is present but the header is cut off
/// - `VersionMismatch` if the header comes from a newer build
/// - `ChecksumMismatch` if the payload was corrupted
pub fn unwrap_header(bytes: &[u8]) -> Result<UnwrapResult<'_>, SaveError> {
    if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
        if looks_like_json(bytes) {
            return Ok(UnwrapResult::Bare(bytes));
        }
        return Err(SaveError::BadMagic);
    }

    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::TooShort { len: bytes.len() });
    }

    let header = FileHeader {
        format_version: le_u32(bytes, 4),
        flags: le_u32(bytes, 8),
        timestamp: le_u64(bytes, 12),
        uncompressed_size: le_u32(bytes, 20),
        checksum: le_u32(bytes, 24),
    };

    if header.format_version > HEADER_FORMAT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: HEADER_FORMAT_VERSION,
            found: header.format_version,
        });
    }

    let payload = &bytes[HEADER_SIZE..];
    let found = xxh32(payload, XXHASH_SEED);
    if found != header.checksum {
        return Err(SaveError::ChecksumMismatch {
            expected: header.checksum,
            found,
        });
    }

    Ok(UnwrapResult::WithHeader { header, payload })
}

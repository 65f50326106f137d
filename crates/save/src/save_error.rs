// ---------------------------------------------------------------------------
// SaveError: error type for reading and writing city save files
// ---------------------------------------------------------------------------

use std::fmt;

use simulation::city::LoadError;

/// Errors that can occur while saving or loading a city.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// Serializing the city failed.
    Encode(String),
    /// The payload could not be decompressed or parsed.
    Decode(String),
    /// The file starts with neither the save magic nor a JSON document.
    BadMagic,
    /// The file has the save magic but is shorter than the header.
    TooShort { len: usize },
    /// The payload does not hash to the checksum stored in the header.
    ChecksumMismatch { expected: u32, found: u32 },
    /// The header was written by a newer build.
    VersionMismatch { expected_max: u32, found: u32 },
    /// The payload parsed but does not describe a valid city.
    Load(LoadError),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::BadMagic => write!(f, "Not a city save file"),
            SaveError::TooShort { len } => {
                write!(f, "Save file is truncated ({len} bytes)")
            }
            SaveError::ChecksumMismatch { expected, found } => write!(
                f,
                "Checksum mismatch: expected {expected:#010x}, found {found:#010x}"
            ),
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: save header is v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::Load(e) => write!(f, "Invalid city data: {e}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            SaveError::Load(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<bitcode::Error> for SaveError {
    fn from(e: bitcode::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}

impl From<LoadError> for SaveError {
    fn from(e: LoadError) -> Self {
        SaveError::Load(e)
    }
}

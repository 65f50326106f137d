//! City <-> bytes.
//!
//! The payload is a JSON document holding the serialized city shape plus the
//! RNG snapshot, optionally LZ4-compressed, behind a `file_header` header.
//! A bare `CitySave` JSON document (no header, no RNG) also loads; the RNG
//! then restarts from the default seed.

use std::borrow::Cow;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use simulation::city::City;
use simulation::config::SimConfig;
use simulation::sim_rng::SimRng;
use simulation::snapshot::CitySave;

use crate::file_header::{unwrap_header, wrap_with_header, UnwrapResult, FLAG_COMPRESSED};
use crate::save_error::SaveError;

/// How `encode_city` writes its payload.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    pub compress: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { compress: true }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveFile {
    city: CitySave,
    #[serde(default)]
    rng: Option<Vec<u8>>,
}

/// Encode `city` into a complete save file.
pub fn encode_city(city: &City, options: SaveOptions) -> Result<Vec<u8>, SaveError> {
    let file = SaveFile {
        city: city.serialize(),
        rng: Some(city.rng.snapshot_bytes()),
    };
    let json = serde_json::to_vec(&file).map_err(|e| SaveError::Encode(e.to_string()))?;
    let uncompressed_size =
        u32::try_from(json.len()).map_err(|_| SaveError::Encode("save exceeds 4 GiB".into()))?;

    if options.compress {
        let packed = lz4_flex::compress_prepend_size(&json);
        Ok(wrap_with_header(&packed, FLAG_COMPRESSED, uncompressed_size))
    } else {
        Ok(wrap_with_header(&json, 0, uncompressed_size))
    }
}

/// The LZ4 block carries its own decompressed length; it must agree with the
/// header before anything is allocated for it.
fn check_size_prefix(payload: &[u8], uncompressed_size: u32) -> Result<(), SaveError> {
    let Some(prefix) = payload.get(..4) else {
        return Err(SaveError::Decode("compressed payload has no size prefix".into()));
    };
    let claimed = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
    if claimed != uncompressed_size {
        return Err(SaveError::Decode(format!(
            "compressed payload claims {claimed} bytes, header says {uncompressed_size}"
        )));
    }
    Ok(())
}

/// Decode a save file produced by `encode_city` (or a bare city document).
pub fn decode_city(bytes: &[u8], config: SimConfig) -> Result<City, SaveError> {
    match unwrap_header(bytes)? {
        UnwrapResult::WithHeader { header, payload } => {
            let json: Cow<'_, [u8]> = if header.is_compressed() {
                check_size_prefix(payload, header.uncompressed_size)?;
                Cow::Owned(
                    lz4_flex::decompress_size_prepended(payload)
                        .map_err(|e| SaveError::Decode(e.to_string()))?,
                )
            } else {
                Cow::Borrowed(payload)
            };
            if json.len() != header.uncompressed_size as usize {
                return Err(SaveError::Decode(format!(
                    "payload is {} bytes, header says {}",
                    json.len(),
                    header.uncompressed_size
                )));
            }
            let file: SaveFile = serde_json::from_slice(&json)?;
            let mut city = City::deserialize(&file.city, config)?;
            if let Some(rng) = file.rng {
                city.rng = SimRng::from_snapshot_bytes(&rng)?;
            }
            Ok(city)
        }
        UnwrapResult::Bare(json) => {
            let save: CitySave = serde_json::from_slice(json)?;
            Ok(City::deserialize(&save, config)?)
        }
    }
}

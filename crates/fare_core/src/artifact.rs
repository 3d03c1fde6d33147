//! Compressed model artifacts
//!
//! Deployed models are bincode-encoded and gzip-compressed. A sidecar file
//! `<artifact>.hash` holds the BLAKE3 digest of the uncompressed bytes and is
//! checked on load when present.

use crate::forest::{ForestModel, ModelError};
use crate::serde_canon::hash_bytes_hex;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// gzip level used when none is requested
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 9;

/// Sidecar path holding the artifact digest
pub fn hash_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut name = OsString::from(path.as_ref().as_os_str());
    name.push(".hash");
    PathBuf::from(name)
}

/// Write `model` as a compressed artifact plus digest sidecar.
///
/// Returns the hex digest written to the sidecar.
pub fn save_compressed<P: AsRef<Path>>(
    model: &ForestModel,
    path: P,
    level: u32,
) -> Result<String, ModelError> {
    let path = path.as_ref();
    let bytes = bincode::serialize(model)?;
    let digest = hash_bytes_hex(&bytes);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = BufWriter::new(File::create(path)?);
    let mut encoder = GzEncoder::new(file, Compression::new(level.min(9)));
    encoder.write_all(&bytes)?;
    encoder.finish()?.flush()?;

    fs::write(hash_path(path), &digest)?;
    debug!(
        "Wrote {} raw bytes to {} (level {})",
        bytes.len(),
        path.display(),
        level
    );

    Ok(digest)
}

/// Read, verify and validate a compressed artifact
pub fn load_compressed<P: AsRef<Path>>(path: P) -> Result<ForestModel, ModelError> {
    let path = path.as_ref();
    let mut decoder = GzDecoder::new(BufReader::new(File::open(path)?));
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;

    let sidecar = hash_path(path);
    if sidecar.exists() {
        let expected = fs::read_to_string(&sidecar)?.trim().to_ascii_lowercase();
        let actual = hash_bytes_hex(&bytes);
        if expected != actual {
            return Err(ModelError::HashMismatch { expected, actual });
        }
    }

    let model: ForestModel = bincode::deserialize(&bytes)?;
    model.validate()?;
    Ok(model)
}

/// Load a model, choosing the format from the file extension.
///
/// `.json` files are read as canonical JSON, anything else as a compressed
/// artifact.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<ForestModel, ModelError> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let model = if is_json {
        ForestModel::load_json(path)?
    } else {
        load_compressed(path)?
    };

    info!(
        "Loaded model from {} ({} trees, {} features)",
        path.display(),
        model.num_trees(),
        model.num_features()
    );
    Ok(model)
}

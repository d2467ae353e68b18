//! Parameter snapshots
//!
//! A snapshot is the learnable parameters flattened, in declaration order,
//! into one flat `f32` array and written as JSON. There is no header and no
//! architecture metadata: loading into a differently shaped parameter list
//! is only caught by the element count.

use crate::error::{Error, Result};
use crate::Tensor;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Default snapshot path, mirroring the conventional `./network.param` name
pub const DEFAULT_PARAM_PATH: &str = "network.param.json";

/// Flatten parameters into a single row-major vector
pub fn flatten_params(params: &[Tensor]) -> Vec<f32> {
    let mut flat = Vec::with_capacity(params.iter().map(Tensor::len).sum());
    for param in params {
        flat.extend(param.data().iter().copied());
    }
    flat
}

/// Write a parameter snapshot to `path`.
///
/// Non-finite parameter values are rejected: JSON has no NaN/Inf encoding,
/// so writing them would produce a snapshot that can never be loaded.
pub fn save_params(params: &[Tensor], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let flat = flatten_params(params);

    if let Some(pos) = flat.iter().position(|v| !v.is_finite()) {
        return Err(Error::Serialization(format!(
            "snapshot contains non-finite value at offset {pos}"
        )));
    }

    let data = serde_json::to_string(&flat)
        .map_err(|e| Error::Serialization(format!("snapshot serialization failed: {e}")))?;

    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;

    log::debug!("saved {} parameter values to {}", flat.len(), path.display());
    Ok(())
}

/// Read a flat snapshot from `path`.
///
/// A missing file is the one explicitly translated failure: it becomes
/// [`Error::MissingParamFile`] before any read is attempted.
pub fn load_flat(path: impl AsRef<Path>) -> Result<Vec<f32>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::MissingParamFile {
            path: path.to_path_buf(),
        });
    }

    let mut content = String::new();
    File::open(path)?.read_to_string(&mut content)?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Serialization(format!("snapshot deserialization failed: {e}")))
}

/// Load a snapshot from `path` into `params`, in declaration order.
///
/// The snapshot must hold exactly as many values as the parameters do.
pub fn load_params(params: &mut [Tensor], path: impl AsRef<Path>) -> Result<()> {
    let flat = load_flat(path)?;

    let expected: usize = params.iter().map(Tensor::len).sum();
    if flat.len() != expected {
        return Err(Error::ParamSizeMismatch {
            expected,
            actual: flat.len(),
        });
    }

    let mut offset = 0;
    for param in params.iter_mut() {
        let len = param.len();
        let mut data = param.data_mut();
        for (dst, &src) in data.iter_mut().zip(&flat[offset..offset + len]) {
            *dst = src;
        }
        offset += len;
    }

    Ok(())
}

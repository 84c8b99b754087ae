use std::{fs, path::Path};

use crate::error::{Error, Result};

pub fn write_epsilon(path: &Path, epsilon: f64) -> Result<()> {
    fs::write(path, epsilon.to_string()).map_err(|err| Error::Checkpoint {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

pub fn read_epsilon(path: &Path) -> Result<f64> {
    let corrupt = |reason: String| Error::Checkpoint {
        path: path.to_path_buf(),
        reason,
    };
    let text = fs::read_to_string(path).map_err(|err| corrupt(err.to_string()))?;
    let epsilon: f64 = text
        .trim()
        .parse()
        .map_err(|err| corrupt(format!("invalid exploration rate {text:?}: {err}")))?;
    if !(0.0..=1.0).contains(&epsilon) {
        return Err(corrupt(format!("exploration rate {epsilon} outside [0, 1]")));
    }
    Ok(epsilon)
}

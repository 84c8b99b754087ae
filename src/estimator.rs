use std::{collections::HashMap, path::Path};

use candle_core::{Device, Tensor};

use crate::error::{Error, Result};

/// Maps a batch of states to per-action value estimates and can be fit
/// towards supplied targets.
pub trait ValueEstimator {
    /// `states` is `(N, ...)`; the result is `(N, actions)`.
    fn predict(&self, states: &Tensor) -> Result<Tensor>;

    /// One supervised update towards `targets`, shaped like `predict`'s output.
    fn fit(&mut self, states: &Tensor, targets: &Tensor) -> Result<()>;

    /// Detached copy of every trainable parameter.
    fn parameters(&self) -> Result<Parameters>;

    /// Overwrites every trainable parameter from `parameters`.
    fn set_parameters(&mut self, parameters: &Parameters) -> Result<()>;
}

/// Named parameter tensors, persisted as a safetensors file.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    tensors: HashMap<String, Tensor>,
}

impl Parameters {
    pub fn new(tensors: HashMap<String, Tensor>) -> Self {
        Self { tensors }
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.tensors.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&Tensor> {
        self.get(name)
            .ok_or_else(|| Error::MissingParameter(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        candle_core::safetensors::save(&self.tensors, path).map_err(|err| Error::Checkpoint {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    pub fn load(path: &Path, device: &Device) -> Result<Self> {
        let tensors =
            candle_core::safetensors::load(path, device).map_err(|err| Error::Checkpoint {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        Ok(Self { tensors })
    }
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_of_equal_maxima() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[-2.0, -1.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn parameters_survive_safetensors_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.safetensors");
        let weights = Tensor::new(&[[1.0f32, 2.0], [3.0, 4.0]], &Device::Cpu).unwrap();
        let params = Parameters::new(HashMap::from([("w".to_string(), weights)]));

        params.save(&path).unwrap();
        let loaded = Parameters::load(&path, &Device::Cpu).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(
            loaded.require("w").unwrap().to_vec2::<f32>().unwrap(),
            vec![vec![1.0, 2.0], vec![3.0, 4.0]]
        );
        assert!(matches!(loaded.require("b"), Err(Error::MissingParameter(_))));
    }

    #[test]
    fn loading_missing_file_is_a_checkpoint_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Parameters::load(&dir.path().join("absent"), &Device::Cpu).unwrap_err();
        assert!(matches!(err, Error::Checkpoint { .. }));
    }
}

//! Deterministic stand-ins for the estimator and the simulator.

use std::collections::HashMap;

use candle_core::{Device, Tensor};

use crate::{
    action::Controls,
    environment::{Environment, StepOutcome},
    error::Result,
    estimator::{Parameters, ValueEstimator},
    frame::Frame,
};

/// `q = flatten(state) · weights`; every fit shifts all weights by +1.
pub(crate) struct LinearEstimator {
    weights: Tensor,
    pub fits: Vec<usize>,
    pub last_targets: Option<Vec<Vec<f32>>>,
    pub last_states: Option<Vec<Vec<f32>>>,
}

impl LinearEstimator {
    pub fn new(rows: Vec<Vec<f32>>) -> Self {
        let (features, actions) = (rows.len(), rows[0].len());
        let flat: Vec<f32> = rows.into_iter().flatten().collect();
        Self {
            weights: Tensor::from_vec(flat, (features, actions), &Device::Cpu).unwrap(),
            fits: Vec::new(),
            last_targets: None,
            last_states: None,
        }
    }

    pub fn zeros(features: usize, actions: usize) -> Self {
        Self::new(vec![vec![0.0; actions]; features])
    }

    pub fn values(&self, state: &Tensor) -> Vec<f32> {
        self.predict(&state.unsqueeze(0).unwrap())
            .unwrap()
            .squeeze(0)
            .unwrap()
            .to_vec1()
            .unwrap()
    }
}

impl ValueEstimator for LinearEstimator {
    fn predict(&self, states: &Tensor) -> Result<Tensor> {
        Ok(states.flatten_from(1)?.matmul(&self.weights)?)
    }

    fn fit(&mut self, states: &Tensor, targets: &Tensor) -> Result<()> {
        self.fits.push(states.dim(0)?);
        self.last_targets = Some(targets.to_vec2()?);
        self.last_states = Some(states.flatten_from(1)?.to_vec2()?);
        self.weights = self.weights.affine(1.0, 1.0)?;
        Ok(())
    }

    fn parameters(&self) -> Result<Parameters> {
        Ok(Parameters::new(HashMap::from([(
            "weights".to_string(),
            self.weights.copy()?,
        )])))
    }

    fn set_parameters(&mut self, parameters: &Parameters) -> Result<()> {
        self.weights = parameters.require("weights")?.copy()?;
        Ok(())
    }
}

pub(crate) fn state(values: &[f32]) -> Tensor {
    Tensor::new(values, &Device::Cpu).unwrap()
}

/// Simulator with a constant per-tick reward that optionally ends after a
/// fixed number of ticks. Frame intensity tracks the tick count.
pub(crate) struct ScriptedEnvironment {
    size: u32,
    reward: f32,
    terminal_after: Option<usize>,
    pub ticks: usize,
    pub resets: usize,
    pub controls: Vec<Controls>,
}

impl ScriptedEnvironment {
    pub fn new(size: u32, reward: f32, terminal_after: Option<usize>) -> Self {
        Self {
            size,
            reward,
            terminal_after,
            ticks: 0,
            resets: 0,
            controls: Vec::new(),
        }
    }

    fn frame(&self) -> Frame {
        let shade = (self.ticks % 256) as u8;
        Frame::filled(self.size, self.size, [shade, shade, shade])
    }
}

impl Environment for ScriptedEnvironment {
    fn reset(&mut self) -> Result<Frame> {
        self.resets += 1;
        self.ticks = 0;
        self.controls.clear();
        Ok(self.frame())
    }

    fn step(&mut self, controls: Controls) -> Result<StepOutcome> {
        self.ticks += 1;
        self.controls.push(controls);
        Ok(StepOutcome {
            frame: self.frame(),
            reward: self.reward,
            terminal: self.terminal_after.is_some_and(|end| self.ticks >= end),
        })
    }
}

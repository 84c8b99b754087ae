use std::path::PathBuf;

use crate::{
    action::Controls,
    error::{Error, Result},
};

/// Learning hyper-parameters, fixed once the agent is built.
///
/// `epsilon` is only the starting exploration rate; the agent keeps its own
/// decaying copy.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub alpha: f64,
    pub gamma: f64,
    pub epsilon: f64,
    pub epsilon_lower: f64,
    pub epsilon_decay: f64,
    pub memory_size: usize,
    pub batch_size: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.01,
            gamma: 0.95,
            epsilon: 1.0,
            epsilon_lower: 0.1,
            epsilon_decay: 0.99,
            memory_size: 500,
            batch_size: 50,
        }
    }
}

fn is_probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "alpha must be positive, got {}",
                self.alpha
            )));
        }
        if !(0.0..1.0).contains(&self.gamma) {
            return Err(Error::InvalidConfig(format!(
                "gamma must lie in [0, 1), got {}",
                self.gamma
            )));
        }
        if !is_probability(self.epsilon) {
            return Err(Error::InvalidConfig(format!(
                "epsilon must lie in [0, 1], got {}",
                self.epsilon
            )));
        }
        if !is_probability(self.epsilon_lower) {
            return Err(Error::InvalidConfig(format!(
                "epsilon_lower must lie in [0, 1], got {}",
                self.epsilon_lower
            )));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "epsilon_decay must lie in (0, 1], got {}",
                self.epsilon_decay
            )));
        }
        if self.memory_size == 0 {
            return Err(Error::InvalidConfig("memory_size must be non-zero".into()));
        }
        if self.batch_size == 0 || self.batch_size > self.memory_size {
            return Err(Error::InvalidConfig(format!(
                "batch_size must lie in 1..={}, got {}",
                self.memory_size, self.batch_size
            )));
        }
        Ok(())
    }
}

/// Ends a training episode once the car keeps collecting negative rewards.
///
/// The streak is only counted from decision step `grace_steps + episode`
/// onwards, so later episodes get a longer run-up before being cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarlyStopPolicy {
    pub grace_steps: u32,
    pub patience: u32,
}

impl Default for EarlyStopPolicy {
    fn default() -> Self {
        Self {
            grace_steps: 50,
            patience: 20,
        }
    }
}

impl EarlyStopPolicy {
    pub fn threshold(&self, episode: u32) -> u32 {
        self.grace_steps.saturating_add(episode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointPaths {
    pub model: PathBuf,
    pub epsilon: PathBuf,
}

impl Default for CheckpointPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from("model.safetensors"),
            epsilon: PathBuf::from("epsilon"),
        }
    }
}

impl CheckpointPaths {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            model: dir.join("model.safetensors"),
            epsilon: dir.join("epsilon"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub frame_skip: u32,
    pub warmup_steps: u32,
    /// Scripted action used while the simulation settles.
    pub coast: Controls,
    pub target_sync_every: u32,
    pub early_stop: Option<EarlyStopPolicy>,
    pub checkpoint: CheckpointPaths,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            frame_skip: 3,
            warmup_steps: 20,
            coast: Controls::new(0.0, 0.5, 0.0),
            target_sync_every: 5,
            early_stop: Some(EarlyStopPolicy::default()),
            checkpoint: CheckpointPaths::default(),
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frame_skip == 0 {
            return Err(Error::InvalidConfig("frame_skip must be at least 1".into()));
        }
        if self.target_sync_every == 0 {
            return Err(Error::InvalidConfig(
                "target_sync_every must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// First row of the heads-up display strip, zeroed before encoding.
    pub hud_start_row: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self { hud_start_row: 85 }
    }
}

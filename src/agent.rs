use candle_core::{Device, Tensor};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    checkpoint,
    config::{AgentConfig, CheckpointPaths},
    error::{Error, Result},
    estimator::{Parameters, ValueEstimator, argmax},
    experience::{ReplayBuffer, Transition},
};

/// Epsilon-greedy DQN learner with experience replay and a target network.
///
/// `live` is fit on every learning step; `target` only changes through
/// [`DqnAgent::synchronize_target`] and supplies the bootstrapped values.
pub struct DqnAgent<E> {
    live: E,
    target: E,
    memory: ReplayBuffer,
    config: AgentConfig,
    action_count: usize,
    epsilon: f64,
    rng: StdRng,
}

impl<E: ValueEstimator> DqnAgent<E> {
    pub fn new(live: E, target: E, action_count: usize, config: AgentConfig) -> Result<Self> {
        Self::with_rng(live, target, action_count, config, StdRng::from_os_rng())
    }

    pub fn with_rng(
        live: E,
        target: E,
        action_count: usize,
        config: AgentConfig,
        rng: StdRng,
    ) -> Result<Self> {
        config.validate()?;
        if action_count == 0 {
            return Err(Error::InvalidConfig("action space is empty".into()));
        }
        let mut agent = Self {
            live,
            target,
            memory: ReplayBuffer::new(config.memory_size),
            epsilon: config.epsilon,
            config,
            action_count,
            rng,
        };
        agent.synchronize_target()?;
        Ok(agent)
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(Error::InvalidConfig(format!(
                "epsilon must lie in [0, 1], got {epsilon}"
            )));
        }
        self.epsilon = epsilon;
        Ok(())
    }

    pub fn action_count(&self) -> usize {
        self.action_count
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    pub fn live(&self) -> &E {
        &self.live
    }

    pub fn target(&self) -> &E {
        &self.target
    }

    /// Random action with probability epsilon, otherwise the greedy one.
    pub fn select_action(&mut self, state: &Tensor) -> Result<usize> {
        if self.rng.random::<f64>() < self.epsilon {
            return Ok(self.rng.random_range(0..self.action_count));
        }
        self.greedy_action(state)
    }

    pub fn greedy_action(&self, state: &Tensor) -> Result<usize> {
        let values = self
            .live
            .predict(&state.unsqueeze(0)?)?
            .squeeze(0)?
            .to_vec1::<f32>()?;
        argmax(&values).ok_or(Error::ActionOutOfRange {
            index: 0,
            actions: values.len(),
        })
    }

    pub fn observe(&mut self, transition: Transition) -> Result<()> {
        if transition.action >= self.action_count {
            return Err(Error::ActionOutOfRange {
                index: transition.action,
                actions: self.action_count,
            });
        }
        self.memory.push(transition);
        Ok(())
    }

    /// Fits `live` on one replayed batch and decays epsilon.
    ///
    /// Returns `false` without touching anything while the buffer holds
    /// fewer than `batch_size` transitions.
    pub fn learn(&mut self) -> Result<bool> {
        let Some(batch) = self.memory.sample(self.config.batch_size, &mut self.rng) else {
            tracing::debug!(
                stored = self.memory.len(),
                batch_size = self.config.batch_size,
                "not enough experience to learn"
            );
            return Ok(false);
        };

        let states: Vec<&Tensor> = batch.iter().map(|t| &t.state).collect();
        let next_states: Vec<&Tensor> = batch.iter().map(|t| &t.next_state).collect();
        let states = Tensor::stack(&states, 0)?;
        let next_states = Tensor::stack(&next_states, 0)?;

        let mut targets = self.live.predict(&states)?.to_vec2::<f32>()?;
        let next_values = self.target.predict(&next_states)?.to_vec2::<f32>()?;
        let gamma = self.config.gamma as f32;

        for ((row, next), transition) in targets.iter_mut().zip(&next_values).zip(&batch) {
            let actions = row.len();
            let slot = row
                .get_mut(transition.action)
                .ok_or(Error::ActionOutOfRange {
                    index: transition.action,
                    actions,
                })?;
            *slot = if transition.terminal {
                transition.reward
            } else {
                let best_next = next.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                transition.reward + gamma * best_next
            };
        }

        let rows = targets.len();
        let flat: Vec<f32> = targets.into_iter().flatten().collect();
        let columns = flat.len() / rows;
        let targets = Tensor::from_vec(flat, (rows, columns), states.device())?;

        self.live.fit(&states, &targets)?;
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_lower);
        Ok(true)
    }

    /// Replaces the target parameters wholesale with a copy of live's.
    pub fn synchronize_target(&mut self) -> Result<()> {
        let parameters = self.live.parameters()?;
        self.target.set_parameters(&parameters)?;
        tracing::debug!("target network synchronized");
        Ok(())
    }

    /// Writes the target parameters and the exploration rate.
    pub fn persist(&self, paths: &CheckpointPaths) -> Result<()> {
        self.target.parameters()?.save(&paths.model)?;
        checkpoint::write_epsilon(&paths.epsilon, self.epsilon)?;
        tracing::debug!(model = %paths.model.display(), epsilon = self.epsilon, "checkpoint written");
        Ok(())
    }

    /// Loads a checkpoint into live, then syncs target from it.
    ///
    /// Both artifacts are read before anything is applied, so a failed
    /// restore leaves the agent untouched.
    pub fn restore(&mut self, paths: &CheckpointPaths, device: &Device) -> Result<()> {
        let parameters = Parameters::load(&paths.model, device)?;
        let epsilon = checkpoint::read_epsilon(&paths.epsilon)?;
        self.live.set_parameters(&parameters)?;
        self.synchronize_target()?;
        self.epsilon = epsilon;
        tracing::info!(model = %paths.model.display(), epsilon, "checkpoint restored");
        Ok(())
    }
}

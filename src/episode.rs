use candle_core::Tensor;

use crate::{
    action::{ActionSpace, Controls},
    agent::DqnAgent,
    config::{EarlyStopPolicy, TrainerConfig},
    encoder::StateEncoder,
    environment::{Environment, StepOutcome},
    error::{Error, Result},
    estimator::ValueEstimator,
    experience::Transition,
    frame::FrameWindow,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    Initializing,
    Warmup,
    Active,
    Terminated,
}

/// Per-episode bookkeeping, replaced wholesale after every decision step.
///
/// `episode` is `None` when driving without training, which also disables
/// the negative-reward cut-off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeState {
    pub episode: Option<u32>,
    pub total_reward: f32,
    pub steps: u32,
    pub negative_streak: u32,
    pub terminated: bool,
}

impl EpisodeState {
    pub fn new(episode: Option<u32>) -> Self {
        Self {
            episode,
            total_reward: 0.0,
            steps: 0,
            negative_streak: 0,
            terminated: false,
        }
    }

    /// Warmup ticks count towards the reward but are not decisions.
    pub fn warmed(self, reward: f32, env_terminal: bool) -> Self {
        Self {
            total_reward: self.total_reward + reward,
            terminated: self.terminated || env_terminal,
            ..self
        }
    }

    pub fn advance(self, reward: f32, env_terminal: bool, early_stop: Option<EarlyStopPolicy>) -> Self {
        let steps = self.steps + 1;
        let mut negative_streak = if reward < 0.0 {
            self.negative_streak + 1
        } else {
            0
        };
        let mut stalled = false;
        if let (Some(policy), Some(episode)) = (early_stop, self.episode) {
            if steps < policy.threshold(episode) {
                negative_streak = 0;
            }
            stalled = negative_streak >= policy.patience;
        }
        Self {
            total_reward: self.total_reward + reward,
            steps,
            negative_streak,
            terminated: self.terminated || env_terminal || stalled,
            ..self
        }
    }
}

/// Runs episodes against the simulator, feeding the agent and deciding
/// when it learns, syncs its target network and checkpoints.
pub struct Trainer<E, S> {
    agent: DqnAgent<E>,
    environment: S,
    encoder: StateEncoder,
    actions: ActionSpace,
    config: TrainerConfig,
    phase: EpisodePhase,
}

impl<E: ValueEstimator, S: Environment> Trainer<E, S> {
    pub fn new(
        agent: DqnAgent<E>,
        environment: S,
        encoder: StateEncoder,
        actions: ActionSpace,
        config: TrainerConfig,
    ) -> Result<Self> {
        config.validate()?;
        if actions.len() != agent.action_count() {
            return Err(Error::InvalidConfig(format!(
                "agent scores {} actions but the action space has {}",
                agent.action_count(),
                actions.len()
            )));
        }
        Ok(Self {
            agent,
            environment,
            encoder,
            actions,
            config,
            phase: EpisodePhase::Terminated,
        })
    }

    pub fn agent(&self) -> &DqnAgent<E> {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut DqnAgent<E> {
        &mut self.agent
    }

    pub fn environment(&self) -> &S {
        &self.environment
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    fn enter(&mut self, phase: EpisodePhase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "episode phase");
        self.phase = phase;
    }

    /// Holds `controls` for `frame_skip` ticks, summing rewards.
    fn repeat(&mut self, controls: Controls) -> Result<StepOutcome> {
        let mut outcome = self.environment.step(controls)?;
        for _ in 1..self.config.frame_skip {
            let next = self.environment.step(controls)?;
            outcome = StepOutcome {
                frame: next.frame,
                reward: outcome.reward + next.reward,
                terminal: outcome.terminal || next.terminal,
            };
        }
        Ok(outcome)
    }

    fn start(&mut self, episode: Option<u32>) -> Result<(FrameWindow, Tensor, EpisodeState)> {
        self.enter(EpisodePhase::Initializing);
        let mut window = FrameWindow::new(self.environment.reset()?);
        let mut state = EpisodeState::new(episode);

        self.enter(EpisodePhase::Warmup);
        for _ in 0..self.config.warmup_steps {
            let outcome = self.repeat(self.config.coast)?;
            window.push(outcome.frame);
            state = state.warmed(outcome.reward, outcome.terminal);
            if state.terminated {
                break;
            }
        }

        let encoded = self.encoder.encode(&window)?;
        self.enter(EpisodePhase::Active);
        Ok((window, encoded, state))
    }

    fn decide(
        &mut self,
        window: &mut FrameWindow,
        current: Tensor,
        state: EpisodeState,
        record: bool,
    ) -> Result<(Tensor, EpisodeState)> {
        let action = self.agent.select_action(&current)?;
        let controls = self.actions.get(action).ok_or(Error::ActionOutOfRange {
            index: action,
            actions: self.actions.len(),
        })?;
        let outcome = self.repeat(controls)?;
        window.push(outcome.frame);
        let next = self.encoder.encode(window)?;

        if record {
            self.agent.observe(Transition {
                state: current,
                action,
                next_state: next.clone(),
                reward: outcome.reward,
                terminal: outcome.terminal,
            })?;
        }
        let early_stop = self.config.early_stop;
        Ok((next, state.advance(outcome.reward, outcome.terminal, early_stop)))
    }

    /// Plays, learns from and checkpoints training episode `episode` (1-based).
    pub fn run_episode(&mut self, episode: u32) -> Result<EpisodeState> {
        let (mut window, mut current, mut state) = self.start(Some(episode))?;
        while !state.terminated {
            (current, state) = self.decide(&mut window, current, state, true)?;
        }

        self.enter(EpisodePhase::Terminated);
        self.agent.learn()?;
        if episode % self.config.target_sync_every == 0 {
            self.agent.synchronize_target()?;
        }
        self.agent.persist(&self.config.checkpoint)?;
        Ok(state)
    }

    /// Runs episodes `1..=episodes` and returns each episode's reward.
    pub fn train(&mut self, episodes: u32) -> Result<Vec<f32>> {
        let mut rewards = Vec::with_capacity(episodes as usize);
        for episode in 1..=episodes {
            let state = self.run_episode(episode)?;
            tracing::info!(
                "episode {}/{}: reward {:.2}, steps {}, epsilon {:.3}",
                episode,
                episodes,
                state.total_reward,
                state.steps,
                self.agent.epsilon()
            );
            rewards.push(state.total_reward);
        }
        Ok(rewards)
    }

    /// Drives until the simulator ends the episode, without recording,
    /// learning or checkpointing.
    pub fn drive(&mut self) -> Result<f32> {
        let (mut window, mut current, mut state) = self.start(None)?;
        while !state.terminated {
            (current, state) = self.decide(&mut window, current, state, false)?;
        }
        self.enter(EpisodePhase::Terminated);
        tracing::info!(reward = state.total_reward, steps = state.steps, "drive finished");
        Ok(state.total_reward)
    }
}

use crate::{action::Controls, error::Result, frame::Frame};

/// What one simulator tick hands back.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub frame: Frame,
    pub reward: f32,
    pub terminal: bool,
}

/// The driving simulator, stepped synchronously one tick at a time.
pub trait Environment {
    fn reset(&mut self) -> Result<Frame>;

    fn step(&mut self, controls: Controls) -> Result<StepOutcome>;
}

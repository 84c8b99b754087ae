//! Deep Q-learning for driving a simulated car from pixels.
//!
//! The [`agent::DqnAgent`] picks actions epsilon-greedily, replays stored
//! transitions against a frozen target network and checkpoints itself;
//! [`episode::Trainer`] runs the per-episode loop around it.

pub mod action;
pub mod agent;
pub mod checkpoint;
pub mod config;
pub mod device;
pub mod encoder;
pub mod environment;
pub mod episode;
pub mod error;
pub mod estimator;
pub mod experience;
pub mod frame;
#[cfg(feature = "gym")]
pub mod gym;
pub mod network;
pub mod report;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};

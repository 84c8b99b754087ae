use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use racing_dqn::{
    action::ActionSpace,
    agent::DqnAgent,
    config::{AgentConfig, EncoderConfig, TrainerConfig},
    device::DEVICE,
    encoder::StateEncoder,
    episode::Trainer,
    gym::CarRacing,
    network::ConvQNetwork,
    report,
};

const REWARDS_CSV: &str = "rewards.csv";

#[derive(Parser, Debug)]
#[command(name = "racing-dqn", about = "Train a DQN agent to drive CarRacing from pixels")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Train from freshly initialised networks.
    Train {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        episodes: u32,
        show: Option<Show>,
    },
    /// Resume training from the last checkpoint.
    Continue {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        episodes: u32,
        show: Option<Show>,
    },
    /// Drive one rendered episode with the checkpointed agent.
    Test,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Show {
    Show,
}

fn render_mode(show: bool) -> &'static str {
    if show { "human" } else { "rgb_array" }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let (episodes, show, restore) = match cli.mode {
        Mode::Train { episodes, show } => (Some(episodes), show.is_some(), false),
        Mode::Continue { episodes, show } => (Some(episodes), show.is_some(), true),
        Mode::Test => (None, true, true),
    };

    let config = AgentConfig::default();
    let trainer_config = TrainerConfig::default();
    let actions = ActionSpace::car_racing();

    let live = ConvQNetwork::new(actions.len(), config.alpha, &DEVICE)?;
    let target = ConvQNetwork::new(actions.len(), config.alpha, &DEVICE)?;
    let mut agent = DqnAgent::new(live, target, actions.len(), config)?;
    if restore {
        agent
            .restore(&trainer_config.checkpoint, &DEVICE)
            .context("failed to restore checkpoint")?;
    }

    let environment = CarRacing::new(render_mode(show)).context("failed to create simulator")?;
    let encoder = StateEncoder::new(EncoderConfig::default(), &DEVICE);
    let mut trainer = Trainer::new(agent, environment, encoder, actions, trainer_config)?;

    match episodes {
        Some(episodes) => {
            let rewards = trainer.train(episodes)?;
            report::write_rewards(Path::new(REWARDS_CSV), &rewards)?;
        }
        None => {
            trainer.drive()?;
        }
    }
    trainer.environment().close()?;
    Ok(())
}

use std::{fs::File, path::Path};

use polars::{
    frame::DataFrame,
    io::SerWriter,
    prelude::{Column, CsvWriter, NamedFrom},
};

use crate::error::Result;

/// Writes one `episode,reward` row per finished episode, episodes 1-based.
pub fn write_rewards(path: &Path, rewards: &[f32]) -> Result<()> {
    let episodes: Vec<u32> = (1..=rewards.len() as u32).collect();
    let mut df = DataFrame::new(vec![
        Column::new("episode".into(), episodes),
        Column::new("reward".into(), rewards.to_vec()),
    ])?;

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    tracing::info!(path = %path.display(), episodes = rewards.len(), "rewards written");
    Ok(())
}

//! Saving and loading trained networks.
//!
//! Networks are stored as JSON. Every activation, weight and momentum entry is
//! written with enough digits to reload bit for bit, so a reloaded network
//! behaves exactly like the one that was saved.

use crate::error::Result;
use crate::network::Network;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::instrument;

/// Writes `network` to `writer`.
pub fn to_writer<W: Write>(writer: W, network: &Network) -> Result<()> {
    serde_json::to_writer_pretty(writer, network)?;
    Ok(())
}

/// Reads a network from `reader`, verifying it is well formed.
pub fn from_reader<R: Read>(reader: R) -> Result<Network> {
    let network: Network = serde_json::from_reader(reader)?;
    network.check()?;
    Ok(network)
}

/// Saves `network` to the file at `path`, replacing any previous content.
#[instrument(level = "debug", skip(network), err)]
pub fn save<P: AsRef<Path> + std::fmt::Debug>(path: P, network: &Network) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    to_writer(&mut writer, network)?;
    writer.flush()?;
    Ok(())
}

/// Loads a network from the file at `path`.
#[instrument(level = "debug", err)]
pub fn load<P: AsRef<Path> + std::fmt::Debug>(path: P) -> Result<Network> {
    from_reader(BufReader::new(File::open(path)?))
}

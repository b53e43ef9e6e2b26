//! CLI Handler for the node identity tool
//!
//! Provides command-line access to:
//! - Resolved role configuration
//! - The local node descriptor and its wire encoding
//! - Decoding node descriptors received from peers

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::debug;

use crate::config::Settings;
use crate::error::{DiscoveryError, Result};
use crate::startup::NodeStartup;
use crate::types::{NodeIdentity, NodeStatus, VersionGate};
use crate::wire;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override a setting, e.g. `--set node.master=false`
    #[arg(short = 's', long = "set", value_parser = parse_key_val, global = true)]
    pub overrides: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the resolved roles of the local node
    Roles,
    /// Print the local node descriptor
    Show,
    /// Print the hex wire encoding of the local node
    Encode,
    /// Decode a hex node descriptor
    Decode {
        /// Hex-encoded descriptor
        hex: String,
    },
    /// Print protocol versions
    Version,
}

impl Cli {
    /// Settings from the config file (or the default path) with overrides applied.
    pub fn settings(&self) -> Result<Settings> {
        let path = self.config.clone().unwrap_or_else(Settings::default_path);
        let overrides = self.overrides.iter().cloned().collect::<Settings>();
        Ok(Settings::load(&path)?.merge(overrides))
    }
}

fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", raw))
}

pub struct CliHandler {
    settings: Settings,
}

impl CliHandler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Runs a command and returns what should be printed.
    pub fn run(&self, command: &Commands) -> Result<String> {
        debug!(?command, "running command");
        match command {
            Commands::Roles => {
                let startup = NodeStartup::resolve(&self.settings)?;
                Ok(serde_json::to_string_pretty(&startup.role_summary())?)
            }
            Commands::Show => {
                let startup = NodeStartup::resolve(&self.settings)?;
                let report = startup.local_node().report(NodeStatus::Unknown);
                Ok(serde_json::to_string_pretty(&report)?)
            }
            Commands::Encode => {
                let startup = NodeStartup::resolve(&self.settings)?;
                Ok(hex::encode(wire::encode(startup.local_node())))
            }
            Commands::Decode { hex } => {
                let bytes = hex::decode(hex.trim())
                    .map_err(|e| DiscoveryError::config(format!("Invalid hex input: {}", e)))?;
                let node: NodeIdentity = wire::decode(&bytes)?;
                let gate = VersionGate::local();
                let report = json!({
                    "node": node.report(NodeStatus::Unknown),
                    "version": node.version(),
                    "compatible": gate.accepts(node.version()),
                });
                Ok(serde_json::to_string_pretty(&report)?)
            }
            Commands::Version => {
                let gate = VersionGate::local();
                let report = json!({
                    "current": gate.current(),
                    "minimum_compatible": gate.minimum_accepted(),
                });
                Ok(serde_json::to_string_pretty(&report)?)
            }
        }
    }
}

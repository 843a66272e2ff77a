use crate::config::settings::{ReleaseConfig, SearchConfig, Settings, SetOperationConfig};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;
use uuid::Uuid;

/// Operator tool: submits a union analysis over previously registered sets
/// and polls it to completion against a live search backend.
#[derive(Debug, Clone, Parser)]
#[command(name = "set-analysis")]
#[command(about = "Decompose registered entity sets into Venn regions and count them")]
pub struct CliArgs {
    /// Settings file (TOML). Flags below are ignored when given.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "http://localhost:9200")]
    pub base_url: String,

    #[arg(long, default_value = "dcc-release")]
    pub index: String,

    /// UUIDs of the registered sets to analyze.
    #[arg(long, value_delimiter = ',', required = true)]
    pub lists: Vec<Uuid>,

    /// Entity kind to project region counts onto.
    #[arg(long = "type", default_value = "donor")]
    pub entity_type: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn settings(&self) -> Result<Settings> {
        match &self.config {
            Some(path) => Settings::from_file(path),
            None => Ok(Settings {
                search: SearchConfig {
                    base_url: self.base_url.clone(),
                    index: self.index.clone(),
                    request_timeout_seconds: None,
                },
                set_operation: SetOperationConfig::default(),
                release: ReleaseConfig::default(),
            }),
        }
    }
}

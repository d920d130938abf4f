use crate::error::LauncherResult;

use sl_config::Config;
use sl_core::DatabaseMode;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "standalone-launcher")]
#[command(about = "Start, stop and monitor the embedded application server")]
#[command(version)]
pub struct Cli {
    /// Configuration directory (default: $SL_CONFIG_DIR or ./.standalone)
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Preferred web server port
    #[arg(long)]
    pub web_port: Option<u16>,

    /// Preferred database port
    #[arg(long)]
    pub data_port: Option<u16>,

    /// Database setup for the first start: no-changes, empty-database or wizard
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<DatabaseMode>,

    /// Show the database setup choice even if it was made before
    #[arg(long)]
    pub fresh_install: bool,
}

fn parse_mode(value: &str) -> Result<DatabaseMode, String> {
    value.parse()
}

impl Cli {
    pub fn resolve_config_dir(&self) -> LauncherResult<PathBuf> {
        match &self.config_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Config::config_dir()?),
        }
    }

    /// Command line flags win over config.toml and the environment.
    pub fn apply(&self, config: &mut Config) {
        if let Some(port) = self.web_port {
            config.ports.web = port;
        }
        if let Some(port) = self.data_port {
            config.ports.data = port;
        }
    }
}

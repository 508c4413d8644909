use crate::config::ServerConfig;
use clap::Parser;
use std::path::PathBuf;

/// MIND Server - EEG and vitals visualization backend
#[derive(Parser, Debug)]
#[command(name = "mind-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Port to listen on (overrides MIND_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address (overrides MIND_BIND_ADDR)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Upload directory (overrides MIND_UPLOAD_DIR)
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,
}

impl Cli {
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = &self.bind {
            config.bind_addr = bind.clone();
        }
        if let Some(dir) = &self.upload_dir {
            config.upload_directory = dir.clone();
        }
    }
}

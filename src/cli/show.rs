use crate::client::FileAuthStore;
use crate::config::Config;
use crate::error::Result;
use clap::Subcommand;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum ShowResource {
    /// Show the config file, OAuth client secret and stored sign-in paths
    Paths,
    /// Show the effective configuration
    Config,
}

impl ShowResource {
    pub async fn execute(&self) -> Result<()> {
        match self {
            ShowResource::Paths => show_paths(),
            ShowResource::Config => show_config(),
        }
    }
}

fn show_paths() -> Result<()> {
    let config = Config::load()?;
    let store = FileAuthStore::new()?;

    info!(path = ?Config::config_file()?, "Config file");
    info!(path = ?Config::cache_dir()?, "Cache directory");
    info!(path = ?config.server.credentials_path()?, "OAuth client secret");
    info!(path = ?store.path(), exists = store.path().exists(), "Auth state");

    Ok(())
}

fn show_config() -> Result<()> {
    let config = Config::load()?;

    info!(
        host = %config.server.host,
        port = config.server.port,
        origins = ?config.server.allowed_origins,
        "Server"
    );
    info!(api_url = %config.client.api_url, "Client");

    Ok(())
}

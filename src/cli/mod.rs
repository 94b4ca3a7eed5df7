mod auth;
mod browse;
mod render;
mod sheets;
mod show;

use crate::client::{
    AuthSession, FileAuthStore, GoogleIdentity, HttpFacade, SpreadsheetService, SystemClock,
};
use crate::config::Config;
use crate::error::Result;
use crate::server;
use clap::{Parser, Subcommand};

pub use auth::AuthAction;
pub use render::OutputFormat;
pub use show::ShowResource;

#[derive(Parser, Debug)]
#[command(name = "sheets-viewer")]
#[command(about = "Browse Google Drive spreadsheets through a thin API proxy", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Serve { host, port } => {
                let mut config = Config::load()?.server;
                if let Some(host) = host {
                    config.host = host.clone();
                }
                if let Some(port) = port {
                    config.port = *port;
                }
                server::serve(&config).await
            }
            Commands::Auth { action } => action.execute(&mut ClientContext::load()?).await,
            Commands::List { refresh } => sheets::list(&mut ClientContext::load()?, *refresh).await,
            Commands::View {
                file_id,
                range,
                format,
            } => sheets::view(&ClientContext::load()?, file_id, range.as_deref(), *format).await,
            Commands::Metadata { file_id } => {
                sheets::metadata(&ClientContext::load()?, file_id).await
            }
            Commands::Browse => browse::run(&mut ClientContext::load()?).await,
            Commands::Show { resource } => resource.execute().await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API that proxies Google Drive and Sheets
    Serve {
        /// Address to listen on, overriding the config file
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on, overriding the config file
        #[arg(long)]
        port: Option<u16>,
    },
    /// Sign in or out of Google
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// List spreadsheets in Google Drive, most recently modified first
    List {
        /// Skip the cached listing
        #[arg(long)]
        refresh: bool,
    },
    /// Print the values of a sheet
    View {
        file_id: String,
        /// A1 notation range, defaults to A1:Z1000 of the first tab
        #[arg(long)]
        range: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Print the tabs of a spreadsheet
    Metadata { file_id: String },
    /// Interactive session that keeps the spreadsheet list cached between commands
    Browse,
    /// Show local paths and settings
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },
}

/// The client services a signed-in user works with.
pub(crate) struct ClientContext {
    pub session: AuthSession<GoogleIdentity<HttpFacade>, FileAuthStore>,
    pub service: SpreadsheetService<HttpFacade, SystemClock>,
}

impl ClientContext {
    fn load() -> Result<Self> {
        let config = Config::load()?;
        let api = HttpFacade::new(&config.client.api_url)?;

        Ok(Self {
            session: AuthSession::new(GoogleIdentity::new(api.clone()), FileAuthStore::new()?),
            service: SpreadsheetService::new(api, SystemClock),
        })
    }

    pub async fn sign_out(&mut self) {
        self.session.sign_out().await;
        self.service.invalidate();
    }
}

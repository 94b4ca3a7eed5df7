mod handlers;
pub mod schemas;

use crate::config::{GoogleCredentials, ServerConfig};
use crate::error::{AppError, Result};
use crate::google::{
    CodeExchanger, DriveClient, DriveOperations, OAuthCodeExchanger, SheetOperations,
    SheetsClient, TokenInfoVerifier, TokenVerifier,
};
use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, header};
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared, immutable per-process state. Requests carry everything else.
#[derive(Clone)]
pub struct AppState {
    credentials: Arc<std::result::Result<GoogleCredentials, String>>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub drive: Arc<dyn DriveOperations>,
    pub sheets: Arc<dyn SheetOperations>,
    pub exchanger: Arc<dyn CodeExchanger>,
}

impl AppState {
    pub fn new(
        credentials: Result<GoogleCredentials>,
        verifier: Arc<dyn TokenVerifier>,
        drive: Arc<dyn DriveOperations>,
        sheets: Arc<dyn SheetOperations>,
        exchanger: Arc<dyn CodeExchanger>,
    ) -> Self {
        Self {
            credentials: Arc::new(credentials.map_err(|e| e.to_string())),
            verifier,
            drive,
            sheets,
            exchanger,
        }
    }

    pub fn credentials(&self) -> Result<&GoogleCredentials> {
        self.credentials
            .as_ref()
            .as_ref()
            .map_err(|message| AppError::Config(message.clone()))
    }
}

pub fn app_router(state: AppState, allowed_origins: &[String]) -> Result<Router> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            if origin == "*" {
                return Err(AppError::Config(
                    "Wildcard origin cannot be combined with credentials".to_string(),
                ));
            }
            HeaderValue::from_str(origin)
                .map_err(|e| AppError::Config(format!("Invalid allowed origin {origin:?}: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::config))
        .route("/auth/token", post(handlers::exchange_code))
        .route("/spreadsheets", post(handlers::list_spreadsheets))
        .route("/sheets/{file_id}/data", post(handlers::sheet_data))
        .route("/sheets/{file_id}/metadata", post(handlers::sheet_metadata));

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
        .with_state(state))
}

/// Run the facade until Ctrl-C
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let credentials = config
        .credentials_path()
        .and_then(|path| GoogleCredentials::load(&path));
    if let Err(e) = &credentials {
        warn!(error = %e, "Google credentials unavailable; /api/config and /api/auth/token will fail");
    }

    let state = AppState::new(
        credentials,
        Arc::new(TokenInfoVerifier::new(config.tokeninfo_url.clone())),
        Arc::new(DriveClient::new()?),
        Arc::new(SheetsClient::new()?),
        Arc::new(OAuthCodeExchanger::new()?),
    );
    let app = app_router(state, &config.allowed_origins)?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {}", e)))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

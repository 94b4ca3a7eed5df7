use super::api::FacadeApi;
use super::auth::AuthState;
use crate::error::{AppError, Result};
use crate::models::{DriveFile, SheetData, SheetMetadata};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, instrument};

pub const CACHE_DURATION: TimeDelta = TimeDelta::minutes(5);

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct SpreadsheetsCache {
    data: Vec<DriveFile>,
    timestamp: DateTime<Utc>,
    // Entries never outlive the identity that fetched them
    access_token: String,
}

impl SpreadsheetsCache {
    fn is_fresh(&self, now: DateTime<Utc>, access_token: &str) -> bool {
        self.access_token == access_token && now - self.timestamp <= CACHE_DURATION
    }
}

/// Client-side data access. Owns the single spreadsheet list cache slot, so
/// there is exactly one writer.
pub struct SpreadsheetService<A, C> {
    api: A,
    clock: C,
    cache: Option<SpreadsheetsCache>,
}

impl<A, C> SpreadsheetService<A, C>
where
    A: FacadeApi,
    C: Clock,
{
    pub fn new(api: A, clock: C) -> Self {
        Self {
            api,
            clock,
            cache: None,
        }
    }

    #[instrument(name = "Listing spreadsheets", skip(self, auth))]
    pub async fn list_spreadsheets(
        &mut self,
        auth: &AuthState,
        use_cache: bool,
    ) -> Result<Vec<DriveFile>> {
        let access_token = access_token(auth)?;

        if use_cache {
            let now = self.clock.now();
            if let Some(cache) = self.cache.as_ref().filter(|c| c.is_fresh(now, access_token)) {
                debug!("Returning cached spreadsheets");
                return Ok(cache.data.clone());
            }
        }

        debug!("Fetching fresh spreadsheets from API");
        let spreadsheets = self
            .api
            .list_spreadsheets(access_token)
            .await
            .map_err(surface)?;

        self.cache = Some(SpreadsheetsCache {
            data: spreadsheets.clone(),
            timestamp: self.clock.now(),
            access_token: access_token.to_string(),
        });

        Ok(spreadsheets)
    }

    #[instrument(name = "Fetching sheet data", skip(self, auth))]
    pub async fn get_sheet_data(
        &self,
        auth: &AuthState,
        file_id: &str,
        range: Option<&str>,
    ) -> Result<SheetData> {
        let access_token = access_token(auth)?;
        self.api
            .sheet_data(access_token, file_id, range)
            .await
            .map_err(surface)
    }

    #[instrument(name = "Fetching sheet metadata", skip(self, auth))]
    pub async fn get_sheet_metadata(
        &self,
        auth: &AuthState,
        file_id: &str,
    ) -> Result<SheetMetadata> {
        let access_token = access_token(auth)?;
        self.api
            .sheet_metadata(access_token, file_id)
            .await
            .map_err(surface)
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }
}

fn access_token(auth: &AuthState) -> Result<&str> {
    auth.access_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(AppError::NotSignedIn)
}

/// Reword facade errors for the user
fn surface(error: AppError) -> AppError {
    match error {
        AppError::Facade { status: 401, .. } => AppError::SignInRequired,
        other => other,
    }
}

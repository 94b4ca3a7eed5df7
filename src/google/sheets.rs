use super::{AuthenticatedHandle, HttpsClient, SheetOperations, https_client, provider_message};
use crate::error::{AppError, Result};
use crate::models::{SheetData, SheetMetadata};
use async_trait::async_trait;
use google_sheets4::Sheets;
use google_sheets4::api::Scope;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use tracing::{debug, instrument};

/// Window read when the caller doesn't name a range
pub const DEFAULT_RANGE: &str = "A1:Z1000";

pub struct SheetsClient {
    client: HttpsClient,
}

impl SheetsClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: https_client()?,
        })
    }

    fn hub(&self, handle: &AuthenticatedHandle) -> Sheets<HttpsConnector<HttpConnector>> {
        Sheets::new(self.client.clone(), handle.bearer())
    }
}

#[async_trait]
impl SheetOperations for SheetsClient {
    #[instrument(name = "Fetching sheet values", skip(self, handle))]
    async fn get_data(
        &self,
        handle: &AuthenticatedHandle,
        sheet_id: &str,
        range: &str,
    ) -> Result<SheetData> {
        let (_, value_range) = self
            .hub(handle)
            .spreadsheets()
            .values_get(sheet_id, range)
            .add_scope(Scope::SpreadsheetReadonly)
            .doit()
            .await
            .map_err(|e| {
                AppError::RemoteApi(format!("Failed to get sheet data: {}", provider_message(&e)))
            })?;

        let data = SheetData::from(value_range);
        debug!(rows = data.values.len(), "Fetched sheet values");

        Ok(data)
    }

    #[instrument(name = "Fetching sheet metadata", skip(self, handle))]
    async fn get_metadata(
        &self,
        handle: &AuthenticatedHandle,
        sheet_id: &str,
    ) -> Result<SheetMetadata> {
        let (_, spreadsheet) = self
            .hub(handle)
            .spreadsheets()
            .get(sheet_id)
            .param("fields", "sheets.properties")
            .add_scope(Scope::SpreadsheetReadonly)
            .doit()
            .await
            .map_err(|e| {
                AppError::RemoteApi(format!(
                    "Failed to get sheet metadata: {}",
                    provider_message(&e)
                ))
            })?;

        Ok(spreadsheet.into())
    }
}

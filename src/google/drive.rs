use super::{AuthenticatedHandle, DriveOperations, HttpsClient, https_client, provider_message};
use crate::error::{AppError, Result};
use crate::models::DriveFile;
use async_trait::async_trait;
use google_drive3::DriveHub;
use google_drive3::api::Scope;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use tracing::{debug, instrument};

const SPREADSHEET_QUERY: &str =
    "mimeType='application/vnd.google-apps.spreadsheet' and trashed=false";
const FILE_FIELDS: &str = "files(id,name,modifiedTime,webViewLink)";

pub struct DriveClient {
    client: HttpsClient,
}

impl DriveClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: https_client()?,
        })
    }

    fn hub(&self, handle: &AuthenticatedHandle) -> DriveHub<HttpsConnector<HttpConnector>> {
        DriveHub::new(self.client.clone(), handle.bearer())
    }
}

#[async_trait]
impl DriveOperations for DriveClient {
    #[instrument(name = "Listing spreadsheets", skip_all)]
    async fn list_spreadsheets(&self, handle: &AuthenticatedHandle) -> Result<Vec<DriveFile>> {
        let (_, file_list) = self
            .hub(handle)
            .files()
            .list()
            .q(SPREADSHEET_QUERY)
            .order_by("modifiedTime desc")
            .param("fields", FILE_FIELDS)
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .map_err(|e| {
                AppError::RemoteApi(format!("Google Drive API failed: {}", provider_message(&e)))
            })?;

        let files: Vec<DriveFile> = file_list
            .files
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect();
        debug!(count = files.len(), "Listed spreadsheets");

        Ok(files)
    }
}

use crate::error::{AppError, Result};
use crate::google::TokenGrant;
use crate::models::{DriveFile, SheetData, SheetMetadata};
use crate::server::schemas::{
    ClientSettings, CodeExchangeRequest, ErrorResponse, SheetDataRequest, SheetDataResponse,
    SheetMetadataResponse, SpreadsheetsResponse, TokenRequest,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Calls the HTTP facade on behalf of the signed-in user.
#[async_trait]
pub trait FacadeApi: Send + Sync {
    async fn client_settings(&self) -> Result<ClientSettings>;

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenGrant>;

    async fn list_spreadsheets(&self, access_token: &str) -> Result<Vec<DriveFile>>;

    async fn sheet_data(
        &self,
        access_token: &str,
        file_id: &str,
        range: Option<&str>,
    ) -> Result<SheetData>;

    async fn sheet_metadata(&self, access_token: &str, file_id: &str) -> Result<SheetMetadata>;
}

#[derive(Clone, Debug)]
pub struct HttpFacade {
    client: Client,
    base_url: Url,
}

impl HttpFacade {
    pub fn new(api_url: &str) -> Result<Self> {
        let base_url = Url::parse(api_url)
            .map_err(|e| AppError::Config(format!("Invalid api_url {:?}: {}", api_url, e)))?;

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("api_url {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| format!("Request failed with status {}", status));
            debug!(status = status.as_u16(), %message, "Facade returned an error");
            return Err(AppError::Facade {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl FacadeApi for HttpFacade {
    async fn client_settings(&self) -> Result<ClientSettings> {
        let url = self.endpoint(&["config"])?;
        self.send(self.client.get(url)).await
    }

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenGrant> {
        let url = self.endpoint(&["auth", "token"])?;
        let body = CodeExchangeRequest {
            code: Some(code.to_string()),
            code_verifier: Some(code_verifier.to_string()),
        };
        self.send(self.client.post(url).json(&body)).await
    }

    async fn list_spreadsheets(&self, access_token: &str) -> Result<Vec<DriveFile>> {
        let url = self.endpoint(&["spreadsheets"])?;
        let body = TokenRequest {
            access_token: Some(access_token.to_string()),
        };
        let response: SpreadsheetsResponse = self.send(self.client.post(url).json(&body)).await?;
        Ok(response.spreadsheets)
    }

    async fn sheet_data(
        &self,
        access_token: &str,
        file_id: &str,
        range: Option<&str>,
    ) -> Result<SheetData> {
        let url = self.endpoint(&["sheets", file_id, "data"])?;
        let body = SheetDataRequest {
            access_token: Some(access_token.to_string()),
            range: range.map(str::to_string),
        };
        let response: SheetDataResponse = self.send(self.client.post(url).json(&body)).await?;
        Ok(response.data)
    }

    async fn sheet_metadata(&self, access_token: &str, file_id: &str) -> Result<SheetMetadata> {
        let url = self.endpoint(&["sheets", file_id, "metadata"])?;
        let body = TokenRequest {
            access_token: Some(access_token.to_string()),
        };
        let response: SheetMetadataResponse = self.send(self.client.post(url).json(&body)).await?;
        Ok(response.metadata)
    }
}

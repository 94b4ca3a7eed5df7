use crate::models::{DriveFile, SheetData, SheetMetadata};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SheetDataRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CodeExchangeRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub code_verifier: Option<String>,
}

/// Settings a client needs to start the consent flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    pub client_id: String,
    pub redirect_uri: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpreadsheetsResponse {
    #[serde(default)]
    pub spreadsheets: Vec<DriveFile>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SheetDataResponse {
    pub data: SheetData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SheetMetadataResponse {
    pub metadata: SheetMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

use chrono::SecondsFormat;
use google_drive3::api::File;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub modified_time: String,
    pub web_view_link: String,
}

impl From<File> for DriveFile {
    fn from(file: File) -> Self {
        DriveFile {
            id: file.id.unwrap_or_default(),
            name: file.name.unwrap_or_default(),
            // Drive reports millisecond precision with a Z suffix
            modified_time: file
                .modified_time
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_default(),
            web_view_link: file.web_view_link.unwrap_or_default(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_from_drive_api_file() {
        let file = File {
            id: Some("abc".to_string()),
            name: Some("Budget".to_string()),
            modified_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
            web_view_link: Some("https://docs.google.com/spreadsheets/d/abc/edit".to_string()),
            ..Default::default()
        };

        let drive_file = DriveFile::from(file);

        assert_eq!(drive_file.id, "abc");
        assert_eq!(drive_file.name, "Budget");
        assert_eq!(drive_file.modified_time, "2024-05-01T10:00:00.000Z");
        assert_eq!(
            drive_file.web_view_link,
            "https://docs.google.com/spreadsheets/d/abc/edit"
        );
    }

    #[test]
    fn test_camel_case_wire_format() {
        let json = serde_json::to_value(test_helpers::mock_drive_file("f1", 3)).unwrap();

        assert_eq!(json["modifiedTime"], "2025-01-03T10:00:00.000Z");
        assert_eq!(
            json["webViewLink"],
            "https://docs.google.com/spreadsheets/d/f1/edit"
        );
    }
}

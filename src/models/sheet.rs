use google_sheets4::api::{Sheet, Spreadsheet, ValueRange};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A snapshot of a cell range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SheetData {
    pub range: String,
    pub major_dimension: String,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SheetMetadata {
    pub sheets: Vec<SheetInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SheetInfo {
    pub title: String,
    pub sheet_id: i32,
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl From<ValueRange> for SheetData {
    fn from(range: ValueRange) -> Self {
        let values = range
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();

        SheetData {
            range: range.range.unwrap_or_default(),
            major_dimension: range.major_dimension.unwrap_or_else(|| "ROWS".to_string()),
            values,
        }
    }
}

impl From<Spreadsheet> for SheetMetadata {
    fn from(spreadsheet: Spreadsheet) -> Self {
        let sheets = spreadsheet
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|sheet: Sheet| sheet.properties)
            .map(|props| SheetInfo {
                title: props.title.unwrap_or_default(),
                sheet_id: props.sheet_id.unwrap_or_default(),
            })
            .collect();

        SheetMetadata { sheets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use google_sheets4::api::SheetProperties;
    use serde_json::json;

    #[test]
    fn test_value_range_narrowing() {
        let range = ValueRange {
            range: Some("Sheet1!A1:Z1000".to_string()),
            major_dimension: Some("ROWS".to_string()),
            values: Some(vec![
                vec![json!("Name"), json!("Amount")],
                vec![json!("Coffee"), json!(3.5)],
                vec![json!(true), Value::Null],
            ]),
        };

        let data = SheetData::from(range);

        assert_eq!(data.range, "Sheet1!A1:Z1000");
        assert_eq!(
            data.values,
            vec![
                vec!["Name", "Amount"],
                vec!["Coffee", "3.5"],
                vec!["true", ""],
            ]
        );
    }

    #[test]
    fn test_empty_range_has_no_values() {
        let range = ValueRange {
            range: Some("Sheet1!A1:Z1000".to_string()),
            major_dimension: Some("ROWS".to_string()),
            values: None,
        };

        let data = SheetData::from(range);
        assert!(data.values.is_empty());

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["majorDimension"], "ROWS");
        assert_eq!(json["values"], json!([]));
    }

    #[test]
    fn test_metadata_from_spreadsheet() {
        let spreadsheet = Spreadsheet {
            sheets: Some(vec![
                Sheet {
                    properties: Some(SheetProperties {
                        title: Some("Summary".to_string()),
                        sheet_id: Some(0),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                Sheet {
                    properties: Some(SheetProperties {
                        title: Some("Raw data".to_string()),
                        sheet_id: Some(1234),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };

        let metadata = SheetMetadata::from(spreadsheet);

        assert_eq!(
            metadata.sheets,
            vec![
                SheetInfo {
                    title: "Summary".to_string(),
                    sheet_id: 0
                },
                SheetInfo {
                    title: "Raw data".to_string(),
                    sheet_id: 1234
                },
            ]
        );
        assert_eq!(
            serde_json::to_value(&metadata).unwrap()["sheets"][1]["sheetId"],
            1234
        );
    }
}

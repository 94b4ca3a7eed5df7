use crate::error::Result;
use crate::models::{DriveFile, SheetData, SheetMetadata};
use clap::ValueEnum;
use std::io::Write;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
}

pub(super) fn spreadsheets<W: Write>(out: &mut W, files: &[DriveFile]) -> Result<()> {
    if files.is_empty() {
        writeln!(out, "No spreadsheets found")?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = files
        .iter()
        .enumerate()
        .map(|(i, f)| {
            vec![
                (i + 1).to_string(),
                f.name.clone(),
                f.modified_time.clone(),
                f.id.clone(),
            ]
        })
        .collect();
    table(out, &rows)
}

pub(super) fn sheet_data<W: Write>(
    out: &mut W,
    data: &SheetData,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => table(out, &data.values),
        OutputFormat::Csv => {
            let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);
            for row in &data.values {
                writer.write_record(row)?;
            }
            writer.flush()?;
            Ok(())
        }
    }
}

pub(super) fn metadata<W: Write>(out: &mut W, metadata: &SheetMetadata) -> Result<()> {
    let rows: Vec<Vec<String>> = metadata
        .sheets
        .iter()
        .map(|s| vec![s.sheet_id.to_string(), s.title.clone()])
        .collect();
    table(out, &rows)
}

/// Left-aligned columns; rows may be ragged
fn table<W: Write>(out: &mut W, rows: &[Vec<String>]) -> Result<()> {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let width = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(width),
                None => widths.push(width),
            }
        }
    }

    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "{}", line.trim_end())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sheet::SheetInfo;
    use crate::models::drive_file::test_helpers::mock_drive_file;

    fn render<F: FnOnce(&mut Vec<u8>) -> Result<()>>(f: F) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sample_data() -> SheetData {
        SheetData {
            range: "Sheet1!A1:Z1000".to_string(),
            major_dimension: "ROWS".to_string(),
            values: vec![
                vec!["Item".to_string(), "Cost".to_string()],
                vec!["Coffee, large".to_string(), "3.50".to_string()],
                vec!["Tea".to_string()],
            ],
        }
    }

    #[test]
    fn test_table_aligns_ragged_rows() {
        let output = render(|out| sheet_data(out, &sample_data(), OutputFormat::Table));

        assert_eq!(
            output,
            "Item           Cost\nCoffee, large  3.50\nTea\n"
        );
    }

    #[test]
    fn test_csv_quotes_cells() {
        let output = render(|out| sheet_data(out, &sample_data(), OutputFormat::Csv));

        assert_eq!(output, "Item,Cost\n\"Coffee, large\",3.50\nTea\n");
    }

    #[test]
    fn test_spreadsheets_are_numbered() {
        let files = vec![mock_drive_file("abc", 2), mock_drive_file("d", 1)];

        let output = render(|out| spreadsheets(out, &files));

        assert_eq!(
            output,
            "1  Spreadsheet abc  2025-01-02T10:00:00.000Z  abc\n\
             2  Spreadsheet d    2025-01-01T10:00:00.000Z  d\n"
        );
    }

    #[test]
    fn test_empty_listing() {
        let output = render(|out| spreadsheets(out, &[]));

        assert_eq!(output, "No spreadsheets found\n");
    }

    #[test]
    fn test_metadata_rows() {
        let metadata = SheetMetadata {
            sheets: vec![SheetInfo {
                title: "Summary".to_string(),
                sheet_id: 0,
            }],
        };

        let output = render(|out| super::metadata(out, &metadata));

        assert_eq!(output, "0  Summary\n");
    }
}

pub mod drive_file;
pub mod sheet;

pub use drive_file::DriveFile;
pub use sheet::{SheetData, SheetMetadata};

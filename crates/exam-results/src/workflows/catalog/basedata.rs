use serde::Serialize;
use std::path::Path;
use tracing::info;

/// File formats accepted for basedata uploads. Only the extension is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BasedataFormat {
    Csv,
    Xlsx,
    Xls,
    Json,
}

impl BasedataFormat {
    pub const ACCEPTED_EXTENSIONS: [&'static str; 4] = [".csv", ".xlsx", ".xls", ".json"];

    pub fn from_file_name(file_name: &str) -> Result<Self, UploadError> {
        let extension = Path::new(file_name.trim())
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("xlsx") => Ok(Self::Xlsx),
            Some("xls") => Ok(Self::Xls),
            Some("json") => Ok(Self::Json),
            _ => Err(UploadError::UnsupportedFileType {
                file_name: file_name.to_string(),
            }),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Xlsx | Self::Xls => "Excel",
            Self::Json => "JSON",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("no file selected")]
    MissingFile,
    #[error("{file_name} is not a CSV, Excel, or JSON file")]
    UnsupportedFileType { file_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    pub file_name: String,
    pub format: BasedataFormat,
    pub message: String,
}

/// Accept a basedata file for processing. Contents are not inspected.
pub fn accept_upload(file_name: &str) -> Result<UploadReceipt, UploadError> {
    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err(UploadError::MissingFile);
    }

    let format = BasedataFormat::from_file_name(file_name)?;
    info!(file = file_name, format = format.label(), "basedata upload accepted");

    Ok(UploadReceipt {
        file_name: file_name.to_string(),
        format,
        message: format!("{file_name} has been uploaded and is being processed"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_extensions_in_any_case() {
        assert_eq!(
            BasedataFormat::from_file_name("pupils.CSV"),
            Ok(BasedataFormat::Csv)
        );
        assert_eq!(
            BasedataFormat::from_file_name("entries.xlsx"),
            Ok(BasedataFormat::Xlsx)
        );
        assert_eq!(
            BasedataFormat::from_file_name("legacy.Xls"),
            Ok(BasedataFormat::Xls)
        );
        assert_eq!(
            BasedataFormat::from_file_name("catalog.json"),
            Ok(BasedataFormat::Json)
        );
    }

    #[test]
    fn rejects_other_or_missing_extensions() {
        assert!(BasedataFormat::from_file_name("notes.txt").is_err());
        assert!(BasedataFormat::from_file_name("README").is_err());
        assert!(BasedataFormat::from_file_name("archive.csv.zip").is_err());
    }

    #[test]
    fn accept_upload_reports_receipt() {
        let receipt = accept_upload(" basedata.json ").expect("accepted");
        assert_eq!(receipt.file_name, "basedata.json");
        assert_eq!(receipt.format, BasedataFormat::Json);
        assert!(receipt.message.contains("being processed"));

        assert_eq!(accept_upload(""), Err(UploadError::MissingFile));
    }
}

use shared::models::DocType;
use shared::number_format::ParseError;
use shared::report::FilterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration file error: {source}")]
    ConfigFileError {
        #[from]
        source: serde_json::Error,
    },

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("{source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("Report not found: '{0}'")]
    ReportNotFound(String),

    #[error("Invalid report filter: {source}")]
    FilterError {
        #[from]
        source: FilterError,
    },

    #[error("Row {index} is out of range")]
    RowOutOfRange { index: usize },

    #[error("Column '{0}' is not editable")]
    NotEditable(String),

    #[error("Please select rows to create {doctype}")]
    NoRowsSelected { doctype: DocType },

    #[error("No valid items to create {doctype}.")]
    NoValidItems { doctype: DocType },

    #[error("Unknown document type: '{0}'")]
    UnknownDocType(String),

    #[error("Item not found: '{0}'")]
    ItemNotFound(String),

    #[error("Document error: {0}")]
    DocumentError(String),

    // Catch-all for anyhow errors when direct conversion is suitable
    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl From<EngineError> for tonic::Status {
    fn from(err: EngineError) -> Self {
        tracing::error!("Mapping EngineError to tonic::Status: {:?}", err); // Log the error source
        let message = err.to_string();
        match err {
            EngineError::ConfigError(_) | EngineError::ConfigFileError { .. } => {
                tonic::Status::failed_precondition(message)
            }
            EngineError::CsvSystemError { .. }
            | EngineError::CsvDataFormatError(_)
            | EngineError::Parse { .. }
            | EngineError::FilterError { .. }
            | EngineError::RowOutOfRange { .. }
            | EngineError::NotEditable(_)
            | EngineError::NoRowsSelected { .. }
            | EngineError::NoValidItems { .. }
            | EngineError::UnknownDocType(_) => tonic::Status::invalid_argument(message),
            EngineError::ReportNotFound(_) | EngineError::ItemNotFound(_) => {
                tonic::Status::not_found(message)
            }
            EngineError::IoError { .. }
            | EngineError::DocumentError(_)
            | EngineError::AnyhowError(_) => tonic::Status::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_errors_read_like_prompts() {
        let err = EngineError::NoRowsSelected {
            doctype: DocType::MaterialRequest,
        };
        assert_eq!(err.to_string(), "Please select rows to create Material Request");
        let err = EngineError::NoValidItems {
            doctype: DocType::PurchaseOrder,
        };
        assert_eq!(err.to_string(), "No valid items to create Purchase Order.");
    }

    #[test]
    fn test_status_codes() {
        let status: tonic::Status = EngineError::ReportNotFound("Stock Ledger".into()).into();
        assert_eq!(status.code(), tonic::Code::NotFound);

        let status: tonic::Status = EngineError::from(ParseError::Empty).into();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let status: tonic::Status = EngineError::from(io).into();
        assert_eq!(status.code(), tonic::Code::Internal);
        assert!(status.message().contains("I/O error"));
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid timestamp '{value}' on line {line}: {source}")]
    Timestamp {
        line: u64,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Timestamp out of range on line {line}: {seconds} seconds")]
    TimestampRange { line: u64, seconds: i64 },

    #[error("XML write failed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Rendered document is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

use crate::constants::{
    FIELD_BODY, FIELD_COUNT, FIELD_OTHER_PARTY, FIELD_SENT_FLAG, FIELD_SERVICE, FIELD_TIMESTAMP,
    TYPE_RECEIVED, TYPE_SENT,
};

/// One line of the iOS export, as read from the CSV file.
///
/// Field count is not checked here; see [`crate::converter::is_valid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    pub fields: Vec<String>,
    /// 1-based line number in the source file, for error messages
    pub line: u64,
}

impl InputRow {
    pub fn new(fields: Vec<String>, line: u64) -> Self {
        Self { fields, line }
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn has_expected_width(&self) -> bool {
        self.fields.len() == FIELD_COUNT
    }

    pub fn other_party(&self) -> Option<&str> {
        self.field(FIELD_OTHER_PARTY)
    }

    pub fn sent_flag(&self) -> Option<&str> {
        self.field(FIELD_SENT_FLAG)
    }

    pub fn raw_timestamp(&self) -> Option<&str> {
        self.field(FIELD_TIMESTAMP)
    }

    pub fn body(&self) -> Option<&str> {
        self.field(FIELD_BODY)
    }

    pub fn service(&self) -> Option<&str> {
        self.field(FIELD_SERVICE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

impl Direction {
    /// Value of the `type` attribute in SMS Backup & Restore files
    pub fn sbr_type(self) -> &'static str {
        match self {
            Direction::Received => TYPE_RECEIVED,
            Direction::Sent => TYPE_SENT,
        }
    }
}

/// A converted message, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub direction: Direction,
    pub other_party: String,
    /// Milliseconds since the Unix epoch
    pub timestamp_millis: i64,
    pub body: String,
    pub is_read: bool,
    pub service: String,
}

/// Which zone the wall-clock step of the timestamp conversion runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZoneMode {
    #[default]
    Local,
    Utc,
}

/// Counters for one conversion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub rows_read: usize,
    pub converted: usize,
    pub skipped: usize,
}

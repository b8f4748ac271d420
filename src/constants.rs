//! Constants shared by the converter and the output writers.
//! These pin down the input layout and the fixed parts of the SMS Backup & Restore format.

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z, the reference date iOS stores.
pub const APPLE_EPOCH_OFFSET_SECS: i64 = 978_307_200;

/// Only this many leading characters of the raw timestamp are parsed.
pub const TIMESTAMP_PREFIX_CHARS: usize = 9;

// Input row layout
pub const FIELD_COUNT: usize = 5;
pub const FIELD_OTHER_PARTY: usize = 0;
pub const FIELD_SENT_FLAG: usize = 1;
pub const FIELD_TIMESTAMP: usize = 2;
pub const FIELD_BODY: usize = 3;
pub const FIELD_SERVICE: usize = 4;

/// Value of the sent flag column for outgoing messages
pub const SENT_FLAG: &str = "1";

/// Addresses shorter than this are treated as short codes or names and dropped.
pub const MIN_ADDRESS_CHARS: usize = 7;

// Output document names
pub const ROOT_ELEMENT: &str = "smses";
pub const MESSAGE_ELEMENT: &str = "sms";

// SMS Backup & Restore message types
pub const TYPE_RECEIVED: &str = "1";
pub const TYPE_SENT: &str = "2";

/// Attributes every `sms` element carries with the same value.
pub const FIXED_ATTRIBUTES: [(&str, &str); 7] = [
    ("protocol", "0"),
    ("subject", "null"),
    ("toa", "0"),
    ("sc_toa", "0"),
    ("service_center", "null"),
    ("status", "-1"),
    ("locked", "0"),
];

// Chats CSV export
pub const CHATS_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const CHATS_SENT: &str = "SENT";
pub const CHATS_RECEIVED: &str = "RECEIVED";

// Console progress lines
pub const PROGRESS_READING: &str = "Reading and converting...";
pub const PROGRESS_WRITING: &str = "Writing outfile file.";
pub const PROGRESS_DONE: &str = "Done.";

/// Environment variable naming a directory for JSON log files
pub const LOG_DIR_ENV: &str = "SMS_CONVERT_LOG_DIR";

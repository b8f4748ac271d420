//! Row validation and conversion from the iOS export into [`Message`] values.
//!
//! Rows are filtered with a heuristic on the address column: anything that
//! looks like an email address or a named contact is dropped without error.
//! Only rows that pass are parsed further, so a malformed timestamp on a
//! dropped row never fails the run.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{Local, LocalResult, TimeZone, Utc};
use csv::ReaderBuilder;
use tracing::{debug, info};

use crate::constants::{APPLE_EPOCH_OFFSET_SECS, MIN_ADDRESS_CHARS, SENT_FLAG, TIMESTAMP_PREFIX_CHARS};
use crate::error::{ConvertError, Result};
use crate::types::{ConversionReport, Direction, InputRow, Message, TimeZoneMode};

/// True if any character has the Unicode `Alphabetic` property.
///
/// This is wider than the letter categories alone: letter numerals such as
/// `Ⅻ` and combining vowel signs also count, so such addresses are dropped.
pub fn has_alpha(value: &str) -> bool {
    value.chars().any(char::is_alphabetic)
}

/// True for values that look like a phone number rather than an email or a name.
pub fn is_phone_like(address: &str) -> bool {
    !address.contains('@') && !has_alpha(address) && address.chars().count() >= MIN_ADDRESS_CHARS
}

pub fn is_valid(row: &InputRow) -> bool {
    row.has_expected_width() && row.other_party().is_some_and(is_phone_like)
}

pub fn direction_from_flag(flag: &str) -> Direction {
    if flag == SENT_FLAG {
        Direction::Sent
    } else {
        Direction::Received
    }
}

/// Parses an iOS timestamp field into Unix seconds.
///
/// Only the first nine characters are read. That matches second-precision
/// exports; nanosecond-precision values are cut down to their leading digits.
pub fn apple_to_unix_seconds(raw: &str, line: u64) -> Result<i64> {
    let prefix: String = raw.chars().take(TIMESTAMP_PREFIX_CHARS).collect();
    let apple_secs: i64 = prefix
        .trim()
        .parse()
        .map_err(|source| ConvertError::Timestamp {
            line,
            value: raw.to_string(),
            source,
        })?;

    apple_secs
        .checked_add(APPLE_EPOCH_OFFSET_SECS)
        .ok_or(ConvertError::TimestampRange {
            line,
            seconds: apple_secs,
        })
}

/// Converts Unix seconds to milliseconds by way of a wall-clock date-time in `mode`.
///
/// In local mode a time that falls in a DST fold resolves to the earlier instant,
/// and one that falls in a DST gap keeps the original seconds.
pub fn wall_clock_millis(unix_secs: i64, mode: TimeZoneMode, line: u64) -> Result<i64> {
    let out_of_range = || ConvertError::TimestampRange {
        line,
        seconds: unix_secs,
    };

    let seconds = match mode {
        TimeZoneMode::Utc => Utc
            .timestamp_opt(unix_secs, 0)
            .single()
            .ok_or_else(out_of_range)?
            .timestamp(),
        TimeZoneMode::Local => {
            let local = Local
                .timestamp_opt(unix_secs, 0)
                .single()
                .ok_or_else(out_of_range)?;
            match Local.from_local_datetime(&local.naive_local()) {
                LocalResult::Single(dt) => dt.timestamp(),
                LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
                LocalResult::None => unix_secs,
            }
        }
    };

    seconds.checked_mul(1000).ok_or_else(out_of_range)
}

/// Converts one row, returning `None` for rows that fail validation.
pub fn convert_row(row: &InputRow, mode: TimeZoneMode) -> Result<Option<Message>> {
    if !is_valid(row) {
        debug!(line = row.line, fields = row.fields.len(), "Skipping row");
        return Ok(None);
    }

    // Width is checked above, so every field is present.
    let field = |value: Option<&str>| value.unwrap_or_default().to_string();

    let unix_secs = apple_to_unix_seconds(row.raw_timestamp().unwrap_or_default(), row.line)?;
    let timestamp_millis = wall_clock_millis(unix_secs, mode, row.line)?;

    Ok(Some(Message {
        direction: direction_from_flag(row.sent_flag().unwrap_or_default()),
        other_party: field(row.other_party()),
        timestamp_millis,
        body: field(row.body()),
        is_read: true,
        service: field(row.service()),
    }))
}

/// Reads headerless CSV rows from `reader` and converts every valid one.
///
/// Stops at the first fatal error; nothing is returned for earlier rows in that case.
pub fn convert_reader<R: Read>(
    reader: R,
    mode: TimeZoneMode,
) -> Result<(Vec<Message>, ConversionReport)> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut messages = Vec::new();
    let mut report = ConversionReport::default();

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row = InputRow::new(record.iter().map(str::to_string).collect(), line);
        report.rows_read += 1;

        match convert_row(&row, mode)? {
            Some(message) => {
                report.converted += 1;
                messages.push(message);
            }
            None => report.skipped += 1,
        }
    }

    info!(
        rows_read = report.rows_read,
        converted = report.converted,
        skipped = report.skipped,
        "Conversion finished"
    );
    Ok((messages, report))
}

pub fn convert_file(path: &Path, mode: TimeZoneMode) -> Result<(Vec<Message>, ConversionReport)> {
    debug!("Opening input {}", path.display());
    let file = File::open(path)?;
    convert_reader(BufReader::new(file), mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> InputRow {
        InputRow::new(fields.iter().map(|f| f.to_string()).collect(), 1)
    }

    #[test]
    fn test_phone_number_row_is_valid() {
        assert!(is_valid(&row(&["15551234567", "1", "347155200000", "Hello", "SMS"])));
        assert!(is_valid(&row(&["+1 (555) 123-4567", "0", "347155200", "Hi", "SMS"])));
    }

    #[test]
    fn test_email_and_named_addresses_are_invalid() {
        assert!(!is_valid(&row(&["bob@example.com", "0", "347155200000", "Hi", "iMessage"])));
        assert!(!is_valid(&row(&["1555123@4567", "0", "347155200000", "Hi", "iMessage"])));
        assert!(!is_valid(&row(&["Mom Mobile", "0", "347155200000", "Hi", "SMS"])));
        assert!(!is_valid(&row(&["5551234x", "0", "347155200000", "Hi", "SMS"])));
    }

    #[test]
    fn test_letter_like_numerals_count_as_alphabetic() {
        assert!(has_alpha("555Ⅻ1234"));
        assert!(!is_phone_like("555Ⅻ1234"));
        assert!(!has_alpha("+44 (0)20 7946-0958"));
    }

    #[test]
    fn test_short_address_is_invalid() {
        assert!(!is_valid(&row(&["123456", "0", "347155200000", "Hi", "SMS"])));
        assert!(is_valid(&row(&["1234567", "0", "347155200000", "Hi", "SMS"])));
    }

    #[test]
    fn test_wrong_field_count_is_invalid() {
        assert!(!is_valid(&row(&["15551234567", "1", "347155200000", "Hello"])));
        assert!(!is_valid(&row(&["15551234567", "1", "347155200000", "Hello", "SMS", "extra"])));
        assert!(!is_valid(&row(&[])));
    }

    #[test]
    fn test_direction_from_flag() {
        assert_eq!(direction_from_flag("1"), Direction::Sent);
        assert_eq!(direction_from_flag("0"), Direction::Received);
        assert_eq!(direction_from_flag(""), Direction::Received);
        assert_eq!(direction_from_flag("true"), Direction::Received);
    }

    #[test]
    fn test_timestamp_uses_first_nine_characters() {
        assert_eq!(apple_to_unix_seconds("347155200000", 1).unwrap(), 1_325_462_400);
        assert_eq!(apple_to_unix_seconds("347155200", 1).unwrap(), 1_325_462_400);
        assert_eq!(apple_to_unix_seconds("0", 1).unwrap(), APPLE_EPOCH_OFFSET_SECS);
    }

    #[test]
    fn test_timestamp_tolerates_surrounding_whitespace() {
        // The leading space is one of the nine characters, so the last digit is cut.
        assert_eq!(apple_to_unix_seconds(" 34715520x", 1).unwrap(), 34_715_520 + APPLE_EPOCH_OFFSET_SECS);
        assert_eq!(apple_to_unix_seconds("34715520 ", 1).unwrap(), 34_715_520 + APPLE_EPOCH_OFFSET_SECS);
        assert_eq!(apple_to_unix_seconds("347155200 ", 1).unwrap(), 1_325_462_400);
    }

    #[test]
    fn test_unparseable_timestamp_is_an_error() {
        let err = apple_to_unix_seconds("abc", 7).unwrap_err();
        match err {
            ConvertError::Timestamp { line, value, .. } => {
                assert_eq!(line, 7);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(apple_to_unix_seconds("", 1).is_err());
        assert!(apple_to_unix_seconds("12345678x9", 1).is_err());
    }

    #[test]
    fn test_wall_clock_millis_round_trips() {
        assert_eq!(
            wall_clock_millis(1_325_462_400, TimeZoneMode::Utc, 1).unwrap(),
            1_325_462_400_000
        );
        assert_eq!(
            wall_clock_millis(1_325_462_400, TimeZoneMode::Local, 1).unwrap(),
            1_325_462_400_000
        );
    }

    #[test]
    fn test_convert_row_builds_message() {
        let message = convert_row(
            &row(&["15551234567", "1", "347155200000", "Hello", "SMS"]),
            TimeZoneMode::Utc,
        )
        .unwrap()
        .unwrap();

        assert_eq!(message.direction, Direction::Sent);
        assert_eq!(message.other_party, "15551234567");
        assert_eq!(message.timestamp_millis, 1_325_462_400_000);
        assert_eq!(message.body, "Hello");
        assert_eq!(message.service, "SMS");
        assert!(message.is_read);
    }

    #[test]
    fn test_invalid_row_skips_timestamp_parsing() {
        let result = convert_row(
            &row(&["bob@example.com", "0", "not-a-number", "Hi", "iMessage"]),
            TimeZoneMode::Utc,
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_convert_reader_counts_rows() {
        let input = "15551234567,1,347155200000,Hello,SMS\n\
                     bob@example.com,0,347155200000,Hi,iMessage\n\
                     15559876543,0,347155260000,\"Hey, you\",SMS\n\
                     short\n";
        let (messages, report) = convert_reader(input.as_bytes(), TimeZoneMode::Utc).unwrap();

        assert_eq!(report.rows_read, 4);
        assert_eq!(report.converted, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(messages[1].body, "Hey, you");
        assert_eq!(messages[1].direction, Direction::Received);
        assert_eq!(messages[1].timestamp_millis, 1_325_462_460_000);
    }

    #[test]
    fn test_convert_reader_ignores_blank_lines() {
        let input = "\n15551234567,1,347155200000,Hello,SMS\n\n\n15559876543,0,347155200000,Hi,SMS\n\n";
        let (messages, report) = convert_reader(input.as_bytes(), TimeZoneMode::Utc).unwrap();

        assert_eq!(report.rows_read, 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_convert_reader_empty_input() {
        let (messages, report) = convert_reader("".as_bytes(), TimeZoneMode::Local).unwrap();
        assert!(messages.is_empty());
        assert_eq!(report, ConversionReport::default());
    }

    #[test]
    fn test_convert_reader_reports_bad_timestamp_line() {
        let input = "15551234567,1,347155200000,Hello,SMS\n15551234567,1,oops,Hello,SMS\n";
        let err = convert_reader(input.as_bytes(), TimeZoneMode::Utc).unwrap_err();
        assert!(matches!(err, ConvertError::Timestamp { line: 2, .. }));
    }
}

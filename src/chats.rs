//! Per-contact grouping and the flat chats CSV export.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::info;

use crate::constants::{CHATS_DATE_FORMAT, CHATS_RECEIVED, CHATS_SENT};
use crate::error::{ConvertError, Result};
use crate::output::OutputFile;
use crate::types::{Direction, Message, TimeZoneMode};

/// Messages keyed by contact address, each list in input order.
pub type Chats<'a> = BTreeMap<&'a str, Vec<&'a Message>>;

pub fn group_by_contact(messages: &[Message]) -> Chats<'_> {
    let mut chats: Chats<'_> = BTreeMap::new();
    for message in messages {
        chats
            .entry(message.other_party.as_str())
            .or_default()
            .push(message);
    }
    chats
}

const HEADER: [&str; 4] = ["Contact", "Body", "Date", "Sent/Received"];

#[derive(Debug, Serialize)]
struct ChatRow<'a> {
    contact: &'a str,
    body: &'a str,
    date: String,
    direction: &'static str,
}

/// Formats epoch milliseconds as a wall-clock date-time in `mode`.
pub fn format_wall_clock(timestamp_millis: i64, mode: TimeZoneMode) -> Option<String> {
    let utc = Utc.timestamp_millis_opt(timestamp_millis).single()?;
    let formatted = match mode {
        TimeZoneMode::Utc => utc.format(CHATS_DATE_FORMAT).to_string(),
        TimeZoneMode::Local => utc.with_timezone(&Local).format(CHATS_DATE_FORMAT).to_string(),
    };
    Some(formatted)
}

pub fn write_chats<W: Write>(inner: W, chats: &Chats<'_>, mode: TimeZoneMode) -> Result<W> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
    writer.write_record(HEADER)?;

    for (contact, messages) in chats {
        for message in messages {
            writer.serialize(ChatRow {
                contact,
                body: &message.body,
                date: format_wall_clock(message.timestamp_millis, mode).unwrap_or_default(),
                direction: match message.direction {
                    Direction::Sent => CHATS_SENT,
                    Direction::Received => CHATS_RECEIVED,
                },
            })?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| ConvertError::Io(e.into_error()))
}

/// Writes the chats export to `path`, replacing whatever was there.
pub fn write_chats_file(path: &Path, chats: &Chats<'_>, mode: TimeZoneMode) -> Result<PathBuf> {
    let mut output = OutputFile::create(path)?;
    write_chats(&mut output, chats, mode)?;
    let written = output.finish()?;
    info!(path = %written.display(), contacts = chats.len(), "Wrote chats export");
    Ok(written)
}

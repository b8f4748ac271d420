//! SMS Backup & Restore XML output.
//!
//! Every message becomes an empty `sms` element whose attributes come from
//! [`sms_attributes`]; all of them hang off a single `smses` root.

use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use tracing::{debug, info};

use crate::constants::{FIXED_ATTRIBUTES, MESSAGE_ELEMENT, ROOT_ELEMENT};
use crate::error::Result;
use crate::output::OutputFile;
use crate::types::Message;

/// Attribute name/value pairs for one message, in output order.
pub fn sms_attributes(message: &Message) -> Vec<(&'static str, Cow<'_, str>)> {
    let mut attributes = vec![
        ("address", Cow::Borrowed(message.other_party.as_str())),
        ("date", Cow::Owned(message.timestamp_millis.to_string())),
        ("type", Cow::Borrowed(message.direction.sbr_type())),
        ("body", Cow::Borrowed(message.body.as_str())),
        ("read", Cow::Borrowed(if message.is_read { "1" } else { "0" })),
    ];
    attributes.extend(
        FIXED_ATTRIBUTES
            .iter()
            .map(|(name, value)| (*name, Cow::Borrowed(*value))),
    );
    attributes
}

/// Escapes an attribute value, including whitespace that XML parsers would
/// otherwise normalize to plain spaces.
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if escaped.contains(&['\n', '\r', '\t'][..]) {
        Cow::Owned(
            escaped
                .replace('\n', "&#10;")
                .replace('\r', "&#13;")
                .replace('\t', "&#9;"),
        )
    } else {
        escaped
    }
}

fn sms_element(message: &Message) -> BytesStart<'static> {
    let mut element = BytesStart::new(MESSAGE_ELEMENT);
    for (name, value) in sms_attributes(message) {
        let escaped = escape_attribute(&value);
        element.push_attribute(Attribute::from((name.as_bytes(), escaped.as_bytes())));
    }
    element
}

/// Writes the full document, tab-indented, and hands back the inner writer.
pub fn write_document<W: Write>(inner: W, messages: &[Message]) -> Result<W> {
    let mut writer = Writer::new_with_indent(inner, b'\t', 1);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    if messages.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(ROOT_ELEMENT)))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))?;
        for message in messages {
            writer.write_event(Event::Empty(sms_element(message)))?;
        }
        writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
    }

    let mut inner = writer.into_inner();
    inner.write_all(b"\n")?;
    Ok(inner)
}

/// Renders the document to a string; mostly useful for inspection and tests.
pub fn render_document(messages: &[Message]) -> Result<String> {
    let bytes = write_document(Vec::new(), messages)?;
    Ok(String::from_utf8(bytes)?)
}

/// Writes the document to `path`, replacing whatever was there.
pub fn write_sbr_file(path: &Path, messages: &[Message]) -> Result<PathBuf> {
    debug!("Writing {} messages to {}", messages.len(), path.display());
    let mut output = OutputFile::create(path)?;
    write_document(&mut output, messages)?;
    let written = output.finish()?;
    info!(path = %written.display(), messages = messages.len(), "Wrote SMS Backup & Restore file");
    Ok(written)
}

//! Human-readable summaries of incoming payloads.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;

const PREFIX: &str = "Received batch request: ";

/// Single-line JSON with a space after `:` and `,`.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Render a payload on one line, e.g. `{"order_id": 42}`.
pub fn render_payload(payload: &Value) -> String {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    match payload.serialize(&mut serializer) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => payload.to_string(),
    }
}

/// The message appended to the sink for one request.
pub fn batch_message(payload: &Value) -> String {
    format!("{}{}", PREFIX, render_payload(payload))
}

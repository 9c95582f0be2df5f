//! RFC 822 rendering of plain-text notification emails.
//!
//! The message is assembled with lettre's builder, which parses the sender and
//! recipient mailboxes, encodes non-ASCII subjects as RFC 2047 words and picks
//! the body's transfer encoding. The Gmail API takes the formatted bytes as
//! URL-safe base64 in the `raw` field.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use clinicflow_common::error::{invalid_argument, ClinicError};
use clinicflow_common::models::EmailMessage;
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::Mailbox;
use lettre::Message;

/// Builds the message, rejecting unparseable mailboxes and multi-line subjects.
pub fn build_message(message: &EmailMessage) -> Result<Message, ClinicError> {
    let from = parse_mailbox("sender", &message.from)?;
    let to = parse_mailbox("recipient", &message.to)?;
    if message.subject.contains(['\r', '\n']) {
        return Err(invalid_argument("Subject header must not contain line breaks"));
    }

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_PLAIN);
    // lettre would pick quoted-printable for mostly-ASCII text; keep non-ASCII bodies base64
    if !message.body_text.is_ascii() {
        builder = builder.header(ContentTransferEncoding::Base64);
    }

    builder
        .body(message.body_text.clone())
        .map_err(|e| invalid_argument(format!("cannot build email: {}", e)))
}

/// Renders the full message, headers and body.
pub fn render_mime(message: &EmailMessage) -> Result<Vec<u8>, ClinicError> {
    Ok(build_message(message)?.formatted())
}

/// URL-safe base64 of [`render_mime`], ready for the `raw` field of a send request.
pub fn encode_raw(message: &EmailMessage) -> Result<String, ClinicError> {
    Ok(URL_SAFE.encode(render_mime(message)?))
}

fn parse_mailbox(role: &str, value: &str) -> Result<Mailbox, ClinicError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid_argument(format!("{} address must not be empty", role)));
    }
    value
        .parse::<Mailbox>()
        .map_err(|e| invalid_argument(format!("invalid {} address {:?}: {}", role, value, e)))
}

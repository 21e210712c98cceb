//! Logged conversation messages.
//!
//! # Design
//! Both messages and their contents are polymorphic on the wire: a `type`
//! field selects the variant. Each variant owns its decoder and the decoders
//! are registered in a table keyed by discriminator; see
//! [`crate::codec::dispatch`].
//!
//! Unlike tasks and profiles, message timestamps travel as ISO-8601 strings.
//! They are written as RFC 3339 in UTC. On input any ISO-8601 date or date
//! and time is accepted, and one without an offset is read as UTC.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::codec::{dispatch, opt, Decoder, Fields, Repr};
use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextualContent {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContent {
    pub value: String,
    pub button_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationContent {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentContent {
    pub value: String,
    pub alternative_text: Option<String>,
}

/// Payload of a [`Message`].
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(TextualContent),
    Action(ActionContent),
    Location(LocationContent),
    Attachment(AttachmentContent),
}

impl Content {
    pub fn text(value: impl Into<String>) -> Self {
        Content::Text(TextualContent { value: value.into() })
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            Content::Text(_) => "text",
            Content::Action(_) => "action",
            Content::Location(_) => "location",
            Content::Attachment(_) => "attachment",
        }
    }
}

fn decode_text(fields: &Fields<'_>) -> Result<Content, DecodeError> {
    Ok(Content::Text(TextualContent {
        value: fields.str("value")?,
    }))
}

fn decode_action(fields: &Fields<'_>) -> Result<Content, DecodeError> {
    Ok(Content::Action(ActionContent {
        value: fields.str("value")?,
        button_text: fields.opt_str("buttonText")?,
    }))
}

fn decode_location(fields: &Fields<'_>) -> Result<Content, DecodeError> {
    Ok(Content::Location(LocationContent {
        latitude: fields.f64("latitude")?,
        longitude: fields.f64("longitude")?,
    }))
}

fn decode_attachment(fields: &Fields<'_>) -> Result<Content, DecodeError> {
    Ok(Content::Attachment(AttachmentContent {
        value: fields.str("value")?,
        alternative_text: fields.opt_str("alternativeText")?,
    }))
}

const CONTENT_DECODERS: &[(&str, Decoder<Content>)] = &[
    ("text", decode_text),
    ("action", decode_action),
    ("location", decode_location),
    ("attachment", decode_attachment),
];

impl Repr for Content {
    fn to_repr(&self) -> Value {
        let tag = self.type_tag();
        match self {
            Content::Text(c) => json!({"type": tag, "value": c.value}),
            Content::Action(c) => json!({
                "type": tag,
                "value": c.value,
                "buttonText": opt(&c.button_text),
            }),
            Content::Location(c) => json!({
                "type": tag,
                "latitude": c.latitude,
                "longitude": c.longitude,
            }),
            Content::Attachment(c) => json!({
                "type": tag,
                "value": c.value,
                "alternativeText": opt(&c.alternative_text),
            }),
        }
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        dispatch("content", CONTENT_DECODERS, raw)
    }
}

/// Direction of a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Request,
    Response,
    Notification,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Request => "REQUEST",
            MessageType::Response => "RESPONSE",
            MessageType::Notification => "NOTIFICATION",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message exchanged between the platform and a user on some channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub message_type: MessageType,
    pub message_id: String,
    pub channel: String,
    pub user_id: String,
    pub project: String,
    pub content: Content,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a message; a missing timestamp means "now".
    pub fn new(
        message_type: MessageType,
        message_id: impl Into<String>,
        channel: impl Into<String>,
        user_id: impl Into<String>,
        project: impl Into<String>,
        content: Content,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            message_type,
            message_id: message_id.into(),
            channel: channel.into(),
            user_id: user_id.into(),
            project: project.into(),
            content,
            timestamp: timestamp.unwrap_or_else(Utc::now),
        }
    }

    fn decode_as(message_type: MessageType, fields: &Fields<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            message_type,
            message_id: fields.str("messageId")?,
            channel: fields.str("channel")?,
            user_id: fields.str("userId")?,
            project: fields.str("project")?,
            content: fields.entity("content")?,
            timestamp: parse_timestamp(fields.required("timestamp")?)?,
        })
    }
}

fn decode_request(fields: &Fields<'_>) -> Result<Message, DecodeError> {
    Message::decode_as(MessageType::Request, fields)
}

fn decode_response(fields: &Fields<'_>) -> Result<Message, DecodeError> {
    Message::decode_as(MessageType::Response, fields)
}

fn decode_notification(fields: &Fields<'_>) -> Result<Message, DecodeError> {
    Message::decode_as(MessageType::Notification, fields)
}

const MESSAGE_DECODERS: &[(&str, Decoder<Message>)] = &[
    ("REQUEST", decode_request),
    ("RESPONSE", decode_response),
    ("NOTIFICATION", decode_notification),
];

/// Offset-free forms, read as UTC. `%Y` also takes the signed years that
/// RFC 3339 output uses past 9999.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn parse_timestamp(raw: &Value) -> Result<DateTime<Utc>, DecodeError> {
    let text = raw.as_str().ok_or(DecodeError::InvalidType {
        entity: "message",
        field: "timestamp",
        expected: "an ISO-8601 string",
    })?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.with_timezone(&Utc));
    }
    // A trailing `Z` is UTC already.
    let naive = text.strip_suffix('Z').unwrap_or(text);
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(naive, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DecodeError::InvalidValue {
            kind: "timestamp",
            value: text.to_string(),
        })
}

impl Repr for Message {
    fn to_repr(&self) -> Value {
        json!({
            "type": self.message_type.as_str(),
            "messageId": self.message_id,
            "channel": self.channel,
            "userId": self.user_id,
            "project": self.project,
            "content": self.content.to_repr(),
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        })
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        dispatch("message", MESSAGE_DECODERS, raw)
    }
}

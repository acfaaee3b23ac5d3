//! Message metadata summary
//!
//! A serializable digest of a decoded message, suitable as object metadata
use crate::enums::{AttachMethod, RecipientType};
use crate::message::{Attachment, HeaderBlock, Message, MessageKind, Recipient};
use serde::Serialize;
#[allow(unused_imports)]
use tracing::{debug, error, info, warn};

/// Transport headers retained in the summary (lowercase)
pub const SUMMARY_HEADERS: [&str; 10] = [
    "bcc",
    "cc",
    "envelope-to",
    "from",
    "in-reply-to",
    "message-id",
    "reply-to",
    "return-path",
    "subject",
    "to",
];

#[derive(Debug, Serialize)]
/// A recipient in a [`MessageSummary`]
pub struct SummaryRecipient {
    /// `To`, `Cc` or `Bcc`
    pub kind: Option<&'static str>,
    /// Recipient name
    pub name: Option<String>,
    /// Recipient e-mail address
    pub email: Option<String>,
}

impl From<&Recipient> for SummaryRecipient {
    fn from(rcpt: &Recipient) -> Self {
        Self {
            kind: match rcpt.kind() {
                Some(RecipientType::To) => Some("To"),
                Some(RecipientType::Cc) => Some("Cc"),
                Some(RecipientType::Bcc) => Some("Bcc"),
                _ => None,
            },
            name: rcpt.name().map(|s| s.to_string()),
            email: rcpt.email().map(|s| s.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
/// An attachment in a [`MessageSummary`]
pub struct SummaryAttachment {
    /// Attachment name
    pub name: Option<String>,
    /// MIME type
    pub mime_type: Option<String>,
    /// How the attachment is stored
    pub method: Option<AttachMethod>,
    /// Size of the attachment data
    pub size: Option<usize>,
    /// Why the attachment could not be decoded
    pub broken: Option<String>,
}

impl From<&Attachment> for SummaryAttachment {
    fn from(attm: &Attachment) -> Self {
        Self {
            name: attm.name().map(|s| s.to_string()),
            mime_type: attm.mime_type().map(|s| s.to_string()),
            method: attm.method(),
            size: attm.data().map(|d| d.len()),
            broken: attm.broken().map(|s| s.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
/// Message metadata
pub struct MessageSummary {
    /// The kind of message
    pub kind: MessageKind,
    /// The message class
    pub message_class: Option<String>,
    /// Selected transport headers, lowercase names
    pub headers: Vec<(String, String)>,
    /// The sender as `name <email>`
    pub from: Option<String>,
    /// The recipients
    pub recipients: Vec<SummaryRecipient>,
    /// The attachments stored by value
    pub n_attachments: usize,
    /// All the attachments
    pub attachments: Vec<SummaryAttachment>,
    /// Paths of the attachments stored by reference
    pub attachments_by_ref: Vec<String>,
    /// Whether a plain text body is present
    pub has_text_body: bool,
    /// Whether an RTF body is present
    pub has_rtf_body: bool,
    /// Whether an HTML body is present
    pub has_html_body: bool,
    /// Whether this is an embedded message
    pub is_embedded: bool,
    /// The header block
    pub header_block: HeaderBlock,
    /// The embedded messages
    pub embedded: Vec<MessageSummary>,
    /// Notable conditions
    pub symbols: Vec<String>,
}

impl MessageSummary {
    /// Summarize `msg` and its embedded messages
    pub fn new(msg: &dyn Message) -> Self {
        let mut headers: Vec<(String, String)> = Vec::new();
        if let Some(header_iter) = msg.headers() {
            for (k, v) in &header_iter {
                let klc = k.to_lowercase();
                if SUMMARY_HEADERS.contains(&klc.as_str()) {
                    headers.push((klc, v.to_string()));
                }
            }
        }
        let from = msg.sender_email().map(|email| {
            if let Some(name) = msg.sender_name() {
                format!("{name} <{email}>")
            } else {
                format!("<{email}>")
            }
        });

        let mut symbols = Vec::new();
        let has_text_body = msg.body().is_some();
        let has_rtf_body = msg.rtf_body().is_some();
        let has_html_body = msg.html_body().is_some();
        for (present, symbol) in [
            (has_text_body, "MSG_TEXT_BODY"),
            (has_rtf_body, "MSG_RTF_BODY"),
            (has_html_body, "MSG_HTML_BODY"),
        ] {
            if present {
                symbols.push(symbol.to_string());
            }
        }

        let mut n_attachments = 0usize;
        let mut attachments_by_ref: Vec<String> = Vec::new();
        let mut embedded: Vec<MessageSummary> = Vec::new();
        for attm in msg.attachments().iter() {
            if attm.broken().is_some() && !symbols.iter().any(|s| s == "BROKEN_ATTACHMENT") {
                symbols.push("BROKEN_ATTACHMENT".to_string());
            }
            match attm.method() {
                Some(AttachMethod::ByValue) => n_attachments += 1,
                Some(
                    AttachMethod::ByReference
                    | AttachMethod::ByReferenceResolve
                    | AttachMethod::ByReferenceOnly,
                ) => {
                    if let Some(path) = attm.path() {
                        attachments_by_ref.push(path.to_string());
                    }
                }
                Some(AttachMethod::EmbeddedMessage) => {
                    if let Some(m) = attm.embedded_message() {
                        embedded.push(Self::new(m));
                    }
                }
                Some(AttachMethod::None | AttachMethod::Ole | AttachMethod::ByWebReference) => {}
                None => debug!("Unsupported / invalid AttachMethod in attachment {}", attm.id),
            }
        }

        Self {
            kind: msg.kind(),
            message_class: msg.message_class().map(|s| s.to_string()),
            headers,
            from,
            recipients: msg.recipients().iter().map(|r| r.into()).collect(),
            n_attachments,
            attachments: msg.attachments().iter().map(|a| a.into()).collect(),
            attachments_by_ref,
            has_text_body,
            has_rtf_body,
            has_html_body,
            is_embedded: msg.is_embedded(),
            header_block: msg.header_block().clone(),
            embedded,
            symbols,
        }
    }

    /// The summary as a JSON object
    pub fn to_json(&self) -> Result<serde_json::Map<String, serde_json::Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(v) => Ok(v),
            other => Err(serde::ser::Error::custom(format!(
                "Summary serialized to a non object: {other}"
            ))),
        }
    }
}

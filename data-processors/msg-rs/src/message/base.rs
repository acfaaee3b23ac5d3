//! The parts shared by every kind of message
use super::MessageVariant;
use crate::config::{AttachErrorBehavior, DecodeConfig};
use crate::container::StreamStore;
use crate::diag::{Diagnostic, DiagnosticSink};
use crate::entryid::EntryId;
use crate::enums::{AttachMethod, RecipientType};
use crate::error::MsgError;
use crate::named::NamedPropertyMap;
use crate::store::{ObjectCounts, PropertyStore, StorageKind};
use crate::tags::*;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::{self, well_known::Rfc3339};
#[allow(unused_imports)]
use tracing::{debug, error, info, warn};

/// Storage name of the message embedded in an attachment
pub const EMBEDDED_MESSAGE_STORAGE: &str = "__substg1.0_3701000D/";

#[derive(Debug)]
/// A message recipient
pub struct Recipient {
    /// Recipient id
    pub id: u32,
    /// Recipient properties
    pub properties: PropertyStore,
}

impl Recipient {
    /// Return the best guess for the recipient name if available
    pub fn name(&self) -> Option<&str> {
        [
            PID_TAG_RECIPIENT_DISPLAY_NAME,
            PID_TAG_DISPLAY_NAME,
            PID_TAG_TRANSMITTABLE_DISPLAY_NAME,
        ]
        .into_iter()
        .find_map(|id| self.properties.string(id))
    }

    /// Return the best guess for the recipient e-mail address if available
    pub fn email(&self) -> Option<&str> {
        [PID_TAG_SMTP_ADDRESS, PID_TAG_EMAIL_ADDRESS]
            .into_iter()
            .find_map(|id| self.properties.string(id))
    }

    /// Return the address type (e.g. `SMTP` or `EX`) if available
    pub fn address_type(&self) -> Option<&str> {
        self.properties.string(PID_TAG_ADDRESS_TYPE)
    }

    /// Return the type of recipient if available
    pub fn kind(&self) -> Option<RecipientType> {
        RecipientType::from_int(self.properties.int(PID_TAG_RECIPIENT_TYPE)?)
    }

    /// Return the parsed entry ID if available
    pub fn entry_id(&self) -> Option<EntryId> {
        EntryId::parse(self.properties.binary(PID_TAG_ENTRY_ID)?).ok()
    }

    /// Return the recipient as `name <email>`
    pub fn formatted(&self) -> Option<String> {
        format_address(self.name(), self.email())
    }
}

#[derive(Debug)]
/// Message *attachment*
///
/// Note: these are not necessarily MIME parts or actual attachments
pub struct Attachment {
    /// Attachment id
    pub id: u32,
    /// Attachment properties
    pub properties: PropertyStore,
    embedded: Option<Box<MessageVariant>>,
    broken: Option<String>,
}

impl Attachment {
    /// Return the best guess for the attachment name if available
    pub fn name(&self) -> Option<&str> {
        [
            PID_TAG_ATTACH_LONG_FILENAME,
            PID_TAG_DISPLAY_NAME,
            PID_TAG_ATTACH_FILENAME,
        ]
        .into_iter()
        .find_map(|id| self.properties.string(id))
    }

    /// Return the MIME type of the attachment if available
    pub fn mime_type(&self) -> Option<&str> {
        self.properties.string(PID_TAG_ATTACH_MIME_TAG)
    }

    /// Return the content id of the attachment if available
    pub fn content_id(&self) -> Option<&str> {
        self.properties.string(PID_TAG_ATTACH_CONTENT_ID)
    }

    /// Return whether the attachment is hidden
    pub fn hidden(&self) -> bool {
        self.properties
            .bool(PID_TAG_ATTACHMENT_HIDDEN)
            .unwrap_or(false)
    }

    /// Return the attachment creation time if available
    pub fn ctime(&self) -> Option<&OffsetDateTime> {
        self.properties.time(PID_TAG_CREATION_TIME)
    }

    /// Return the attachment modification time if available
    pub fn mtime(&self) -> Option<&OffsetDateTime> {
        self.properties.time(PID_TAG_LAST_MODIFICATION_TIME)
    }

    /// Return the declared attachment size if available
    pub fn size(&self) -> Option<i64> {
        self.properties.int(PID_TAG_ATTACH_SIZE)
    }

    /// Return how the attachment is stored if available
    pub fn method(&self) -> Option<AttachMethod> {
        AttachMethod::from_int(self.properties.int(PID_TAG_ATTACH_METHOD)?)
    }

    /// Return the path of attachments by reference if available
    pub fn path(&self) -> Option<&str> {
        [PID_TAG_ATTACH_LONG_PATHNAME, PID_TAG_ATTACH_PATHNAME]
            .into_iter()
            .find_map(|id| self.properties.string(id))
    }

    /// Return the attachment content if available
    pub fn data(&self) -> Option<&[u8]> {
        self.properties
            .get(PropertyTag::new(PID_TAG_ATTACH_DATA, 0x0102))?
            .as_bytes()
    }

    /// Return the embedded message if the attachment is one
    pub fn embedded_message(&self) -> Option<&MessageVariant> {
        self.embedded.as_deref()
    }

    /// Return why the attachment could not be decoded, if it could not
    pub fn broken(&self) -> Option<&str> {
        self.broken.as_deref()
    }
}

pub(crate) struct LoadContext<'a, S: StreamStore + ?Sized> {
    pub(crate) container: &'a S,
    pub(crate) named: Arc<NamedPropertyMap>,
    pub(crate) config: &'a DecodeConfig,
    pub(crate) sink: &'a dyn DiagnosticSink,
}

impl<S: StreamStore + ?Sized> LoadContext<'_, S> {
    fn load_store(
        &self,
        storage: &str,
        kind: StorageKind,
    ) -> Result<(PropertyStore, ObjectCounts), MsgError> {
        PropertyStore::load(
            self.container,
            storage,
            kind,
            self.named.clone(),
            self.config,
            self.sink,
        )
    }
}

#[derive(Debug)]
/// The property store, recipients and attachments of a message
pub struct BaseMessage {
    /// Message properties
    pub properties: PropertyStore,
    /// Property stream header counters
    pub counts: ObjectCounts,
    recipients: Vec<Recipient>,
    attachments: Vec<Attachment>,
    datetime_format: String,
    depth: u32,
}

impl BaseMessage {
    pub(crate) fn load<S: StreamStore + ?Sized>(
        ctx: &LoadContext<'_, S>,
        storage: &str,
        depth: u32,
    ) -> Result<Self, MsgError> {
        let kind = if depth == 0 {
            StorageKind::Message
        } else {
            StorageKind::EmbeddedMessage
        };
        let (properties, counts) = ctx.load_store(storage, kind)?;

        let mut recipients: Vec<Recipient> =
            Vec::with_capacity(counts.recipient_count.min(1024) as usize);
        for id in 0..counts.recipient_count {
            let path = format!("{storage}__recip_version1.0_#{id:08X}/");
            match ctx.load_store(&path, StorageKind::Recipient) {
                Ok((properties, _)) => recipients.push(Recipient { id, properties }),
                Err(e) if e.is_not_found() => {
                    // Storages are numbered contiguously, the first gap ends the list
                    ctx.sink.report(Diagnostic::MissingStorage { path });
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        let mut attachments: Vec<Attachment> =
            Vec::with_capacity(counts.attachment_count.min(1024) as usize);
        for id in 0..counts.attachment_count {
            let path = format!("{storage}__attach_version1.0_#{id:08X}/");
            let properties = match ctx.load_store(&path, StorageKind::Attachment) {
                Ok((properties, _)) => properties,
                Err(e) if e.is_not_found() => {
                    ctx.sink.report(Diagnostic::MissingStorage { path });
                    break;
                }
                Err(e) => return Err(e),
            };
            let mut attachment = Attachment {
                id,
                properties,
                embedded: None,
                broken: None,
            };
            if attachment.method() == Some(AttachMethod::EmbeddedMessage) {
                let embedded_path = format!("{path}{EMBEDDED_MESSAGE_STORAGE}");
                let res = if depth >= ctx.config.max_embedding_depth {
                    Err(MsgError::EmbeddingTooDeep(ctx.config.max_embedding_depth))
                } else {
                    MessageVariant::load(ctx, &embedded_path, depth + 1)
                };
                match res {
                    Ok(msg) => attachment.embedded = Some(Box::new(msg)),
                    Err(e) if ctx.config.attachment_errors == AttachErrorBehavior::Throw => {
                        return Err(e);
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        ctx.sink.report(Diagnostic::BrokenAttachment {
                            path: path.clone(),
                            reason: reason.clone(),
                        });
                        attachment.broken = Some(reason);
                    }
                }
            }
            attachments.push(attachment);
        }

        debug!(
            "Message {storage:?}: {} recipients, {} attachments",
            recipients.len(),
            attachments.len()
        );
        Ok(Self {
            properties,
            counts,
            recipients,
            attachments,
            datetime_format: ctx.config.datetime_format.clone(),
            depth,
        })
    }

    /// The message recipients
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// The message *attachments*
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Nesting level: 0 for the top level message
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Format a date for header blocks
    pub fn format_date(&self, t: &OffsetDateTime) -> String {
        let formatted = format_description::parse(&self.datetime_format)
            .map_err(|e| e.to_string())
            .and_then(|desc| t.format(&desc).map_err(|e| e.to_string()));
        match formatted {
            Ok(s) => s,
            Err(e) => {
                warn!("Invalid datetime format {:?}: {e}", self.datetime_format);
                t.format(&Rfc3339).unwrap_or_else(|_| t.to_string())
            }
        }
    }
}

pub(crate) fn format_address(name: Option<&str>, email: Option<&str>) -> Option<String> {
    match (name, email) {
        (Some(name), Some(email)) => Some(format!("{name} <{email}>")),
        (None, Some(email)) => Some(format!("<{email}>")),
        (Some(name), None) => Some(name.to_string()),
        (None, None) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A titled group of header fields
pub struct HeaderSection {
    /// Section title, empty for untitled blocks
    pub title: &'static str,
    /// Field names and values
    pub fields: Vec<(&'static str, Option<String>)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// The summary fields shown above the body of a message
pub struct HeaderBlock(pub Vec<HeaderSection>);

impl HeaderBlock {
    pub(crate) fn section(
        mut self,
        title: &'static str,
        fields: Vec<(&'static str, Option<String>)>,
    ) -> Self {
        self.0.push(HeaderSection { title, fields });
        self
    }

    /// Return the value of `field` in section `title`
    pub fn get(&self, title: &str, field: &str) -> Option<&str> {
        self.0
            .iter()
            .filter(|s| s.title == title)
            .flat_map(|s| s.fields.iter())
            .find(|(name, _)| *name == field)?
            .1
            .as_deref()
    }
}

impl fmt::Display for HeaderBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if !section.title.is_empty() {
                writeln!(f, "{}", section.title)?;
            }
            for (name, value) in section.fields.iter() {
                if let Some(value) = value {
                    writeln!(f, "{name}: {value}")?;
                }
            }
        }
        Ok(())
    }
}

/// SMTP message headers
pub struct Headers<'a>(pub(crate) &'a str);

impl<'a> IntoIterator for &Headers<'a> {
    type Item = (&'a str, Cow<'a, str>);
    type IntoIter = HeaderIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        HeaderIter {
            headers: self.0,
            at: 0,
        }
    }
}

/// SMTP message headers iterator
pub struct HeaderIter<'a> {
    headers: &'a str,
    at: usize,
}

impl<'a> Iterator for HeaderIter<'a> {
    type Item = (&'a str, Cow<'a, str>);

    fn next(&mut self) -> Option<<Self as Iterator>::Item> {
        let buf = &self.headers[self.at..];
        let mut lines = buf.split_inclusive('\n').peekable();
        let (k, v) = loop {
            let line = lines.next()?;
            self.at += line.len();
            if let Some(colon) = line.find(':') {
                break (&line[0..colon], &line[(colon + 1)..]);
            }
        };
        let mut v = Cow::from(v.trim());
        while let Some(line) = lines.next_if(|l| l.starts_with(['\t', ' '])) {
            self.at += line.len();
            let folded = v.to_mut();
            folded.push(' ');
            folded.push_str(line.trim());
        }
        Some((k.trim(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn headers_iter() {
        let hdrs = Headers(
            "one:1\n\
             two:    2:two\n\
             bogus line\n\
             novalue  :\n\
             folded:     one     \r\n\
             \t \t     two  \n\
             last: final",
        );
        let mut it: HeaderIter = hdrs.into_iter();
        assert_eq!(it.next().unwrap(), ("one", "1".into()));
        assert_eq!(it.next().unwrap(), ("two", "2:two".into()));
        assert_eq!(it.next().unwrap(), ("novalue", "".into()));
        assert_eq!(it.next().unwrap(), ("folded", "one two".into()));
        assert_eq!(it.next().unwrap(), ("last", "final".into()));
        assert!(it.next().is_none());
    }

    #[test]
    fn header_block_display() {
        let block = HeaderBlock::default()
            .section(
                "-main info-",
                vec![("Subject", Some("Hi".to_string())), ("Location", None)],
            )
            .section("-importance-", vec![("Importance", Some("High".to_string()))]);
        assert_eq!(block.get("-main info-", "Subject"), Some("Hi"));
        assert_eq!(block.get("-main info-", "Location"), None);
        assert_eq!(block.get("-importance-", "Subject"), None);
        assert_eq!(
            block.to_string(),
            "-main info-\nSubject: Hi\n\n-importance-\nImportance: High\n"
        );
    }

    #[test]
    fn addresses() {
        assert_eq!(
            format_address(Some("Bob"), Some("bob@example.com")).as_deref(),
            Some("Bob <bob@example.com>")
        );
        assert_eq!(
            format_address(None, Some("bob@example.com")).as_deref(),
            Some("<bob@example.com>")
        );
        assert_eq!(format_address(None, None), None);
    }

    #[test]
    fn date_format() {
        let base = BaseMessage {
            properties: PropertyStore::build(
                "",
                std::iter::empty::<&[u8]>(),
                Vec::new(),
                Arc::new(NamedPropertyMap::new()),
                &DecodeConfig::default(),
                &crate::diag::CollectingSink::new(),
            ),
            counts: ObjectCounts::default(),
            recipients: Vec::new(),
            attachments: Vec::new(),
            datetime_format: DecodeConfig::default().datetime_format,
            depth: 0,
        };
        assert_eq!(
            base.format_date(&datetime!(2024-01-01 9:30 UTC)),
            "Mon, 01 Jan 2024 09:30 +0000"
        );
    }
}

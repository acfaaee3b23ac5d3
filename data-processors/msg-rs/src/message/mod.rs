//! Message objects
//!
//! A message is opened with [`Msg::open`], which decodes the top level
//! object, its recipients and attachments and any embedded messages.
//! Depending on its class the message is decoded into one of the kinds of
//! [`MessageVariant`]; the functionality common to all kinds is exposed by
//! the [`Message`] trait, kind specific accessors by the variants themselves
mod base;
mod calendar;
mod contact;
mod signed;
mod task;

pub use base::{
    Attachment, BaseMessage, EMBEDDED_MESSAGE_STORAGE, HeaderBlock, HeaderIter, HeaderSection,
    Headers, Recipient,
};
pub use calendar::{Appointment, Calendar, MeetingForwardNotification, MeetingRelated};
pub use contact::Contact;
pub use signed::Signed;
pub use task::Task;

use crate::config::DecodeConfig;
use crate::container::StreamStore;
use crate::diag::DiagnosticSink;
use crate::enums::{Importance, Priority, RecipientType, Sensitivity};
use crate::error::MsgError;
use crate::named::NamedPropertyMap;
use crate::store::PropertyStore;
use crate::tags::*;
use base::{LoadContext, format_address};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
#[allow(unused_imports)]
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
/// The kind of a message, derived from its class
pub enum MessageKind {
    /// Any message not covered by the other kinds
    Plain,
    /// S/MIME signed message
    Signed,
    /// Appointment
    Appointment,
    /// Meeting request, response or cancellation
    MeetingRelated,
    /// Notification that a meeting was forwarded
    MeetingForwardNotification,
    /// Task or task request
    Task,
    /// Contact
    Contact,
}

impl MessageKind {
    /// Classify a message class (case insensitive)
    pub fn from_class(class: &str) -> Self {
        let class = class.to_ascii_lowercase();
        if class.starts_with("ipm.note.smime") {
            Self::Signed
        } else if class == "ipm.schedule.meeting.notification.forward" {
            Self::MeetingForwardNotification
        } else if class.starts_with("ipm.schedule.meeting") {
            Self::MeetingRelated
        } else if class == "ipm.appointment" {
            Self::Appointment
        } else if class == "ipm.task" || class == "ipm.taskrequest" {
            Self::Task
        } else if class == "ipm.contact" {
            Self::Contact
        } else {
            Self::Plain
        }
    }
}

/// Functionality common to all kinds of messages
pub trait Message {
    /// The recipients, attachments and properties of the message
    fn base(&self) -> &BaseMessage;

    /// The kind of message
    fn kind(&self) -> MessageKind;

    /// The summary fields of the message, in display order
    fn header_block(&self) -> &HeaderBlock;

    /// The message properties
    fn properties(&self) -> &PropertyStore {
        &self.base().properties
    }

    /// The message recipients
    fn recipients(&self) -> &[Recipient] {
        self.base().recipients()
    }

    /// The message attachments
    fn attachments(&self) -> &[Attachment] {
        self.base().attachments()
    }

    /// Whether this is a message embedded in an attachment
    fn is_embedded(&self) -> bool {
        self.base().depth() > 0
    }

    /// The message class (e.g. `IPM.Note`)
    fn message_class(&self) -> Option<&str> {
        self.properties().string(PID_TAG_MESSAGE_CLASS)
    }

    /// The message subject
    fn subject(&self) -> Option<&str> {
        self.properties().string(PID_TAG_SUBJECT)
    }

    /// Return the best guess for the sender name if available
    fn sender_name(&self) -> Option<&str> {
        [PID_TAG_SENT_REPRESENTING_NAME, PID_TAG_SENDER_NAME]
            .into_iter()
            .find_map(|id| self.properties().string(id))
    }

    /// Return the best guess for the sender e-mail address if available
    fn sender_email(&self) -> Option<&str> {
        [
            PID_TAG_SENT_REPRESENTING_SMTP_ADDRESS,
            PID_TAG_SENDER_SMTP_ADDRESS,
            PID_TAG_SENT_REPRESENTING_EMAIL_ADDRESS,
            PID_TAG_SENDER_EMAIL_ADDRESS,
        ]
        .into_iter()
        .find_map(|id| self.properties().string(id))
    }

    /// The sender as `name <email>`
    fn sender(&self) -> Option<String> {
        format_address(self.sender_name(), self.sender_email())
    }

    /// The display list of primary recipients
    fn to(&self) -> Option<&str> {
        self.properties().string(PID_TAG_DISPLAY_TO)
    }

    /// The display list of carbon copy recipients
    fn cc(&self) -> Option<&str> {
        self.properties().string(PID_TAG_DISPLAY_CC)
    }

    /// The display list of blind carbon copy recipients
    fn bcc(&self) -> Option<&str> {
        self.properties().string(PID_TAG_DISPLAY_BCC)
    }

    /// The recipients of type `kind`
    fn recipients_of(&self, kind: RecipientType) -> Vec<&Recipient> {
        self.recipients()
            .iter()
            .filter(|r| r.kind() == Some(kind))
            .collect()
    }

    /// The date the message was sent, or else delivered
    fn date(&self) -> Option<&OffsetDateTime> {
        [PID_TAG_CLIENT_SUBMIT_TIME, PID_TAG_MESSAGE_DELIVERY_TIME]
            .into_iter()
            .find_map(|id| self.properties().time(id))
    }

    /// The message importance
    fn importance(&self) -> Option<Importance> {
        Importance::from_int(self.properties().int(PID_TAG_IMPORTANCE)?)
    }

    /// The message sensitivity
    fn sensitivity(&self) -> Option<Sensitivity> {
        Sensitivity::from_int(self.properties().int(PID_TAG_SENSITIVITY)?)
    }

    /// The message priority
    fn priority(&self) -> Option<Priority> {
        Priority::from_raw(self.properties().int(PID_TAG_PRIORITY)?)
    }

    /// The Internet message id
    fn message_id(&self) -> Option<&str> {
        self.properties().string(PID_TAG_INTERNET_MESSAGE_ID)
    }

    /// The transport headers
    fn headers(&self) -> Option<Headers<'_>> {
        self.properties()
            .string(PID_TAG_TRANSPORT_MESSAGE_HEADERS)
            .map(Headers)
    }

    /// The plain text body
    fn body(&self) -> Option<&str> {
        self.properties().string(PID_TAG_BODY)
    }

    /// The HTML body, as stored
    fn html_body(&self) -> Option<&[u8]> {
        let v = self.properties().get_by_id(PID_TAG_HTML)?;
        v.as_bytes().or_else(|| v.as_str().map(str::as_bytes))
    }

    /// The compressed RTF body, as stored
    fn rtf_body(&self) -> Option<&[u8]> {
        self.properties().binary(PID_TAG_RTF_COMPRESSED)
    }
}

pub(crate) fn plain_header_block(msg: &dyn Message) -> HeaderBlock {
    HeaderBlock::default().section(
        "",
        vec![
            ("From", msg.sender()),
            ("Sent", msg.date().map(|d| msg.base().format_date(d))),
            ("To", msg.to().map(String::from)),
            ("Cc", msg.cc().map(String::from)),
            ("Bcc", msg.bcc().map(String::from)),
            ("Subject", msg.subject().map(String::from)),
        ],
    )
}

#[derive(Debug)]
/// A message without kind specific functionality
pub struct Plain {
    base: BaseMessage,
    header: OnceCell<HeaderBlock>,
}

impl Plain {
    pub(crate) fn new(base: BaseMessage) -> Self {
        Self {
            base,
            header: OnceCell::new(),
        }
    }
}

impl Message for Plain {
    fn base(&self) -> &BaseMessage {
        &self.base
    }

    fn kind(&self) -> MessageKind {
        MessageKind::Plain
    }

    fn header_block(&self) -> &HeaderBlock {
        self.header.get_or_init(|| plain_header_block(self))
    }
}

#[derive(Debug)]
/// A decoded message of any kind
pub enum MessageVariant {
    /// See [`MessageKind::Plain`]
    Plain(Plain),
    /// See [`MessageKind::Signed`]
    Signed(Signed),
    /// See [`MessageKind::Appointment`]
    Appointment(Appointment),
    /// See [`MessageKind::MeetingRelated`]
    MeetingRelated(MeetingRelated),
    /// See [`MessageKind::MeetingForwardNotification`]
    MeetingForwardNotification(MeetingForwardNotification),
    /// See [`MessageKind::Task`]
    Task(Task),
    /// See [`MessageKind::Contact`]
    Contact(Contact),
}

impl MessageVariant {
    pub(crate) fn load<S: StreamStore + ?Sized>(
        ctx: &LoadContext<'_, S>,
        storage: &str,
        depth: u32,
    ) -> Result<Self, MsgError> {
        let base = BaseMessage::load(ctx, storage, depth)?;
        let kind = base
            .properties
            .string(PID_TAG_MESSAGE_CLASS)
            .map(MessageKind::from_class)
            .unwrap_or(MessageKind::Plain);
        debug!("Message {storage:?} is {kind:?}");
        Ok(match kind {
            MessageKind::Plain => Self::Plain(Plain::new(base)),
            MessageKind::Signed => Self::Signed(Signed::new(base)),
            MessageKind::Appointment => Self::Appointment(Appointment::new(base, ctx.sink)),
            MessageKind::MeetingRelated => {
                Self::MeetingRelated(MeetingRelated::new(base, ctx.sink))
            }
            MessageKind::MeetingForwardNotification => {
                Self::MeetingForwardNotification(MeetingForwardNotification::new(base, ctx.sink))
            }
            MessageKind::Task => Self::Task(Task::new(base)),
            MessageKind::Contact => Self::Contact(Contact::new(base)),
        })
    }

    /// The message as a trait object
    pub fn as_message(&self) -> &dyn Message {
        match self {
            Self::Plain(m) => m,
            Self::Signed(m) => m,
            Self::Appointment(m) => m,
            Self::MeetingRelated(m) => m,
            Self::MeetingForwardNotification(m) => m,
            Self::Task(m) => m,
            Self::Contact(m) => m,
        }
    }

    /// The calendar functionality of calendar kinds
    pub fn as_calendar(&self) -> Option<&dyn Calendar> {
        match self {
            Self::Appointment(m) => Some(m),
            Self::MeetingRelated(m) => Some(m),
            Self::MeetingForwardNotification(m) => Some(m),
            _ => None,
        }
    }
}

impl Message for MessageVariant {
    fn base(&self) -> &BaseMessage {
        self.as_message().base()
    }

    fn kind(&self) -> MessageKind {
        self.as_message().kind()
    }

    fn header_block(&self) -> &HeaderBlock {
        self.as_message().header_block()
    }
}

/// An opened message file
///
/// Owns the container it was decoded from
pub struct Msg<S: StreamStore> {
    container: S,
    message: MessageVariant,
}

impl<S: StreamStore> Msg<S> {
    /// Decode the message in `container`
    ///
    /// Recoverable problems are reported to `sink`; on error the container
    /// is dropped
    pub fn open(
        container: S,
        config: &DecodeConfig,
        sink: &dyn DiagnosticSink,
    ) -> Result<Self, MsgError> {
        let named = Arc::new(NamedPropertyMap::from_container(&container, sink)?);
        let ctx = LoadContext {
            container: &container,
            named,
            config,
            sink,
        };
        let message = MessageVariant::load(&ctx, "", 0)?;
        info!(
            "Opened {:?} message with {} recipients and {} attachments",
            message.kind(),
            message.recipients().len(),
            message.attachments().len()
        );
        Ok(Self { container, message })
    }

    /// The decoded message
    pub fn message(&self) -> &MessageVariant {
        &self.message
    }

    /// The named property map of the file
    pub fn named_map(&self) -> &Arc<NamedPropertyMap> {
        self.message.properties().named_map()
    }

    /// The underlying container
    pub fn container(&self) -> &S {
        &self.container
    }

    /// Release the container
    pub fn into_container(self) -> S {
        self.container
    }
}

impl<S: StreamStore> Message for Msg<S> {
    fn base(&self) -> &BaseMessage {
        self.message.base()
    }

    fn kind(&self) -> MessageKind {
        self.message.kind()
    }

    fn header_block(&self) -> &HeaderBlock {
        self.message.header_block()
    }
}

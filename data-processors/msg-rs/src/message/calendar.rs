//! Appointments and meeting messages
use super::{BaseMessage, HeaderBlock, Message, MessageKind};
use crate::diag::{Diagnostic, DiagnosticSink};
use crate::enums::BusyStatus;
use crate::error::PropertyError;
use crate::named::{NamedPropertyKey, PropertySet, resolve};
use crate::recurrence::{RecurrencePattern, describe};
use crate::tags::*;
use once_cell::sync::OnceCell;
use time::OffsetDateTime;
#[allow(unused_imports)]
use tracing::{debug, error, info, warn};

/// Functionality common to calendar items
pub trait Calendar: Message {
    /// The parsed recurrence pattern, if the item recurs and the pattern is
    /// valid
    fn recurrence(&self) -> Option<&RecurrencePattern>;

    /// `Daily`, `Weekly` or `Monthly` according to the recurrence pattern,
    /// or `(none)`
    fn recurrence_type(&self) -> &'static str {
        describe(self.recurrence())
    }

    /// The location
    fn location(&self) -> Option<&str> {
        self.properties()
            .named(PropertySet::Appointment, PID_LID_LOCATION)?
            .as_str()
    }

    /// The start of the (first occurrence of the) appointment
    fn start(&self) -> Option<&OffsetDateTime> {
        self.properties()
            .named(PropertySet::Appointment, PID_LID_APPOINTMENT_START_WHOLE)?
            .as_time()
    }

    /// The end of the (first occurrence of the) appointment
    fn end(&self) -> Option<&OffsetDateTime> {
        self.properties()
            .named(PropertySet::Appointment, PID_LID_APPOINTMENT_END_WHOLE)?
            .as_time()
    }

    /// Whether the item is flagged as recurring
    fn is_recurring(&self) -> bool {
        self.properties()
            .named(PropertySet::Appointment, PID_LID_RECURRING)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Textual description of the recurrence
    fn recurrence_pattern(&self) -> Option<&str> {
        self.properties()
            .named(PropertySet::Appointment, PID_LID_RECURRENCE_PATTERN)?
            .as_str()
    }

    /// Whether this is an all day event
    fn all_day(&self) -> bool {
        self.properties()
            .named(PropertySet::Appointment, PID_LID_APPOINTMENT_SUB_TYPE)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// The organizer
    fn organizer(&self) -> Option<&str> {
        self.sender_name()
    }

    /// The sequence number of the meeting
    fn appointment_sequence(&self) -> Option<i64> {
        self.properties()
            .named(PropertySet::Appointment, PID_LID_APPOINTMENT_SEQUENCE)?
            .as_int()
    }

    /// The free/busy status
    fn busy_status(&self) -> Option<BusyStatus> {
        BusyStatus::from_int(
            self.properties()
                .named(PropertySet::Appointment, PID_LID_BUSY_STATUS)?
                .as_int()?,
        )
    }
}

fn parse_recurrence(base: &BaseMessage, sink: &dyn DiagnosticSink) -> Option<RecurrencePattern> {
    let props = &base.properties;
    let key = NamedPropertyKey::numeric(PropertySet::Appointment, PID_LID_APPOINTMENT_RECUR);
    let id = resolve(props.named_map(), &key)?;
    let data = props.binary(id)?;
    match RecurrencePattern::parse(data) {
        Ok(pattern) => Some(pattern),
        Err(PropertyError::Malformed { reason, .. }) => {
            sink.report(Diagnostic::MalformedProperty {
                tag: Some(PropertyTag::new(id, 0x0102)),
                reason,
            });
            None
        }
        Err(e) => {
            sink.report(e.into());
            None
        }
    }
}

fn date_field(msg: &dyn Calendar, t: Option<&OffsetDateTime>) -> Option<String> {
    t.map(|t| msg.base().format_date(t))
}

fn calendar_header_block(msg: &dyn Calendar) -> HeaderBlock {
    HeaderBlock::default()
        .section(
            "-main info-",
            vec![
                ("Subject", msg.subject().map(String::from)),
                ("Location", msg.location().map(String::from)),
            ],
        )
        .section(
            "-date-",
            vec![
                ("Start", date_field(msg, msg.start())),
                ("End", date_field(msg, msg.end())),
            ],
        )
        .section(
            "-recurrence-",
            vec![(
                "Recurrence Pattern",
                msg.recurrence_pattern().map(String::from),
            )],
        )
        .section(
            "-attendees-",
            vec![
                ("Organizer", msg.organizer().map(String::from)),
                ("Required Attendees", msg.to().map(String::from)),
                ("Optional Attendees", msg.cc().map(String::from)),
                ("Resources", msg.bcc().map(String::from)),
            ],
        )
}

macro_rules! calendar_message {
    ($(#[$doc:meta])* $name:ident, $kind:ident, $header:path) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name {
            base: BaseMessage,
            recurrence: Option<RecurrencePattern>,
            header: OnceCell<HeaderBlock>,
        }

        impl $name {
            pub(crate) fn new(base: BaseMessage, sink: &dyn DiagnosticSink) -> Self {
                let recurrence = parse_recurrence(&base, sink);
                Self {
                    base,
                    recurrence,
                    header: OnceCell::new(),
                }
            }
        }

        impl Message for $name {
            fn base(&self) -> &BaseMessage {
                &self.base
            }

            fn kind(&self) -> MessageKind {
                MessageKind::$kind
            }

            fn header_block(&self) -> &HeaderBlock {
                self.header.get_or_init(|| $header(self))
            }
        }

        impl Calendar for $name {
            fn recurrence(&self) -> Option<&RecurrencePattern> {
                self.recurrence.as_ref()
            }
        }
    };
}

calendar_message! {
    /// An appointment
    Appointment, Appointment, calendar_header_block
}

calendar_message! {
    /// A meeting request, response or cancellation
    MeetingRelated, MeetingRelated, calendar_header_block
}

calendar_message! {
    /// Notification sent to the organizer when a meeting is forwarded
    MeetingForwardNotification, MeetingForwardNotification, forward_header_block
}

impl MeetingRelated {
    /// The meeting type (PidLidMeetingType)
    pub fn meeting_type(&self) -> Option<i64> {
        self.properties()
            .named(PropertySet::Meeting, PID_LID_MEETING_TYPE)?
            .as_int()
    }
}

impl MeetingForwardNotification {
    /// The recipients the meeting was forwarded to, as stored
    pub fn forward_notification_recipients(&self) -> Option<&[u8]> {
        self.properties()
            .named(
                PropertySet::Appointment,
                PID_LID_FORWARD_NOTIFICATION_RECIPIENTS,
            )?
            .as_bytes()
    }

    /// Whether the organizer should be prompted to send an update
    pub fn prompt_send_update(&self) -> bool {
        self.properties()
            .named(PropertySet::Common, PID_LID_PROMPT_SEND_UPDATE)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

fn forward_header_block(msg: &dyn Calendar) -> HeaderBlock {
    HeaderBlock::default()
        .section(
            "-main info-",
            vec![
                ("Subject", msg.subject().map(String::from)),
                ("Location", msg.location().map(String::from)),
            ],
        )
        .section(
            "-date-",
            vec![
                ("Start", date_field(msg, msg.start())),
                ("End", date_field(msg, msg.end())),
            ],
        )
        .section(
            "-recurrence-",
            vec![
                ("Recurrance", Some(msg.recurrence_type().to_string())),
                (
                    "Recurrence Pattern",
                    msg.recurrence_pattern().map(String::from),
                ),
            ],
        )
        .section(
            "-attendees-",
            vec![
                ("Organizer", msg.organizer().map(String::from)),
                ("Required Attendees", msg.to().map(String::from)),
                ("Optional Attendees", msg.cc().map(String::from)),
                ("Resources", msg.bcc().map(String::from)),
            ],
        )
        .section(
            "-importance-",
            vec![("Importance", msg.importance().map(|i| i.to_string()))],
        )
}

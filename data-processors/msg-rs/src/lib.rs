#![warn(missing_docs)]
//! Outlook MSG parser
//!
//! A decoder for the MAPI properties of Outlook MSG files and an object model
//! of the messages they hold
//!
//! The compound file is accessed through the [`StreamStore`] trait. The main
//! interface is [`Msg`]:
//!
//! ```
//! use msg_rs::*;
//!
//! let container = MemoryStore::new();
//! // A container without a property stream is not a message
//! assert!(Msg::open(container, &DecodeConfig::default(), &TracingSink).is_err());
//! ```
//!
//! Decoding is lenient: problems affecting single properties, recipients or
//! attachments are reported to a [`DiagnosticSink`] and decoding continues.
//! Only an unreadable top level object fails [`Msg::open`]
pub mod config;
pub mod container;
pub mod diag;
pub mod entryid;
pub mod enums;
pub mod errcode;
pub mod error;
pub mod message;
pub mod named;
pub mod ptype;
pub mod record;
pub mod recurrence;
pub mod store;
pub mod summary;
pub mod tags;

pub use config::{AttachErrorBehavior, DecodeConfig};
pub use container::{MemoryStore, StreamStore};
pub use diag::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use entryid::{EntryId, EntryIdKind};
pub use enums::*;
pub use errcode::{ErrorCode, ErrorValue};
pub use error::{ClassificationError, MsgError, PropertyError};
pub use message::{
    Appointment, Attachment, Calendar, Contact, HeaderBlock, HeaderSection, Headers,
    MeetingForwardNotification, MeetingRelated, Message, MessageKind, MessageVariant, Msg, Plain,
    Recipient, Signed, Task,
};
pub use named::{NamedIdentifier, NamedPropertyKey, NamedPropertyMap, PropertySet};
pub use ptype::PropType;
pub use record::{Currency, PropertyFlags, PropertyRecord, PropertyValue};
pub use recurrence::RecurrencePattern;
pub use store::{ObjectCounts, PropertyStore, StorageKind};
pub use summary::MessageSummary;
pub use tags::PropertyTag;

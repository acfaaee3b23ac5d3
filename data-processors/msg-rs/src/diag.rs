//! Decoding diagnostics
//!
//! Anything that goes wrong below the object level is recovered locally and
//! reported to a [`DiagnosticSink`] passed in by the caller. The default
//! [`TracingSink`] logs through `tracing`; [`CollectingSink`] keeps the
//! events for later inspection
use crate::error::PropertyError;
use crate::tags::PropertyTag;
use std::fmt;
use std::sync::Mutex;
#[allow(unused_imports)]
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq)]
/// A recoverable decoding event
pub enum Diagnostic {
    /// The type code is not in the dispatch table; decoded as variable length
    UnknownTypeCode {
        /// Tag of the property
        tag: PropertyTag,
    },
    /// The property bytes do not fit their declared type; property skipped
    MalformedProperty {
        /// Tag of the property, when it could be read
        tag: Option<PropertyTag>,
        /// What is wrong
        reason: String,
    },
    /// An error code value outside the known table; raw value retained
    UnmappedErrorCode {
        /// Tag of the property
        tag: PropertyTag,
        /// The raw value
        value: u32,
    },
    /// A date out of the representable range; value left undecoded
    TimestampOverflow {
        /// Tag of the property
        tag: PropertyTag,
        /// The raw value
        raw: u64,
    },
    /// A null property carrying a non zero payload
    NonZeroNull {
        /// Tag of the property
        tag: PropertyTag,
    },
    /// A variable length property without its content stream
    MissingContentStream {
        /// Tag of the property
        tag: PropertyTag,
    },
    /// A named property ID with no entry in the named property map
    UnmappedNamedProperty {
        /// Tag of the property
        tag: PropertyTag,
    },
    /// A named property map entry which could not be read
    BadNamedPropertyEntry {
        /// Index of the entry in the entry stream
        index: usize,
        /// What is wrong
        reason: String,
    },
    /// A recipient or attachment storage announced by its parent is missing
    MissingStorage {
        /// Path of the storage
        path: String,
    },
    /// An attachment that could not be decoded and was kept as broken
    BrokenAttachment {
        /// Path of the attachment storage
        path: String,
        /// Why the attachment is broken
        reason: String,
    },
}

impl From<PropertyError> for Diagnostic {
    fn from(e: PropertyError) -> Self {
        match e {
            PropertyError::Malformed { tag, reason } => Self::MalformedProperty { tag, reason },
            PropertyError::TimestampOverflow { tag, raw } => Self::TimestampOverflow { tag, raw },
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTypeCode { tag } => write!(
                f,
                "Unknown property type {:#06x} (property {tag}), treated as variable length",
                tag.ptype()
            ),
            Self::MalformedProperty { tag: Some(tag), reason } => {
                write!(f, "Malformed property {tag}: {reason}")
            }
            Self::MalformedProperty { tag: None, reason } => {
                write!(f, "Malformed property: {reason}")
            }
            Self::UnmappedErrorCode { tag, value } => {
                write!(f, "Unmapped error code {value:#010x} in property {tag}")
            }
            Self::TimestampOverflow { tag, raw } => {
                write!(f, "Timestamp value {raw:#x} of property {tag} is out of range")
            }
            Self::NonZeroNull { tag } => {
                write!(f, "Property {tag} is of type Null but its value is not zero")
            }
            Self::MissingContentStream { tag } => {
                write!(f, "Content stream for property {tag} is missing")
            }
            Self::UnmappedNamedProperty { tag } => {
                write!(f, "Named property {tag} is not in the property map")
            }
            Self::BadNamedPropertyEntry { index, reason } => {
                write!(f, "Named property map entry {index} is invalid: {reason}")
            }
            Self::MissingStorage { path } => write!(f, "Storage {path:?} is missing"),
            Self::BrokenAttachment { path, reason } => {
                write!(f, "Attachment {path:?} is broken: {reason}")
            }
        }
    }
}

/// Receiver of decoding diagnostics
pub trait DiagnosticSink {
    /// Handle one diagnostic
    fn report(&self, diag: Diagnostic);
}

#[derive(Debug, Default, Clone, Copy)]
/// A [`DiagnosticSink`] which logs through `tracing`
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diag: Diagnostic) {
        match diag {
            Diagnostic::MissingContentStream { .. } | Diagnostic::NonZeroNull { .. } => {
                debug!("{diag}")
            }
            _ => warn!("{diag}"),
        }
    }
}

#[derive(Debug, Default)]
/// A [`DiagnosticSink`] which stores every diagnostic
pub struct CollectingSink(Mutex<Vec<Diagnostic>>);

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of the collected diagnostics, in reporting order
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.0.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Number of collected diagnostics matching `pred`
    pub fn count<F: Fn(&Diagnostic) -> bool>(&self, pred: F) -> usize {
        self.0
            .lock()
            .map(|v| v.iter().filter(|d| pred(d)).count())
            .unwrap_or(0)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diag: Diagnostic) {
        debug!("Collected: {diag}");
        if let Ok(mut v) = self.0.lock() {
            v.push(diag);
        }
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &T {
    fn report(&self, diag: Diagnostic) {
        (**self).report(diag)
    }
}

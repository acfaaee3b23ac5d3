//! Error types
use crate::tags::PropertyTag;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
/// Errors which prevent a MAPI object from being constructed
pub enum MsgError {
    /// The container could not provide a stream or storage listing
    ///
    /// This indicates the source cannot be navigated at the container level
    #[error("container access failure on {path:?}: {source}")]
    ContainerAccess {
        /// Path of the stream or storage being accessed
        path: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The fixed header of a property stream is truncated
    #[error("property stream {path:?} is shorter than its {expected} byte header")]
    TruncatedHeader {
        /// Path of the property stream
        path: String,
        /// Required header length
        expected: usize,
    },

    /// Embedded messages are nested deeper than allowed
    #[error("embedded messages nested deeper than {0} levels")]
    EmbeddingTooDeep(u32),

    /// Wrapper for [`figment::Error`](https://docs.rs/figment/latest/figment/struct.Error.html)
    #[error("config deserialization: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl MsgError {
    pub(crate) fn container(path: &str, source: io::Error) -> Self {
        Self::ContainerAccess {
            path: path.to_string(),
            source,
        }
    }

    /// Whether the error is due to a stream or storage being absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ContainerAccess { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Failure to classify an entry ID
pub enum ClassificationError {
    /// Fewer than 16 bytes available
    #[error("entry id is {0} bytes long, at least 16 are required")]
    TooShort(usize),
    /// The leading 16 bytes match no known structure
    #[error("unknown entry id structure {0}")]
    UnknownSignature(String),
    /// The hex string is not a valid 16 byte signature
    #[error("invalid entry id signature {0:?}")]
    InvalidHex(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
/// Failure to decode a single property
///
/// These never escape store construction: each one is reported as a
/// [`Diagnostic`](crate::diag::Diagnostic) and the property is skipped or
/// left undecoded
pub enum PropertyError {
    /// The bytes do not fit the declared type
    #[error("malformed property{}: {reason}", fmt_tag(.tag))]
    Malformed {
        /// Tag of the property, when it could be read
        tag: Option<PropertyTag>,
        /// What is wrong
        reason: String,
    },
    /// A date conversion went out of range
    #[error("timestamp overflow in property {tag}: raw value {raw:#x}")]
    TimestampOverflow {
        /// Tag of the property
        tag: PropertyTag,
        /// The offending raw value
        raw: u64,
    },
}

impl PropertyError {
    pub(crate) fn malformed<S: Into<String>>(tag: Option<PropertyTag>, reason: S) -> Self {
        Self::Malformed {
            tag,
            reason: reason.into(),
        }
    }
}

fn fmt_tag(tag: &Option<PropertyTag>) -> String {
    tag.map(|t| format!(" {t}")).unwrap_or_default()
}

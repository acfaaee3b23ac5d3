//! Property description records
//!
//! Each entry of a property stream is a 16 byte description: the type code,
//! the property ID, the flags and 8 bytes which either hold the value itself
//! (fixed length types) or the size of the content stream (variable length
//! types). See [MS-OXMSG] 2.4.2
use crate::diag::{Diagnostic, DiagnosticSink};
use crate::errcode::ErrorValue;
use crate::error::PropertyError;
use crate::ptype::{Dispatch, FixedRule, LengthRule, dispatch};
use crate::tags::PropertyTag;
use bitflags::bitflags;
use byteorder::{ByteOrder, LE};
use ctxutils::win32::{
    FILETIME_UNIX_EPOCH, GUID, filetime_to_datetime, filetime_to_datetime_lenient,
    oletime_to_datetime,
};
use serde::{Serialize, Serializer};
use std::fmt;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Size of a property description
pub const RECORD_SIZE: usize = 16;

/// The FILETIME value Outlook writes for "no date" (4501-01-01)
pub const FILETIME_NO_DATE: u64 = 915151392000000000;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Property attribute flags
    pub struct PropertyFlags : u32 {
        /// The property must not be removed
        const MANDATORY = 1;
        /// The property can be read
        const READABLE = 1 << 1;
        /// The property can be changed
        const WRITABLE = 1 << 2;
    }
}

impl Serialize for PropertyFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let v: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        v.serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// A currency amount: a signed 64 bit integer scaled by 10⁻⁴
pub struct Currency(pub i64);

impl Currency {
    /// The amount as a float
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 10000.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:04}", abs / 10000, abs % 10000)
    }
}

impl Serialize for Currency {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A decoded property value
pub enum PropertyValue {
    /// PtypNull
    Null,
    /// PtypBoolean
    Bool(bool),
    /// PtypInteger16
    I16(i16),
    /// PtypInteger32
    I32(i32),
    /// PtypInteger64
    I64(i64),
    /// PtypFloating32
    F32(f32),
    /// PtypFloating64
    F64(f64),
    /// PtypCurrency
    Currency(Currency),
    /// PtypFloatingTime
    FloatingTime(OffsetDateTime),
    /// PtypTime
    Time(OffsetDateTime),
    /// PtypErrorCode
    ErrorCode(ErrorValue),
    /// PtypGuid, as the raw value bytes
    Guid([u8; 8]),
    /// PtypUnspecified, as the raw value bytes
    Unspecified([u8; 8]),
    /// A value whose conversion failed, as the raw value bytes
    Undecoded([u8; 8]),
    /// PtypString8
    String8(String),
    /// PtypString
    Unicode(String),
    /// PtypBinary and the other opaque variable length types
    Binary(Vec<u8>),
    /// PtypObject
    Object(Vec<u8>),
    /// PtypMultipleInteger16
    MultipleI16(Vec<i16>),
    /// PtypMultipleInteger32
    MultipleI32(Vec<i32>),
    /// PtypMultipleFloating32
    MultipleF32(Vec<f32>),
    /// PtypMultipleFloating64
    MultipleF64(Vec<f64>),
    /// PtypMultipleCurrency
    MultipleCurrency(Vec<Currency>),
    /// PtypMultipleFloatingTime
    MultipleFloatingTime(Vec<Option<OffsetDateTime>>),
    /// PtypMultipleInteger64
    MultipleI64(Vec<i64>),
    /// PtypMultipleTime
    MultipleTime(Vec<Option<OffsetDateTime>>),
    /// PtypMultipleGuid
    MultipleGuid(Vec<GUID>),
    /// PtypMultipleString8
    MultipleString8(Vec<String>),
    /// PtypMultipleString
    MultipleUnicode(Vec<String>),
    /// PtypMultipleBinary
    MultipleBinary(Vec<Vec<u8>>),
}

impl PropertyValue {
    /// The value as a string slice, for either string type
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String8(s) | Self::Unicode(s) => Some(s),
            _ => None,
        }
    }

    /// The value as an integer, for any integer type
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::I16(v) => Some((*v).into()),
            Self::I32(v) => Some((*v).into()),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a float, for the floating point and currency types
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some((*v).into()),
            Self::F64(v) => Some(*v),
            Self::Currency(v) => Some(v.to_f64()),
            _ => None,
        }
    }

    /// The value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a date, for both date types
    pub fn as_time(&self) -> Option<&OffsetDateTime> {
        match self {
            Self::Time(t) | Self::FloatingTime(t) => Some(t),
            _ => None,
        }
    }

    /// The raw content of binary and object values
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(v) | Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// The elements of a multi valued string property
    pub fn as_str_list(&self) -> Option<&[String]> {
        match self {
            Self::MultipleString8(v) | Self::MultipleUnicode(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A property whose value is stored in the description itself
pub struct FixedLengthProperty {
    /// Property tag
    pub tag: PropertyTag,
    /// Property flags
    pub flags: PropertyFlags,
    /// The original description
    pub raw: [u8; RECORD_SIZE],
    /// The decoded value
    pub value: PropertyValue,
}

#[derive(Debug, Clone, PartialEq)]
/// A property whose value is stored in a separate content stream
pub struct VariableLengthProperty {
    /// Property tag
    pub tag: PropertyTag,
    /// Property flags
    pub flags: PropertyFlags,
    /// The original description
    pub raw: [u8; RECORD_SIZE],
    /// The declared size
    pub length: u32,
    /// The reserved field following the size
    pub reserved: u32,
    /// The content length in bytes for strings and opaque data, the element
    /// count for multi valued properties; not set for objects
    pub real_length: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
/// A decoded property description
pub enum PropertyRecord {
    /// Value stored inline
    Fixed(FixedLengthProperty),
    /// Value stored in a content stream
    Variable(VariableLengthProperty),
}

impl PropertyRecord {
    /// Property tag
    pub fn tag(&self) -> PropertyTag {
        match self {
            Self::Fixed(p) => p.tag,
            Self::Variable(p) => p.tag,
        }
    }

    /// Property type code
    pub fn type_code(&self) -> u16 {
        self.tag().ptype()
    }

    /// Property flags
    pub fn flags(&self) -> PropertyFlags {
        match self {
            Self::Fixed(p) => p.flags,
            Self::Variable(p) => p.flags,
        }
    }

    /// Whether the property is flagged as mandatory
    pub fn mandatory(&self) -> bool {
        self.flags().contains(PropertyFlags::MANDATORY)
    }

    /// Whether the property is flagged as readable
    pub fn readable(&self) -> bool {
        self.flags().contains(PropertyFlags::READABLE)
    }

    /// Whether the property is flagged as writable
    pub fn writable(&self) -> bool {
        self.flags().contains(PropertyFlags::WRITABLE)
    }

    /// The original 16 bytes
    pub fn raw(&self) -> &[u8; RECORD_SIZE] {
        match self {
            Self::Fixed(p) => &p.raw,
            Self::Variable(p) => &p.raw,
        }
    }
}

/// Converts a FILETIME
///
/// Values before the Unix epoch are counted leniently from 1601, the "no
/// date" marker maps to the largest representable instant
pub fn filetime_value(raw: u64) -> Option<OffsetDateTime> {
    if raw < FILETIME_UNIX_EPOCH {
        filetime_to_datetime_lenient(raw)
    } else if raw == FILETIME_NO_DATE {
        Some(PrimitiveDateTime::MAX.assume_utc())
    } else {
        filetime_to_datetime(raw)
    }
}

fn decode_fixed(
    tag: PropertyTag,
    rule: FixedRule,
    width: usize,
    value: [u8; 8],
    sink: &dyn DiagnosticSink,
) -> PropertyValue {
    let v = &value[..width];
    let overflow = |raw: u64| {
        sink.report(PropertyError::TimestampOverflow { tag, raw }.into());
        PropertyValue::Undecoded(value)
    };
    match rule {
        FixedRule::Unspecified => PropertyValue::Unspecified(value),
        FixedRule::Null => {
            if value != [0u8; 8] {
                sink.report(Diagnostic::NonZeroNull { tag });
            }
            PropertyValue::Null
        }
        FixedRule::Integer16 => PropertyValue::I16(LE::read_i16(v)),
        FixedRule::Integer32 => PropertyValue::I32(LE::read_i32(v)),
        FixedRule::Floating32 => PropertyValue::F32(LE::read_f32(v)),
        FixedRule::Floating64 => PropertyValue::F64(LE::read_f64(v)),
        FixedRule::Currency => PropertyValue::Currency(Currency(LE::read_i64(v))),
        FixedRule::FloatingTime => {
            let days = LE::read_f64(v);
            match oletime_to_datetime(days) {
                Some(t) => PropertyValue::FloatingTime(t),
                None => overflow(days.to_bits()),
            }
        }
        FixedRule::ErrorCode => {
            let code = ErrorValue::new(LE::read_u32(v));
            if let ErrorValue::Unmapped(value) = code {
                sink.report(Diagnostic::UnmappedErrorCode { tag, value });
            }
            PropertyValue::ErrorCode(code)
        }
        FixedRule::Boolean => PropertyValue::Bool(LE::read_u16(v) != 0),
        FixedRule::Integer64 => PropertyValue::I64(LE::read_i64(v)),
        FixedRule::Time => {
            let raw = LE::read_u64(v);
            match filetime_value(raw) {
                Some(t) => PropertyValue::Time(t),
                None => overflow(raw),
            }
        }
        FixedRule::Guid => PropertyValue::Guid(value),
    }
}

/// Decodes one property description
///
/// Content streams are never read here. Recoverable anomalies (unknown type
/// codes, unmapped error codes, out of range dates) are reported to `sink`
/// and the record is still returned; descriptions which cannot be
/// interpreted at all are returned as errors
pub fn decode_record(
    blob: &[u8],
    sink: &dyn DiagnosticSink,
) -> Result<PropertyRecord, PropertyError> {
    let raw: [u8; RECORD_SIZE] = blob
        .get(..RECORD_SIZE)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| {
            PropertyError::malformed(
                None,
                format!("description is {} bytes long", blob.len()),
            )
        })?;
    let tag = PropertyTag::from_raw([raw[0], raw[1], raw[2], raw[3]]);
    let flags = PropertyFlags::from_bits_retain(LE::read_u32(&raw[4..8]));
    let mut value = [0u8; 8];
    value.copy_from_slice(&raw[8..16]);

    let rule = match dispatch(tag.ptype()) {
        Dispatch::Fixed { width, rule } => {
            return Ok(PropertyRecord::Fixed(FixedLengthProperty {
                tag,
                flags,
                raw,
                value: decode_fixed(tag, rule, width, value, sink),
            }));
        }
        Dispatch::Variable(rule) => rule,
        Dispatch::Unknown => {
            sink.report(Diagnostic::UnknownTypeCode { tag });
            LengthRule::PassThrough
        }
    };
    let length = LE::read_u32(&value[0..4]);
    let reserved = LE::read_u32(&value[4..8]);
    let real_length = rule.real_length(length).ok_or_else(|| {
        PropertyError::malformed(
            Some(tag),
            format!(
                "declared length {length} is invalid for type {:#06x}",
                tag.ptype()
            ),
        )
    })?;
    Ok(PropertyRecord::Variable(VariableLengthProperty {
        tag,
        flags,
        raw,
        length,
        reserved,
        real_length,
    }))
}

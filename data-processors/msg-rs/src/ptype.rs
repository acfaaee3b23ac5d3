//! Property types and the decode dispatch table
//!
//! [`dispatch`] is the single place where a type code is mapped to the way
//! its property description is decoded; see [MS-OXCDATA] 2.11.1
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
/// A known property type
#[allow(missing_docs)]
pub enum PropType {
    Unspecified,
    Null,
    Integer16,
    Integer32,
    Floating32,
    Floating64,
    Currency,
    FloatingTime,
    ErrorCode,
    Boolean,
    Object,
    Integer64,
    String8,
    String,
    Time,
    Guid,
    ServerId,
    Restriction,
    RuleAction,
    Binary,
    MultipleInteger16,
    MultipleInteger32,
    MultipleFloating32,
    MultipleFloating64,
    MultipleCurrency,
    MultipleFloatingTime,
    MultipleInteger64,
    MultipleString8,
    MultipleString,
    MultipleTime,
    MultipleGuid,
    MultipleBinary,
}

impl PropType {
    /// Every known type
    pub const ALL: [PropType; 32] = [
        Self::Unspecified,
        Self::Null,
        Self::Integer16,
        Self::Integer32,
        Self::Floating32,
        Self::Floating64,
        Self::Currency,
        Self::FloatingTime,
        Self::ErrorCode,
        Self::Boolean,
        Self::Object,
        Self::Integer64,
        Self::String8,
        Self::String,
        Self::Time,
        Self::Guid,
        Self::ServerId,
        Self::Restriction,
        Self::RuleAction,
        Self::Binary,
        Self::MultipleInteger16,
        Self::MultipleInteger32,
        Self::MultipleFloating32,
        Self::MultipleFloating64,
        Self::MultipleCurrency,
        Self::MultipleFloatingTime,
        Self::MultipleInteger64,
        Self::MultipleString8,
        Self::MultipleString,
        Self::MultipleTime,
        Self::MultipleGuid,
        Self::MultipleBinary,
    ];

    /// The wire type code
    pub const fn code(&self) -> u16 {
        match self {
            Self::Unspecified => 0x0000,
            Self::Null => 0x0001,
            Self::Integer16 => 0x0002,
            Self::Integer32 => 0x0003,
            Self::Floating32 => 0x0004,
            Self::Floating64 => 0x0005,
            Self::Currency => 0x0006,
            Self::FloatingTime => 0x0007,
            Self::ErrorCode => 0x000a,
            Self::Boolean => 0x000b,
            Self::Object => 0x000d,
            Self::Integer64 => 0x0014,
            Self::String8 => 0x001e,
            Self::String => 0x001f,
            Self::Time => 0x0040,
            Self::Guid => 0x0048,
            Self::ServerId => 0x00fb,
            Self::Restriction => 0x00fd,
            Self::RuleAction => 0x00fe,
            Self::Binary => 0x0102,
            Self::MultipleInteger16 => 0x1002,
            Self::MultipleInteger32 => 0x1003,
            Self::MultipleFloating32 => 0x1004,
            Self::MultipleFloating64 => 0x1005,
            Self::MultipleCurrency => 0x1006,
            Self::MultipleFloatingTime => 0x1007,
            Self::MultipleInteger64 => 0x1014,
            Self::MultipleString8 => 0x101e,
            Self::MultipleString => 0x101f,
            Self::MultipleTime => 0x1040,
            Self::MultipleGuid => 0x1048,
            Self::MultipleBinary => 0x1102,
        }
    }

    /// Look up a wire type code
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Whether the type is one of the multi valued ones
    pub const fn is_multiple(&self) -> bool {
        self.code() & 0x1000 != 0
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ptyp{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How the 8 value bytes of a fixed length property are converted
pub enum FixedRule {
    /// Kept as raw bytes
    Unspecified,
    /// No value
    Null,
    /// Signed 16 bit integer
    Integer16,
    /// Signed 32 bit integer
    Integer32,
    /// IEEE single
    Floating32,
    /// IEEE double
    Floating64,
    /// Signed 64 bit integer scaled by 10⁻⁴
    Currency,
    /// Days since 1899-12-30 as IEEE double
    FloatingTime,
    /// MAPI error code
    ErrorCode,
    /// Boolean
    Boolean,
    /// Signed 64 bit integer
    Integer64,
    /// FILETIME
    Time,
    /// GUID, kept as raw bytes
    Guid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How the content length of a variable length property is derived from
/// its declared length
pub enum LengthRule {
    /// Narrow string: one trailing NUL byte
    NarrowString,
    /// Wide string: one trailing UTF-16 NUL
    WideString,
    /// Array of elements of the given byte width: the result is a count
    Elements(u32),
    /// The length is carried elsewhere
    External,
    /// The length is the content size
    PassThrough,
}

impl LengthRule {
    /// Computes the real length, or `None` if `length` cannot satisfy the rule
    ///
    /// The inner `None` is returned for [`External`](Self::External)
    pub fn real_length(&self, length: u32) -> Option<Option<u32>> {
        match self {
            Self::NarrowString => length.checked_sub(1).map(Some),
            Self::WideString => {
                if length % 2 != 0 {
                    None
                } else {
                    length.checked_sub(2).map(Some)
                }
            }
            Self::Elements(width) => {
                if length % width != 0 {
                    None
                } else {
                    Some(Some(length / width))
                }
            }
            Self::External => Some(None),
            Self::PassThrough => Some(Some(length)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The decode rule for a type code
pub enum Dispatch {
    /// The value is stored inline
    Fixed {
        /// Significant bytes of the 8 byte value field
        width: usize,
        /// Conversion to apply
        rule: FixedRule,
    },
    /// The value is stored in a content stream
    Variable(LengthRule),
    /// Not a known type
    Unknown,
}

/// Return the decode rule for `code`
pub fn dispatch(code: u16) -> Dispatch {
    let Some(ptype) = PropType::from_code(code) else {
        return Dispatch::Unknown;
    };
    let fixed = |width, rule| Dispatch::Fixed { width, rule };
    match ptype {
        PropType::Unspecified => fixed(8, FixedRule::Unspecified),
        PropType::Null => fixed(0, FixedRule::Null),
        PropType::Integer16 => fixed(2, FixedRule::Integer16),
        PropType::Integer32 => fixed(4, FixedRule::Integer32),
        PropType::Floating32 => fixed(4, FixedRule::Floating32),
        PropType::Floating64 => fixed(8, FixedRule::Floating64),
        PropType::Currency => fixed(8, FixedRule::Currency),
        PropType::FloatingTime => fixed(8, FixedRule::FloatingTime),
        PropType::ErrorCode => fixed(4, FixedRule::ErrorCode),
        PropType::Boolean => fixed(2, FixedRule::Boolean),
        PropType::Integer64 => fixed(8, FixedRule::Integer64),
        PropType::Time => fixed(8, FixedRule::Time),
        PropType::Guid => fixed(8, FixedRule::Guid),
        PropType::String8 => Dispatch::Variable(LengthRule::NarrowString),
        PropType::String => Dispatch::Variable(LengthRule::WideString),
        PropType::Object => Dispatch::Variable(LengthRule::External),
        PropType::Binary
        | PropType::ServerId
        | PropType::Restriction
        | PropType::RuleAction => Dispatch::Variable(LengthRule::PassThrough),
        PropType::MultipleInteger16 => Dispatch::Variable(LengthRule::Elements(2)),
        PropType::MultipleInteger32
        | PropType::MultipleFloating32
        | PropType::MultipleString8
        | PropType::MultipleString => Dispatch::Variable(LengthRule::Elements(4)),
        PropType::MultipleFloating64
        | PropType::MultipleCurrency
        | PropType::MultipleFloatingTime
        | PropType::MultipleInteger64
        | PropType::MultipleTime
        | PropType::MultipleBinary => Dispatch::Variable(LengthRule::Elements(8)),
        PropType::MultipleGuid => Dispatch::Variable(LengthRule::Elements(16)),
    }
}

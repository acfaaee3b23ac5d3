//! Message properties
//!
//! A [`PropertyStore`] holds the decoded properties of one MAPI object (a
//! message, an embedded message, a recipient or an attachment). It is built
//! once from the object's property stream and content streams and is never
//! modified afterwards
use crate::config::DecodeConfig;
use crate::container::{PROPERTY_STREAM, StreamStore};
use crate::diag::{Diagnostic, DiagnosticSink};
use crate::error::{MsgError, PropertyError};
use crate::named::{NamedIdentifier, NamedPropertyKey, NamedPropertyMap, PropertySet, resolve};
use crate::ptype::{Dispatch, LengthRule, PropType, dispatch};
use crate::record::{
    Currency, PropertyRecord, PropertyValue, RECORD_SIZE, decode_record, filetime_value,
};
use crate::tags::{PID_TAG_INTERNET_CODEPAGE, PID_TAG_MESSAGE_CODEPAGE, PropertyTag};
use byteorder::{ByteOrder, LE};
use ctxutils::win32::{GUID, oletime_to_datetime};
use encoding_rs::{Encoding, UTF_16LE, WINDOWS_1252};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use time::OffsetDateTime;
#[allow(unused_imports)]
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The kind of object a storage holds, which determines the size of the
/// header of its property stream
pub enum StorageKind {
    /// The top level message
    Message,
    /// A message embedded in an attachment
    EmbeddedMessage,
    /// A recipient
    Recipient,
    /// An attachment
    Attachment,
}

impl StorageKind {
    /// Size of the property stream header
    pub const fn header_len(&self) -> usize {
        match self {
            Self::Message => 32,
            Self::EmbeddedMessage => 24,
            Self::Recipient | Self::Attachment => 8,
        }
    }

    const fn has_counts(&self) -> bool {
        matches!(self, Self::Message | Self::EmbeddedMessage)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// The counters in the property stream header of a message
pub struct ObjectCounts {
    /// Next recipient id
    pub next_recipient_id: u32,
    /// Next attachment id
    pub next_attachment_id: u32,
    /// Number of recipients
    pub recipient_count: u32,
    /// Number of attachments
    pub attachment_count: u32,
}

#[derive(Default)]
struct ContentStreams {
    single: HashMap<PropertyTag, Vec<u8>>,
    elements: HashMap<PropertyTag, BTreeMap<u32, Vec<u8>>>,
}

impl ContentStreams {
    fn new(streams: Vec<(String, Vec<u8>)>) -> Self {
        let mut ret = Self::default();
        for (name, data) in streams {
            match PropertyTag::from_stream_name(&name) {
                Some((tag, None)) => {
                    ret.single.insert(tag, data);
                }
                Some((tag, Some(index))) => {
                    ret.elements.entry(tag).or_default().insert(index, data);
                }
                None => debug!("Ignoring stream {name:?}"),
            }
        }
        ret
    }

    fn remaining_tags(&self) -> BTreeSet<PropertyTag> {
        self.single
            .keys()
            .chain(self.elements.keys())
            .copied()
            .collect()
    }
}

/// Decodes narrow and wide strings, dropping the NUL padding
fn decode_string(data: &[u8], encoding: &'static Encoding) -> String {
    let (s, _) = encoding.decode_without_bom_handling(data);
    s.trim_end_matches('\0').to_string()
}

struct ContentDecoder<'a> {
    streams: ContentStreams,
    encoding: &'static Encoding,
    sink: &'a dyn DiagnosticSink,
}

impl ContentDecoder<'_> {
    /// Decodes the content of `tag`
    ///
    /// `declared` is the real length from the property description, if any;
    /// without it the content streams determine the size
    fn decode(
        &mut self,
        tag: PropertyTag,
        rule: LengthRule,
        declared: Option<u32>,
    ) -> Option<PropertyValue> {
        let ptype = PropType::from_code(tag.ptype());
        match (ptype, rule) {
            (Some(PropType::Object), _) => {
                let data = self.streams.single.remove(&tag)?;
                Some(PropertyValue::Object(data))
            }
            (Some(PropType::MultipleString8), _)
            | (Some(PropType::MultipleString), _)
            | (Some(PropType::MultipleBinary), _) => self.decode_elements(tag, declared),
            (_, LengthRule::Elements(width)) => self.decode_array(tag, width, declared),
            _ => {
                let data = self.single(tag, declared)?;
                Some(match ptype {
                    Some(PropType::String8) => {
                        PropertyValue::String8(decode_string(&data, self.encoding))
                    }
                    Some(PropType::String) => PropertyValue::Unicode(decode_string(&data, UTF_16LE)),
                    _ => PropertyValue::Binary(data),
                })
            }
        }
    }

    /// Takes the content stream of `tag`, truncated to `declared` bytes
    fn single(&mut self, tag: PropertyTag, declared: Option<u32>) -> Option<Vec<u8>> {
        let Some(mut data) = self.streams.single.remove(&tag) else {
            self.sink.report(Diagnostic::MissingContentStream { tag });
            return None;
        };
        if let Some(len) = declared {
            let len = len as usize;
            if data.len() < len {
                self.sink.report(
                    PropertyError::malformed(
                        Some(tag),
                        format!("content stream is {} bytes, {len} declared", data.len()),
                    )
                    .into(),
                );
                return None;
            }
            data.truncate(len);
        }
        Some(data)
    }

    /// Decodes an array of fixed size elements stored in a single stream
    fn decode_array(
        &mut self,
        tag: PropertyTag,
        width: u32,
        declared: Option<u32>,
    ) -> Option<PropertyValue> {
        let width = width as usize;
        let declared_bytes = declared.map(|count| count.saturating_mul(width as u32));
        let ptype = PropType::from_code(tag.ptype())?;
        let data = self.single(tag, declared_bytes)?;
        let items = data.chunks_exact(width);
        let sink = self.sink;
        let overflow = |decoded: Option<OffsetDateTime>, raw: u64| {
            if decoded.is_none() {
                sink.report(PropertyError::TimestampOverflow { tag, raw }.into());
            }
            decoded
        };
        Some(match ptype {
            PropType::MultipleInteger16 => PropertyValue::MultipleI16(items.map(LE::read_i16).collect()),
            PropType::MultipleInteger32 => PropertyValue::MultipleI32(items.map(LE::read_i32).collect()),
            PropType::MultipleFloating32 => PropertyValue::MultipleF32(items.map(LE::read_f32).collect()),
            PropType::MultipleFloating64 => PropertyValue::MultipleF64(items.map(LE::read_f64).collect()),
            PropType::MultipleCurrency => PropertyValue::MultipleCurrency(
                items.map(|v| Currency(LE::read_i64(v))).collect(),
            ),
            PropType::MultipleFloatingTime => PropertyValue::MultipleFloatingTime(
                items
                    .map(|v| {
                        let days = LE::read_f64(v);
                        overflow(oletime_to_datetime(days), days.to_bits())
                    })
                    .collect(),
            ),
            PropType::MultipleInteger64 => PropertyValue::MultipleI64(items.map(LE::read_i64).collect()),
            PropType::MultipleTime => PropertyValue::MultipleTime(
                items
                    .map(|v| {
                        let raw = LE::read_u64(v);
                        overflow(filetime_value(raw), raw)
                    })
                    .collect(),
            ),
            PropType::MultipleGuid => {
                PropertyValue::MultipleGuid(items.filter_map(GUID::from_le_bytes).collect())
            }
            _ => PropertyValue::Binary(items.flatten().copied().collect()),
        })
    }

    /// Assembles a multi valued property from its per element streams
    fn decode_elements(&mut self, tag: PropertyTag, declared: Option<u32>) -> Option<PropertyValue> {
        let lengths = self.streams.single.remove(&tag);
        let mut elements = self.streams.elements.remove(&tag).unwrap_or_default();
        let count = match (declared, &lengths) {
            (Some(count), _) => count,
            (None, Some(lengths)) => {
                let width = if tag.ptype() == PropType::MultipleBinary.code() { 8 } else { 4 };
                (lengths.len() / width) as u32
            }
            (None, None) => elements.len() as u32,
        };
        if lengths.is_none() && elements.is_empty() && count > 0 {
            self.sink.report(Diagnostic::MissingContentStream { tag });
            return None;
        }
        let mut values: Vec<Vec<u8>> = Vec::with_capacity(count.min(1024) as usize);
        for index in 0..count {
            match elements.remove(&index) {
                Some(data) => values.push(data),
                None => {
                    self.sink.report(Diagnostic::MissingContentStream { tag });
                    break;
                }
            }
        }
        Some(match PropType::from_code(tag.ptype())? {
            PropType::MultipleString8 => PropertyValue::MultipleString8(
                values.iter().map(|v| decode_string(v, self.encoding)).collect(),
            ),
            PropType::MultipleString => PropertyValue::MultipleUnicode(
                values.iter().map(|v| decode_string(v, UTF_16LE)).collect(),
            ),
            _ => PropertyValue::MultipleBinary(values),
        })
    }
}

/// The decoded properties of one MAPI object
#[derive(Debug)]
pub struct PropertyStore {
    path: String,
    codepage: u16,
    records: Vec<PropertyRecord>,
    values: BTreeMap<PropertyTag, PropertyValue>,
    named: Arc<NamedPropertyMap>,
}

impl PropertyStore {
    /// Builds a store from property descriptions and content streams
    ///
    /// `blobs` are the 16 byte descriptions in stream order, `streams` the
    /// content streams of the object storage (`path`). Properties which
    /// cannot be decoded are reported to `sink` and skipped: construction
    /// always completes
    pub fn build<'b, I: IntoIterator<Item = &'b [u8]>>(
        path: &str,
        blobs: I,
        streams: Vec<(String, Vec<u8>)>,
        named: Arc<NamedPropertyMap>,
        config: &DecodeConfig,
        sink: &dyn DiagnosticSink,
    ) -> Self {
        let mut records: Vec<PropertyRecord> = Vec::new();
        for blob in blobs {
            match decode_record(blob, sink) {
                Ok(record) => records.push(record),
                Err(e) => sink.report(e.into()),
            }
        }

        let (codepage, encoding) = select_codepage(&records, config.default_codepage);
        let mut decoder = ContentDecoder {
            streams: ContentStreams::new(streams),
            encoding,
            sink,
        };

        let mut values = BTreeMap::new();
        for record in records.iter() {
            let tag = record.tag();
            if tag.is_named() && named.key_of(tag.id()).is_none() {
                sink.report(Diagnostic::UnmappedNamedProperty { tag });
            }
            let value = match record {
                PropertyRecord::Fixed(p) => Some(p.value.clone()),
                PropertyRecord::Variable(p) => {
                    let rule = match dispatch(tag.ptype()) {
                        Dispatch::Variable(rule) => rule,
                        _ => LengthRule::PassThrough,
                    };
                    decoder.decode(tag, rule, p.real_length)
                }
            };
            if let Some(value) = value {
                values.insert(tag, value);
            }
        }

        for tag in decoder.streams.remaining_tags() {
            if values.contains_key(&tag) {
                continue;
            }
            let rule = match dispatch(tag.ptype()) {
                Dispatch::Variable(rule) => rule,
                Dispatch::Unknown => LengthRule::PassThrough,
                Dispatch::Fixed { .. } => {
                    debug!("Ignoring content stream for fixed length property {tag}");
                    continue;
                }
            };
            if tag.is_named() && named.key_of(tag.id()).is_none() {
                sink.report(Diagnostic::UnmappedNamedProperty { tag });
            }
            if let Some(value) = decoder.decode(tag, rule, None) {
                debug!("Property {tag} has a content stream but no description");
                values.insert(tag, value);
            }
        }

        debug!(
            "Storage {path:?}: {} records, {} values, codepage {codepage}",
            records.len(),
            values.len()
        );
        Self {
            path: path.to_string(),
            codepage,
            records,
            values,
            named,
        }
    }

    /// Loads the store of the object in `storage`
    ///
    /// The property stream header is `kind`-dependent; for messages the
    /// counters it holds are returned alongside the store
    pub fn load<S: StreamStore + ?Sized>(
        container: &S,
        storage: &str,
        kind: StorageKind,
        named: Arc<NamedPropertyMap>,
        config: &DecodeConfig,
        sink: &dyn DiagnosticSink,
    ) -> Result<(Self, ObjectCounts), MsgError> {
        let path = format!("{storage}{PROPERTY_STREAM}");
        let data = container
            .read_stream(&path)
            .map_err(|e| MsgError::container(&path, e))?;
        let header_len = kind.header_len();
        if data.len() < header_len {
            return Err(MsgError::TruncatedHeader {
                path,
                expected: header_len,
            });
        }
        let counts = if kind.has_counts() {
            ObjectCounts {
                next_recipient_id: LE::read_u32(&data[8..12]),
                next_attachment_id: LE::read_u32(&data[12..16]),
                recipient_count: LE::read_u32(&data[16..20]),
                attachment_count: LE::read_u32(&data[20..24]),
            }
        } else {
            ObjectCounts::default()
        };
        let streams = container
            .list_property_streams(storage)
            .map_err(|e| MsgError::container(storage, e))?;
        let store = Self::build(
            storage,
            data[header_len..].chunks(RECORD_SIZE),
            streams,
            named,
            config,
            sink,
        );
        Ok((store, counts))
    }

    /// The storage path of the object
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The codepage used for narrow strings
    pub fn codepage(&self) -> u16 {
        self.codepage
    }

    /// The decoded property descriptions, in stream order
    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    /// The named property map shared by the message
    pub fn named_map(&self) -> &Arc<NamedPropertyMap> {
        &self.named
    }

    /// Number of properties with a value
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no property has a value
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the properties in tag order
    pub fn iter(&self) -> impl Iterator<Item = (PropertyTag, &PropertyValue)> {
        self.values.iter().map(|(tag, value)| (*tag, value))
    }

    /// The value of the property with tag `tag`
    pub fn get(&self, tag: PropertyTag) -> Option<&PropertyValue> {
        self.values.get(&tag)
    }

    /// The value of the property with ID `id`, whatever its type
    pub fn get_by_id(&self, id: u16) -> Option<&PropertyValue> {
        self.values
            .range(PropertyTag::new(id, 0)..=PropertyTag::new(id, 0xffff))
            .next()
            .map(|(_, v)| v)
    }

    /// The value of a named property
    pub fn get_named(
        &self,
        identifier: &NamedIdentifier,
        property_set: &GUID,
    ) -> Option<&PropertyValue> {
        let key = NamedPropertyKey {
            property_set: *property_set,
            identifier: identifier.clone(),
        };
        self.get_by_id(resolve(&self.named, &key)?)
    }

    /// The value of the numeric named property `lid` of a well known set
    pub fn named(&self, set: PropertySet, lid: u32) -> Option<&PropertyValue> {
        self.get_named(&NamedIdentifier::Numeric(lid), &set.guid())
    }

    /// A string property
    pub fn string(&self, id: u16) -> Option<&str> {
        self.get_by_id(id)?.as_str()
    }

    /// An integer property
    pub fn int(&self, id: u16) -> Option<i64> {
        self.get_by_id(id)?.as_int()
    }

    /// A boolean property
    pub fn bool(&self, id: u16) -> Option<bool> {
        self.get_by_id(id)?.as_bool()
    }

    /// A date property
    pub fn time(&self, id: u16) -> Option<&OffsetDateTime> {
        self.get_by_id(id)?.as_time()
    }

    /// A floating point or currency property
    pub fn float(&self, id: u16) -> Option<f64> {
        self.get_by_id(id)?.as_float()
    }

    /// A binary property
    pub fn binary(&self, id: u16) -> Option<&[u8]> {
        self.get_by_id(id)?.as_bytes()
    }
}

fn select_codepage(records: &[PropertyRecord], default: u16) -> (u16, &'static Encoding) {
    let declared = [PID_TAG_MESSAGE_CODEPAGE, PID_TAG_INTERNET_CODEPAGE]
        .into_iter()
        .filter_map(|id| {
            records.iter().find_map(|r| match r {
                PropertyRecord::Fixed(p) if p.tag.id() == id => p.value.as_int(),
                _ => None,
            })
        })
        .filter_map(|cp| u16::try_from(cp).ok());
    for cp in declared.chain(std::iter::once(default)) {
        match codepage::to_encoding(cp) {
            Some(encoding) => return (cp, encoding),
            None => warn!("Unsupported codepage {cp}"),
        }
    }
    (1252, WINDOWS_1252)
}

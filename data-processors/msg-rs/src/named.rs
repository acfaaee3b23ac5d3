//! Named properties
//!
//! Properties with IDs at or above `0x8000` are *named*: their identity is a
//! property set GUID plus either a numeric long ID or a string name, and the
//! ID under which a message stores them is assigned per message through the
//! `__nameid_version1.0` storage ([MS-OXMSG] 2.2.3)
use crate::container::{CONTENT_STREAM_PREFIX, StreamStore};
use crate::diag::{Diagnostic, DiagnosticSink};
use crate::error::MsgError;
use byteorder::{ByteOrder, LE};
use ctxutils::win32::GUID;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;
use tracing::debug;

/// The storage holding the named property mapping
pub const NAMEID_STORAGE: &str = "__nameid_version1.0/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
/// A well known property set
#[allow(missing_docs)]
pub enum PropertySet {
    Mapi,
    PublicStrings,
    Common,
    Address,
    InternetHeaders,
    Appointment,
    Meeting,
    Log,
    Messaging,
    Note,
    PostRss,
    Task,
    UnifiedMessaging,
    AirSync,
    Sharing,
    XmlExtractedEntities,
    Attachment,
}

const fn ms_guid(data1: u32) -> GUID {
    GUID::new(data1, 0, 0, [0xc0, 0, 0, 0, 0, 0, 0, 0x46])
}

impl PropertySet {
    /// Every well known set
    pub const ALL: [PropertySet; 17] = [
        Self::Mapi,
        Self::PublicStrings,
        Self::Common,
        Self::Address,
        Self::InternetHeaders,
        Self::Appointment,
        Self::Meeting,
        Self::Log,
        Self::Messaging,
        Self::Note,
        Self::PostRss,
        Self::Task,
        Self::UnifiedMessaging,
        Self::AirSync,
        Self::Sharing,
        Self::XmlExtractedEntities,
        Self::Attachment,
    ];

    /// The GUID of the set
    pub const fn guid(&self) -> GUID {
        match self {
            Self::Mapi => ms_guid(0x00020328),
            Self::PublicStrings => ms_guid(0x00020329),
            Self::Common => ms_guid(0x00062008),
            Self::Address => ms_guid(0x00062004),
            Self::InternetHeaders => ms_guid(0x00020386),
            Self::Appointment => ms_guid(0x00062002),
            Self::Meeting => GUID::new(
                0x6ed8da90,
                0x450b,
                0x101b,
                [0x98, 0xda, 0x00, 0xaa, 0x00, 0x3f, 0x13, 0x05],
            ),
            Self::Log => ms_guid(0x0006200a),
            Self::Messaging => GUID::new(
                0x41f28f13,
                0x83f4,
                0x4114,
                [0xa5, 0x84, 0xee, 0xdb, 0x5a, 0x6b, 0x0b, 0xff],
            ),
            Self::Note => ms_guid(0x0006200e),
            Self::PostRss => ms_guid(0x00062041),
            Self::Task => ms_guid(0x00062003),
            Self::UnifiedMessaging => GUID::new(
                0x4442858e,
                0xa9e3,
                0x4e80,
                [0xb9, 0x00, 0x31, 0x7a, 0x21, 0x0c, 0xc1, 0x5b],
            ),
            Self::AirSync => GUID::new(
                0x71035549,
                0x0739,
                0x4dcb,
                [0x91, 0x63, 0x00, 0xf0, 0x58, 0x0d, 0xbb, 0xdf],
            ),
            Self::Sharing => ms_guid(0x00062040),
            Self::XmlExtractedEntities => GUID::new(
                0x23239608,
                0x685d,
                0x4732,
                [0x9c, 0x55, 0x4c, 0x95, 0xcb, 0x4e, 0x8e, 0x33],
            ),
            Self::Attachment => GUID::new(
                0x96357f7f,
                0x59e1,
                0x47d0,
                [0x99, 0xa7, 0x46, 0x51, 0x5c, 0x18, 0x3b, 0x54],
            ),
        }
    }

    /// The well known set with GUID `guid`
    pub fn from_guid(guid: &GUID) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.guid() == *guid)
    }

    /// The customary name of the set
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mapi => "PS_MAPI",
            Self::PublicStrings => "PS_PUBLIC_STRINGS",
            Self::Common => "PSETID_Common",
            Self::Address => "PSETID_Address",
            Self::InternetHeaders => "PS_INTERNET_HEADERS",
            Self::Appointment => "PSETID_Appointment",
            Self::Meeting => "PSETID_Meeting",
            Self::Log => "PSETID_Log",
            Self::Messaging => "PSETID_Messaging",
            Self::Note => "PSETID_Note",
            Self::PostRss => "PSETID_PostRss",
            Self::Task => "PSETID_Task",
            Self::UnifiedMessaging => "PSETID_UnifiedMessaging",
            Self::AirSync => "PSETID_AirSync",
            Self::Sharing => "PSETID_Sharing",
            Self::XmlExtractedEntities => "PSETID_XmlExtractedEntities",
            Self::Attachment => "PSETID_Attachment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
/// The identifier of a named property inside its set
pub enum NamedIdentifier {
    /// A numeric long ID
    Numeric(u32),
    /// A string name
    Name(String),
}

impl fmt::Display for NamedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id:#06x}"),
            Self::Name(name) => write!(f, "{name:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
/// The identity of a named property
pub struct NamedPropertyKey {
    /// The property set
    pub property_set: GUID,
    /// The identifier inside the set
    pub identifier: NamedIdentifier,
}

impl NamedPropertyKey {
    /// A numeric named property of a well known set
    pub fn numeric(set: PropertySet, id: u32) -> Self {
        Self {
            property_set: set.guid(),
            identifier: NamedIdentifier::Numeric(id),
        }
    }

    /// A string named property of a well known set
    pub fn string<S: Into<String>>(set: PropertySet, name: S) -> Self {
        Self {
            property_set: set.guid(),
            identifier: NamedIdentifier::Name(name.into()),
        }
    }
}

impl fmt::Display for NamedPropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match PropertySet::from_guid(&self.property_set) {
            Some(set) => write!(f, "{}:{}", set.name(), self.identifier),
            None => write!(f, "{}:{}", self.property_set, self.identifier),
        }
    }
}

#[derive(Debug, Default, Clone)]
/// The per message mapping between named properties and property IDs
pub struct NamedPropertyMap {
    ids: HashMap<NamedPropertyKey, u16>,
    keys: BTreeMap<u16, NamedPropertyKey>,
}

impl NamedPropertyMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map from `(key, property ID)` pairs
    pub fn from_entries<I: IntoIterator<Item = (NamedPropertyKey, u16)>>(entries: I) -> Self {
        let mut ret = Self::new();
        for (key, id) in entries {
            ret.insert(key, id);
        }
        ret
    }

    fn insert(&mut self, key: NamedPropertyKey, id: u16) {
        self.keys.insert(id, key.clone());
        self.ids.insert(key, id);
    }

    /// Parse the `__nameid_version1.0` storage of `container`
    ///
    /// A missing storage gives an empty map; entries which cannot be
    /// interpreted are skipped and reported to `sink`
    pub fn from_container<S: StreamStore + ?Sized>(
        container: &S,
        sink: &dyn DiagnosticSink,
    ) -> Result<Self, MsgError> {
        let read = |name: &str| -> Result<Vec<u8>, MsgError> {
            let path = format!("{NAMEID_STORAGE}{CONTENT_STREAM_PREFIX}{name}");
            match container.read_stream(&path) {
                Ok(data) => Ok(data),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
                Err(e) => Err(MsgError::container(&path, e)),
            }
        };
        let guids = read("00020102")?;
        let entries = read("00030102")?;
        let strings = read("00040102")?;
        let ret = Self::parse(&guids, &entries, &strings, sink);
        debug!("Named property map with {} entries", ret.len());
        Ok(ret)
    }

    /// Build the map from the contents of the GUID, entry and string streams
    pub fn parse(
        guids: &[u8],
        entries: &[u8],
        strings: &[u8],
        sink: &dyn DiagnosticSink,
    ) -> Self {
        let mut ret = Self::new();
        let chunks = entries.chunks_exact(8);
        if !chunks.remainder().is_empty() {
            sink.report(Diagnostic::BadNamedPropertyEntry {
                index: entries.len() / 8,
                reason: format!("{} trailing bytes", chunks.remainder().len()),
            });
        }
        for (index, entry) in chunks.enumerate() {
            match parse_entry(entry, guids, strings) {
                Ok((key, id)) => ret.insert(key, id),
                Err(reason) => sink.report(Diagnostic::BadNamedPropertyEntry { index, reason }),
            }
        }
        ret
    }

    /// The property ID assigned to `key`
    pub fn id_of(&self, key: &NamedPropertyKey) -> Option<u16> {
        self.ids.get(key).copied()
    }

    /// The named property stored under property ID `id`
    pub fn key_of(&self, id: u16) -> Option<&NamedPropertyKey> {
        self.keys.get(&id)
    }

    /// Number of mapped properties
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over `(property ID, key)` in ID order
    pub fn iter(&self) -> impl Iterator<Item = (u16, &NamedPropertyKey)> {
        self.keys.iter().map(|(id, key)| (*id, key))
    }
}

fn parse_entry(entry: &[u8], guids: &[u8], strings: &[u8]) -> Result<(NamedPropertyKey, u16), String> {
    let name_or_offset = LE::read_u32(&entry[0..4]);
    let info = LE::read_u32(&entry[4..8]);
    let is_string = info & 1 != 0;
    let guid_index = ((info >> 1) & 0x7fff) as usize;
    let property_index = (info >> 16) as u16;
    let id = 0x8000u16
        .checked_add(property_index)
        .ok_or_else(|| format!("property index {property_index:#x} out of range"))?;
    let property_set = match guid_index {
        0 => return Err("null GUID index".to_string()),
        1 => PropertySet::Mapi.guid(),
        2 => PropertySet::PublicStrings.guid(),
        n => {
            let start = (n - 3) * 16;
            guids
                .get(start..start + 16)
                .and_then(GUID::from_le_bytes)
                .ok_or_else(|| format!("GUID index {n} out of range"))?
        }
    };
    let identifier = if is_string {
        let offset = name_or_offset as usize;
        let len = strings
            .get(offset..offset + 4)
            .map(LE::read_u32)
            .ok_or_else(|| format!("string offset {offset:#x} out of range"))?
            as usize;
        let raw = strings
            .get(offset + 4..offset + 4 + len)
            .ok_or_else(|| format!("string at {offset:#x} overflows its stream"))?;
        let (name, _) = encoding_rs::UTF_16LE.decode_without_bom_handling(raw);
        NamedIdentifier::Name(name.trim_end_matches('\0').to_string())
    } else {
        NamedIdentifier::Numeric(name_or_offset)
    };
    Ok((
        NamedPropertyKey {
            property_set,
            identifier,
        },
        id,
    ))
}

/// Return the property ID under which `map` stores `key`
pub fn resolve(map: &NamedPropertyMap, key: &NamedPropertyKey) -> Option<u16> {
    map.id_of(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::MemoryStore;
    use crate::diag::CollectingSink;
    use std::str::FromStr;

    #[test]
    fn well_known_sets() {
        assert_eq!(
            PropertySet::Common.guid(),
            GUID::from_str("00062008-0000-0000-C000-000000000046").unwrap()
        );
        assert_eq!(
            PropertySet::Meeting.guid(),
            GUID::from_str("6ED8DA90-450B-101B-98DA-00AA003F1305").unwrap()
        );
        assert_eq!(
            PropertySet::Messaging.guid(),
            GUID::from_str("41F28F13-83F4-4114-A584-EEDB5A6B0BFF").unwrap()
        );
        assert_eq!(
            PropertySet::Attachment.guid(),
            GUID::from_str("96357F7F-59E1-47D0-99A7-46515C183B54").unwrap()
        );
        for set in PropertySet::ALL {
            assert_eq!(PropertySet::from_guid(&set.guid()), Some(set));
        }
    }

    #[test]
    fn resolve_keys() {
        let map = NamedPropertyMap::from_entries([
            (NamedPropertyKey::numeric(PropertySet::Common, 0x8045), 0x8003),
            (NamedPropertyKey::string(PropertySet::PublicStrings, "Keywords"), 0x8004),
        ]);
        assert_eq!(
            resolve(&map, &NamedPropertyKey::numeric(PropertySet::Common, 0x8045)),
            Some(0x8003)
        );
        assert_eq!(
            resolve(
                &map,
                &NamedPropertyKey::string(PropertySet::PublicStrings, "Keywords")
            ),
            Some(0x8004)
        );
        assert_eq!(
            resolve(&map, &NamedPropertyKey::numeric(PropertySet::Task, 0x8045)),
            None
        );
        assert_eq!(
            map.key_of(0x8003).unwrap().to_string(),
            "PSETID_Common:0x8045"
        );
    }

    #[test]
    fn parse_streams() {
        let task = PropertySet::Task.guid().to_le_bytes();
        let mut strings = Vec::new();
        strings.extend_from_slice(&10u32.to_le_bytes());
        for c in "hello".encode_utf16() {
            strings.extend_from_slice(&c.to_le_bytes());
        }
        let mut entries = Vec::new();
        // Numeric, PS_MAPI, index 0
        entries.extend_from_slice(&0x0001u32.to_le_bytes());
        entries.extend_from_slice(&(1u32 << 1).to_le_bytes());
        // Numeric, first stream GUID, index 1
        entries.extend_from_slice(&0x8101u32.to_le_bytes());
        entries.extend_from_slice(&((1u32 << 16) | (3 << 1)).to_le_bytes());
        // String, PS_PUBLIC_STRINGS, index 2
        entries.extend_from_slice(&0u32.to_le_bytes());
        entries.extend_from_slice(&((2u32 << 16) | (2 << 1) | 1).to_le_bytes());
        // GUID index out of range
        entries.extend_from_slice(&0x1234u32.to_le_bytes());
        entries.extend_from_slice(&((3u32 << 16) | (9 << 1)).to_le_bytes());

        let store: MemoryStore = [
            ("__nameid_version1.0/__substg1.0_00020102", task.to_vec()),
            ("__nameid_version1.0/__substg1.0_00030102", entries),
            ("__nameid_version1.0/__substg1.0_00040102", strings),
        ]
        .into_iter()
        .collect();
        let sink = CollectingSink::new();
        let map = NamedPropertyMap::from_container(&store, &sink).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(
            map.id_of(&NamedPropertyKey::numeric(PropertySet::Mapi, 1)),
            Some(0x8000)
        );
        assert_eq!(
            map.id_of(&NamedPropertyKey::numeric(PropertySet::Task, 0x8101)),
            Some(0x8001)
        );
        assert_eq!(
            map.id_of(&NamedPropertyKey::string(PropertySet::PublicStrings, "hello")),
            Some(0x8002)
        );
        assert_eq!(
            sink.count(|d| matches!(d, Diagnostic::BadNamedPropertyEntry { index: 3, .. })),
            1
        );
    }

    #[test]
    fn missing_storage() {
        let sink = CollectingSink::new();
        let map = NamedPropertyMap::from_container(&MemoryStore::new(), &sink).unwrap();
        assert!(map.is_empty());
        assert!(sink.diagnostics().is_empty());
    }
}

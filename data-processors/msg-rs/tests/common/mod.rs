#![allow(dead_code)]
//! Synthesizes message storages in a `MemoryStore`
use msg_rs::named::{NAMEID_STORAGE, PropertySet};
use msg_rs::*;

pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub fn utf16(s: &str) -> Vec<u8> {
    let mut ret: Vec<u8> = s.encode_utf16().flat_map(|c| c.to_le_bytes()).collect();
    ret.extend_from_slice(&[0, 0]);
    ret
}

pub fn description(id: u16, ptype: u16, flags: u32, value: [u8; 8]) -> [u8; 16] {
    let mut ret = [0u8; 16];
    ret[0..2].copy_from_slice(&ptype.to_le_bytes());
    ret[2..4].copy_from_slice(&id.to_le_bytes());
    ret[4..8].copy_from_slice(&flags.to_le_bytes());
    ret[8..16].copy_from_slice(&value);
    ret
}

fn length_value(len: usize) -> [u8; 8] {
    let mut ret = [0u8; 8];
    ret[0..4].copy_from_slice(&(len as u32).to_le_bytes());
    ret
}

/// The property stream and content streams of one object
pub struct ObjectBuilder {
    header_len: usize,
    recipients: u32,
    attachments: u32,
    records: Vec<[u8; 16]>,
    streams: Vec<(String, Vec<u8>)>,
}

impl ObjectBuilder {
    pub fn message() -> Self {
        Self::with_header(32)
    }

    pub fn embedded() -> Self {
        Self::with_header(24)
    }

    pub fn child() -> Self {
        Self::with_header(8)
    }

    fn with_header(header_len: usize) -> Self {
        Self {
            header_len,
            recipients: 0,
            attachments: 0,
            records: Vec::new(),
            streams: Vec::new(),
        }
    }

    pub fn counts(mut self, recipients: u32, attachments: u32) -> Self {
        self.recipients = recipients;
        self.attachments = attachments;
        self
    }

    pub fn raw(mut self, record: [u8; 16]) -> Self {
        self.records.push(record);
        self
    }

    pub fn fixed(self, id: u16, ptype: u16, value: [u8; 8]) -> Self {
        self.raw(description(id, ptype, 6, value))
    }

    pub fn int(self, id: u16, v: i32) -> Self {
        let mut value = [0u8; 8];
        value[0..4].copy_from_slice(&v.to_le_bytes());
        self.fixed(id, 0x0003, value)
    }

    pub fn bool(self, id: u16, v: bool) -> Self {
        self.fixed(id, 0x000b, [v as u8, 0, 0, 0, 0, 0, 0, 0])
    }

    pub fn time(self, id: u16, filetime: u64) -> Self {
        self.fixed(id, 0x0040, filetime.to_le_bytes())
    }

    pub fn variable(mut self, id: u16, ptype: u16, data: Vec<u8>) -> Self {
        self.records
            .push(description(id, ptype, 6, length_value(data.len())));
        self.streams
            .push((format!("__substg1.0_{id:04X}{ptype:04X}"), data));
        self
    }

    pub fn unicode(self, id: u16, s: &str) -> Self {
        self.variable(id, 0x001f, utf16(s))
    }

    pub fn string8(self, id: u16, data: &[u8]) -> Self {
        let mut data = data.to_vec();
        data.push(0);
        self.variable(id, 0x001e, data)
    }

    pub fn binary(self, id: u16, data: &[u8]) -> Self {
        self.variable(id, 0x0102, data.to_vec())
    }

    /// A content stream without a property description
    pub fn stream(mut self, name: &str, data: Vec<u8>) -> Self {
        self.streams.push((name.to_string(), data));
        self
    }

    pub fn write(self, store: &mut MemoryStore, storage: &str) {
        let mut stream = vec![0u8; self.header_len];
        if self.header_len >= 24 {
            stream[8..12].copy_from_slice(&self.recipients.to_le_bytes());
            stream[12..16].copy_from_slice(&self.attachments.to_le_bytes());
            stream[16..20].copy_from_slice(&self.recipients.to_le_bytes());
            stream[20..24].copy_from_slice(&self.attachments.to_le_bytes());
        }
        for record in self.records {
            stream.extend_from_slice(&record);
        }
        store.insert(format!("{storage}__properties_version1.0"), stream);
        for (name, data) in self.streams {
            store.insert(format!("{storage}{name}"), data);
        }
    }
}

pub fn recipient_storage(storage: &str, id: u32) -> String {
    format!("{storage}__recip_version1.0_#{id:08X}/")
}

pub fn attachment_storage(storage: &str, id: u32) -> String {
    format!("{storage}__attach_version1.0_#{id:08X}/")
}

pub fn embedded_storage(storage: &str, id: u32) -> String {
    format!("{}__substg1.0_3701000D/", attachment_storage(storage, id))
}

/// Writes a named property map with the given numeric properties, in order,
/// which get IDs 0x8000, 0x8001, ...
pub fn write_named_map(store: &mut MemoryStore, props: &[(PropertySet, u32)]) {
    let mut guids: Vec<PropertySet> = Vec::new();
    let mut entries = Vec::new();
    for (index, (set, lid)) in props.iter().enumerate() {
        let guid_index = match set {
            PropertySet::Mapi => 1,
            PropertySet::PublicStrings => 2,
            set => {
                let pos = guids.iter().position(|g| g == set).unwrap_or_else(|| {
                    guids.push(*set);
                    guids.len() - 1
                });
                pos as u32 + 3
            }
        };
        entries.extend_from_slice(&lid.to_le_bytes());
        let info = ((index as u32) << 16) | (guid_index << 1);
        entries.extend_from_slice(&info.to_le_bytes());
    }
    let guid_stream: Vec<u8> = guids
        .iter()
        .flat_map(|set| set.guid().to_le_bytes())
        .collect();
    store.insert(format!("{NAMEID_STORAGE}__substg1.0_00020102"), guid_stream);
    store.insert(format!("{NAMEID_STORAGE}__substg1.0_00030102"), entries);
    store.insert(format!("{NAMEID_STORAGE}__substg1.0_00040102"), Vec::new());
}

/// FILETIME of 2024-01-01 09:30 UTC
pub const JAN_1_2024_0930: u64 = 133_485_750_000_000_000;
/// FILETIME of 2024-01-01 10:30 UTC
pub const JAN_1_2024_1030: u64 = JAN_1_2024_0930 + 36_000_000_000;

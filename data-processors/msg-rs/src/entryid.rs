//! Entry ID structures
//!
//! An entry ID ([MS-OXCDATA] 2.2) starts with 4 flag bytes followed by the
//! 16 byte UID of the provider which issued it; the UID identifies how the
//! rest of the bytes are laid out
use crate::error::ClassificationError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
/// A known entry ID structure
pub enum EntryIdKind {
    /// Address book EntryID
    AddressBookRecipient,
    /// Contact address or personal distribution list recipient
    CaOrPdlRecipient,
    /// NNTP newsgroup folder
    NntpNewsgroupFolder,
    /// One-off EntryID
    OneOffRecipient,
    /// Permanent EntryID (shares its UID with [`AddressBookRecipient`](Self::AddressBookRecipient))
    Permanent,
    /// Public message store
    PublicMessageStore,
    /// Wrapped store EntryID
    Wrapped,
}

impl EntryIdKind {
    /// Every kind, in declaration order
    pub const ALL: [EntryIdKind; 7] = [
        Self::AddressBookRecipient,
        Self::CaOrPdlRecipient,
        Self::NntpNewsgroupFolder,
        Self::OneOffRecipient,
        Self::Permanent,
        Self::PublicMessageStore,
        Self::Wrapped,
    ];

    /// The provider UID bytes identifying the structure
    pub const fn signature(&self) -> [u8; 16] {
        match self {
            Self::AddressBookRecipient | Self::Permanent => [
                0xdc, 0xa7, 0x40, 0xc8, 0xc0, 0x42, 0x10, 0x1a, 0xb4, 0xb9, 0x08, 0x00, 0x2b, 0x2f,
                0xe1, 0x82,
            ],
            Self::CaOrPdlRecipient => [
                0xfe, 0x42, 0xaa, 0x0a, 0x18, 0xc7, 0x1a, 0x10, 0xe8, 0x85, 0x0b, 0x65, 0x1c, 0x24,
                0x00, 0x00,
            ],
            Self::NntpNewsgroupFolder => [
                0x38, 0xa1, 0xbb, 0x10, 0x05, 0xe5, 0x10, 0x1a, 0xa1, 0xbb, 0x08, 0x00, 0x2b, 0x2a,
                0x56, 0xc2,
            ],
            Self::OneOffRecipient => [
                0x81, 0x2b, 0x1f, 0xa4, 0xbe, 0xa3, 0x10, 0x19, 0x9d, 0x6e, 0x00, 0xdd, 0x01, 0x0f,
                0x54, 0x02,
            ],
            Self::PublicMessageStore => [
                0x1a, 0x44, 0x73, 0x90, 0xaa, 0x66, 0x11, 0xcd, 0x9b, 0xc8, 0x00, 0xaa, 0x00, 0x2f,
                0xc4, 0x5a,
            ],
            Self::Wrapped => [
                0xc0, 0x91, 0xad, 0xd3, 0x51, 0x9d, 0xcf, 0x11, 0xa4, 0xa9, 0x00, 0xaa, 0x00, 0x47,
                0xfa, 0xa4,
            ],
        }
    }

    /// The signature as 32 uppercase hex digits
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.signature())
    }

    /// The kind with the hex signature `s` (case insensitive)
    pub fn from_hex(s: &str) -> Result<Self, ClassificationError> {
        let invalid = || ClassificationError::InvalidHex(s.to_string());
        if s.len() != 32 {
            return Err(invalid());
        }
        let bytes = hex::decode(s).map_err(|_| invalid())?;
        Self::from_bytes(&bytes)
    }

    /// Classify the structure whose UID makes up the leading 16 bytes of `bytes`
    ///
    /// When several kinds share a UID the first declared one is returned
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ClassificationError> {
        let uid = bytes
            .get(..16)
            .ok_or(ClassificationError::TooShort(bytes.len()))?;
        Self::ALL
            .into_iter()
            .find(|k| k.signature() == uid)
            .ok_or_else(|| ClassificationError::UnknownSignature(hex::encode_upper(uid)))
    }

    /// Alias of [`from_bytes`](Self::from_bytes)
    pub fn classify(bytes: &[u8]) -> Result<Self, ClassificationError> {
        Self::from_bytes(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A parsed entry ID
pub struct EntryId {
    /// The 4 flag bytes
    pub flags: [u8; 4],
    /// The provider UID
    pub provider_uid: [u8; 16],
    /// The structure identified by the provider UID, if known
    pub kind: Option<EntryIdKind>,
    /// The provider specific data following the UID
    pub data: Vec<u8>,
}

impl EntryId {
    /// Split an entry ID into its parts
    ///
    /// Fails only if `bytes` is too short to hold the flags and the UID; an
    /// unknown UID leaves [`kind`](Self::kind) unset
    pub fn parse(bytes: &[u8]) -> Result<Self, ClassificationError> {
        if bytes.len() < 20 {
            return Err(ClassificationError::TooShort(bytes.len()));
        }
        let mut flags = [0u8; 4];
        flags.copy_from_slice(&bytes[0..4]);
        let mut provider_uid = [0u8; 16];
        provider_uid.copy_from_slice(&bytes[4..20]);
        Ok(Self {
            flags,
            provider_uid,
            kind: EntryIdKind::from_bytes(&provider_uid).ok(),
            data: bytes[20..].to_vec(),
        })
    }

    /// The provider UID in hex
    pub fn provider_hex(&self) -> String {
        hex::encode_upper(self.provider_uid)
    }
}

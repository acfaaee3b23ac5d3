//! Win32 structs and fns
#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};
use std::fmt::{self, Debug, Display};
use std::str::FromStr;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

/// A Win32 GUID
///
/// The on-disk layout is mixed endian: `data1`, `data2` and `data3` are
/// stored little endian, `data4` is a plain byte array
#[derive(PartialEq, Eq, Hash, Clone, Copy)]
pub struct GUID {
    data1: u32,
    data2: u16,
    data3: u16,
    data4: [u8; 8],
}

impl GUID {
    /// Create a GUID from its components, as written in the textual form
    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    /// Create a null (all zeroes) GUID
    pub const fn null() -> Self {
        Self::new(0, 0, 0, [0u8; 8])
    }

    /// Create a GUID from exactly 16 raw bytes
    pub const fn from_le_array(b: [u8; 16]) -> Self {
        Self {
            data1: u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            data2: u16::from_le_bytes([b[4], b[5]]),
            data3: u16::from_le_bytes([b[6], b[7]]),
            data4: [b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15]],
        }
    }

    /// Create a GUID from 16 raw bytes
    ///
    /// Returns `None` if the slice is not exactly 16 bytes long
    pub fn from_le_bytes(bytes: &[u8]) -> Option<Self> {
        let array: [u8; 16] = bytes.try_into().ok()?;
        Some(Self::from_le_array(array))
    }

    /// Return the raw (on-disk) representation
    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut ret = [0u8; 16];
        ret[0..4].copy_from_slice(&self.data1.to_le_bytes());
        ret[4..6].copy_from_slice(&self.data2.to_le_bytes());
        ret[6..8].copy_from_slice(&self.data3.to_le_bytes());
        ret[8..16].copy_from_slice(&self.data4);
        ret
    }

    /// Check whether the GUID is null
    pub fn is_null(&self) -> bool {
        *self == Self::null()
    }
}

impl Display for GUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1,
            self.data2,
            self.data3,
            self.data4[0],
            self.data4[1],
            self.data4[2],
            self.data4[3],
            self.data4[4],
            self.data4[5],
            self.data4[6],
            self.data4[7]
        )
    }
}

#[cfg(feature = "serde")]
impl Serialize for GUID {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl Debug for GUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self)
    }
}

impl Default for GUID {
    fn default() -> Self {
        Self::null()
    }
}

impl FromStr for GUID {
    type Err = ();

    /// Parses the textual form, with or without the surrounding braces
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .unwrap_or(s)
            .as_bytes();
        if s.len() != 36 {
            return Err(());
        }
        if s[8] != b'-' || s[13] != b'-' || s[18] != b'-' || s[23] != b'-' {
            return Err(());
        }
        let mut data4 = [0u8; 8];
        for (i, pos) in [19usize, 21, 24, 26, 28, 30, 32, 34].into_iter().enumerate() {
            data4[i] = hex_decode_byte(&s[pos..(pos + 2)])?;
        }
        Ok(Self {
            data1: hex_decode_u32(&s[0..8])?,
            data2: hex_decode_u32(&s[9..13])? as u16,
            data3: hex_decode_u32(&s[14..18])? as u16,
            data4,
        })
    }
}

#[inline]
fn hex_decode_nibble(c: u8) -> Result<u8, ()> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        _ => Err(()),
    }
}

#[inline]
fn hex_decode_byte(s: &[u8]) -> Result<u8, ()> {
    if s.len() != 2 {
        return Err(());
    }
    Ok((hex_decode_nibble(s[0])? << 4) | hex_decode_nibble(s[1])?)
}

#[inline]
fn hex_decode_u32(s: &[u8]) -> Result<u32, ()> {
    if s.is_empty() || s.len() > 8 {
        return Err(());
    }
    s.iter()
        .try_fold(0u32, |acc, c| Ok((acc << 4) | u32::from(hex_decode_nibble(*c)?)))
}

/// The FILETIME value of the Unix epoch (1970-01-01 00:00:00 UTC)
pub const FILETIME_UNIX_EPOCH: u64 = 116444736000000000;

/// The origin of FILETIME values
pub const FILETIME_EPOCH: OffsetDateTime = datetime!(1601-01-01 0:00 UTC);

/// The origin of OLE Automation dates (aka *floating time*)
pub const OLE_DATE_EPOCH: OffsetDateTime = datetime!(1899-12-30 0:00 UTC);

/// Translates a windows FILETIME to a [datetime](time::OffsetDateTime)
///
/// Returns None if the date is out of range
pub fn filetime_to_datetime(ftime: u64) -> Option<OffsetDateTime> {
    let ftime = i128::from(ftime);
    let ftime = ftime.checked_sub(i128::from(FILETIME_UNIX_EPOCH))?;
    OffsetDateTime::from_unix_timestamp_nanos(ftime * 100).ok()
}

/// Translates a windows FILETIME to a [datetime](time::OffsetDateTime),
/// accepting values before the Unix epoch
///
/// The result is counted straight from 1601-01-01 and truncated to
/// microseconds. Returns None if the date is out of range
pub fn filetime_to_datetime_lenient(ftime: u64) -> Option<OffsetDateTime> {
    let micros = i64::try_from(ftime / 10).ok()?;
    FILETIME_EPOCH.checked_add(Duration::microseconds(micros))
}

/// Translates an OLE Automation date (fractional days since 1899-12-30)
/// to a [datetime](time::OffsetDateTime)
///
/// Returns None for non finite or out of range values
pub fn oletime_to_datetime(days: f64) -> Option<OffsetDateTime> {
    if !days.is_finite() {
        return None;
    }
    let offset = Duration::checked_seconds_f64(days * 86400.0)?;
    OLE_DATE_EPOCH.checked_add(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_bytes() {
        assert_eq!(hex_decode_byte(b"aC"), Ok(0xac));
        assert_eq!(hex_decode_byte(b"13"), Ok(0x13));
        assert_eq!(hex_decode_byte(b"-A"), Err(()));
        assert_eq!(hex_decode_byte(b"1234"), Err(()));
        assert_eq!(hex_decode_u32(b"00062008"), Ok(0x00062008));
        assert_eq!(hex_decode_u32(b"C000"), Ok(0xc000));
        assert_eq!(hex_decode_u32(b"C00G"), Err(()));
    }

    #[test]
    fn test_guid() {
        assert_eq!(GUID::from_le_array([0u8; 16]), GUID::default());
        let raw = [
            0x53, 0xff, 0x4b, 0x99, 0xf9, 0xdd, 0xad, 0x42, 0xa5, 0x6a, 0xff, 0xea, 0x36, 0x17,
            0xac, 0x16,
        ];
        let guid = GUID::from_le_bytes(&raw).unwrap();
        assert_eq!(
            guid,
            GUID::new(
                0x994bff53,
                0xddf9,
                0x42ad,
                [0xa5, 0x6a, 0xff, 0xea, 0x36, 0x17, 0xac, 0x16]
            )
        );
        assert_eq!(guid.to_le_bytes(), raw);
        assert_eq!(guid.to_string(), "994bff53-ddf9-42ad-a56a-ffea3617ac16");
        assert_eq!(format!("{:?}", guid), "{994bff53-ddf9-42ad-a56a-ffea3617ac16}");
        assert!(!guid.is_null());
        assert_eq!(
            GUID::from_str("994BFF53-ddf9-42AD-a56a-FFEA3617AC16").unwrap(),
            guid
        );
        assert_eq!(
            GUID::from_str("{994BFF53-ddf9-42AD-a56a-FFEA3617AC16}").unwrap(),
            guid
        );
        assert_eq!(GUID::from_le_bytes(&[1, 2, 3, 4]), None);
        assert_eq!(GUID::from_le_bytes(&[0u8; 17]), None);
        assert_eq!(
            GUID::from_str("00000000-0000-0000-0000-00000000000"),
            Err(())
        );
        assert_eq!(
            GUID::from_str("00000000_0000-0000-0000-000000000000"),
            Err(())
        );
        assert_eq!(
            GUID::from_str("{00000000-0000-0000-0000-000000000000"),
            Err(())
        );
    }

    #[test]
    fn test_filetime_to_datetime() {
        assert_eq!(
            filetime_to_datetime(0x01BAB44B12F98800).unwrap(),
            datetime!(1995-11-16 17:43:44 UTC)
        );
        assert_eq!(filetime_to_datetime(FILETIME_UNIX_EPOCH - 1), None);
        assert_eq!(filetime_to_datetime(u64::MAX), None);
    }

    #[test]
    fn test_filetime_to_datetime_lenient() {
        assert_eq!(filetime_to_datetime_lenient(0), Some(FILETIME_EPOCH));
        assert_eq!(
            filetime_to_datetime_lenient(FILETIME_UNIX_EPOCH),
            Some(OffsetDateTime::UNIX_EPOCH)
        );
        // 1900-01-01
        assert_eq!(
            filetime_to_datetime_lenient(94354848000000000),
            Some(datetime!(1900-01-01 0:00 UTC))
        );
    }

    #[test]
    fn test_oletime_to_datetime() {
        assert_eq!(oletime_to_datetime(0.0), Some(OLE_DATE_EPOCH));
        assert_eq!(
            oletime_to_datetime(2.25),
            Some(datetime!(1900-01-01 6:00 UTC))
        );
        assert_eq!(oletime_to_datetime(f64::NAN), None);
        assert_eq!(oletime_to_datetime(1e300), None);
    }
}

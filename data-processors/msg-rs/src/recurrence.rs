//! Appointment recurrence patterns ([MS-OXOCAL] 2.2.1.44.1)
use crate::error::PropertyError;
use bitflags::bitflags;
use byteorder::{LE, ReadBytesExt};
use ctxutils::win32::FILETIME_EPOCH;
use serde::{Serialize, Serializer};
use std::io;
use time::{Duration, OffsetDateTime};

/// The text used when a message has no recurrence
pub const NO_RECURRENCE: &str = "(none)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// How often the pattern repeats
pub enum RecurFrequency {
    /// Daily
    Daily,
    /// Weekly
    Weekly,
    /// Monthly
    Monthly,
    /// Yearly
    Yearly,
}

impl RecurFrequency {
    fn from_u16(v: u16) -> Option<Self> {
        Some(match v {
            0x200a => Self::Daily,
            0x200b => Self::Weekly,
            0x200c => Self::Monthly,
            0x200d => Self::Yearly,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// The kind of pattern
pub enum RecurPatternType {
    /// Every N days
    Day,
    /// Every N weeks on some days
    Week,
    /// Every N months on a day of the month
    Month,
    /// Every N months on the Nth weekday
    MonthNth,
    /// Every N months on the last day
    MonthEnd,
    /// Hijri calendar monthly
    HjMonth,
    /// Hijri calendar Nth weekday
    HjMonthNth,
    /// Hijri calendar last day
    HjMonthEnd,
}

impl RecurPatternType {
    /// Look up a wire value
    pub fn from_u16(v: u16) -> Option<Self> {
        Some(match v {
            0x0000 => Self::Day,
            0x0001 => Self::Week,
            0x0002 => Self::Month,
            0x0003 => Self::MonthNth,
            0x0004 => Self::MonthEnd,
            0x000a => Self::HjMonth,
            0x000b => Self::HjMonthNth,
            0x000c => Self::HjMonthEnd,
            _ => return None,
        })
    }

    /// The wire value
    pub const fn code(&self) -> u16 {
        match self {
            Self::Day => 0x0000,
            Self::Week => 0x0001,
            Self::Month => 0x0002,
            Self::MonthNth => 0x0003,
            Self::MonthEnd => 0x0004,
            Self::HjMonth => 0x000a,
            Self::HjMonthNth => 0x000b,
            Self::HjMonthEnd => 0x000c,
        }
    }

    /// Short description of the pattern
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Day => "Daily",
            Self::Week => "Weekly",
            _ => "Monthly",
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Days of the week
    pub struct DaysOfWeek : u32 {
        /// Sunday
        const Sunday = 1;
        /// Monday
        const Monday = 1 << 1;
        /// Tuesday
        const Tuesday = 1 << 2;
        /// Wednesday
        const Wednesday = 1 << 3;
        /// Thursday
        const Thursday = 1 << 4;
        /// Friday
        const Friday = 1 << 5;
        /// Saturday
        const Saturday = 1 << 6;
    }
}

impl Serialize for DaysOfWeek {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let v: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        v.serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// The part of the pattern which depends on its type
pub enum PatternSpecific {
    /// Daily patterns have no specific data
    None,
    /// Weekly: the days of the week
    Week(DaysOfWeek),
    /// Monthly: the day of the month
    Day(u32),
    /// Monthly Nth: the days and which occurrence in the month (5 = last)
    MonthNth {
        /// Days of the week
        days: DaysOfWeek,
        /// Occurrence in the month
        n: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// When the recurrence ends
pub enum EndType {
    /// On the end date
    EndAfterDate,
    /// After a number of occurrences
    EndAfterOccurrences,
    /// Never
    NeverEnd,
    /// Unknown value
    Other(u32),
}

impl From<u32> for EndType {
    fn from(v: u32) -> Self {
        match v {
            0x2021 => Self::EndAfterDate,
            0x2022 => Self::EndAfterOccurrences,
            0x2023 | 0xffffffff => Self::NeverEnd,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A parsed recurrence pattern
pub struct RecurrencePattern {
    /// Reader version (0x3004)
    pub reader_version: u16,
    /// Writer version (0x3004)
    pub writer_version: u16,
    /// Frequency
    pub frequency: RecurFrequency,
    /// Pattern type
    pub pattern_type: RecurPatternType,
    /// Calendar type
    pub calendar_type: u16,
    /// First occurrence offset
    pub first_date_time: u32,
    /// Interval between occurrences
    pub period: u32,
    /// Whether the pattern is a task regeneration pattern
    pub sliding_flag: u32,
    /// Type specific data
    pub pattern_specific: PatternSpecific,
    /// End type
    pub end_type: EndType,
    /// Number of occurrences
    pub occurrence_count: u32,
    /// First day of the week
    pub first_dow: u32,
    /// Deleted instances, in minutes since 1601
    pub deleted_instance_dates: Vec<u32>,
    /// Modified instances, in minutes since 1601
    pub modified_instance_dates: Vec<u32>,
    /// Start of the recurrence, in minutes since 1601
    pub start_date: u32,
    /// End of the recurrence, in minutes since 1601
    pub end_date: u32,
}

fn read_dates<R: io::Read>(r: &mut R) -> Result<Vec<u32>, io::Error> {
    let count = r.read_u32::<LE>()?;
    let mut ret = Vec::with_capacity(count.min(1024) as usize);
    for _ in 0..count {
        ret.push(r.read_u32::<LE>()?);
    }
    Ok(ret)
}

/// Converts a count of minutes since 1601 to a date
pub fn minutes_to_datetime(minutes: u32) -> Option<OffsetDateTime> {
    FILETIME_EPOCH.checked_add(Duration::minutes(minutes.into()))
}

impl RecurrencePattern {
    /// Parses a pattern
    pub fn parse(data: &[u8]) -> Result<Self, PropertyError> {
        let mut r = data;
        Self::read(&mut r).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                PropertyError::malformed(None, "truncated recurrence pattern")
            }
            _ => PropertyError::malformed(None, e.to_string()),
        })
    }

    fn read<R: io::Read>(r: &mut R) -> Result<Self, io::Error> {
        let invalid = |what: &str, v: u32| {
            io::Error::new(io::ErrorKind::InvalidData, format!("invalid {what} {v:#x}"))
        };
        let reader_version = r.read_u16::<LE>()?;
        let writer_version = r.read_u16::<LE>()?;
        let frequency = r.read_u16::<LE>()?;
        let frequency =
            RecurFrequency::from_u16(frequency).ok_or_else(|| invalid("frequency", frequency.into()))?;
        let pattern_type = r.read_u16::<LE>()?;
        let pattern_type = RecurPatternType::from_u16(pattern_type)
            .ok_or_else(|| invalid("pattern type", pattern_type.into()))?;
        let calendar_type = r.read_u16::<LE>()?;
        let first_date_time = r.read_u32::<LE>()?;
        let period = r.read_u32::<LE>()?;
        let sliding_flag = r.read_u32::<LE>()?;
        let pattern_specific = match pattern_type {
            RecurPatternType::Day => PatternSpecific::None,
            RecurPatternType::Week => {
                PatternSpecific::Week(DaysOfWeek::from_bits_retain(r.read_u32::<LE>()?))
            }
            RecurPatternType::Month
            | RecurPatternType::MonthEnd
            | RecurPatternType::HjMonth
            | RecurPatternType::HjMonthEnd => PatternSpecific::Day(r.read_u32::<LE>()?),
            RecurPatternType::MonthNth | RecurPatternType::HjMonthNth => {
                let days = DaysOfWeek::from_bits_retain(r.read_u32::<LE>()?);
                let n = r.read_u32::<LE>()?;
                PatternSpecific::MonthNth { days, n }
            }
        };
        let end_type = EndType::from(r.read_u32::<LE>()?);
        let occurrence_count = r.read_u32::<LE>()?;
        let first_dow = r.read_u32::<LE>()?;
        let deleted_instance_dates = read_dates(r)?;
        let modified_instance_dates = read_dates(r)?;
        let start_date = r.read_u32::<LE>()?;
        let end_date = r.read_u32::<LE>()?;
        Ok(Self {
            reader_version,
            writer_version,
            frequency,
            pattern_type,
            calendar_type,
            first_date_time,
            period,
            sliding_flag,
            pattern_specific,
            end_type,
            occurrence_count,
            first_dow,
            deleted_instance_dates,
            modified_instance_dates,
            start_date,
            end_date,
        })
    }

    /// Short description of the pattern
    pub fn description(&self) -> &'static str {
        self.pattern_type.description()
    }

    /// The start of the recurrence
    pub fn start(&self) -> Option<OffsetDateTime> {
        minutes_to_datetime(self.start_date)
    }

    /// The end of the recurrence
    pub fn end(&self) -> Option<OffsetDateTime> {
        minutes_to_datetime(self.end_date)
    }
}

/// The description of an optional pattern
pub fn describe(pattern: Option<&RecurrencePattern>) -> &'static str {
    pattern.map(|p| p.description()).unwrap_or(NO_RECURRENCE)
}

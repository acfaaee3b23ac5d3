//! Property tags and well known property identifiers
//!
//! Standard property IDs are below `0x8000`; named property IDs (see
//! [`named`](crate::named)) are given by their *long ID* inside their
//! property set
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
/// A property tag: the property ID in the high word, the type code in the low
///
/// Displayed as 8 uppercase hex digits, which is also the suffix of the
/// content stream name (`__substg1.0_0037001F`)
pub struct PropertyTag(pub u32);

impl PropertyTag {
    /// Create a tag from a property ID and a type code
    pub const fn new(id: u16, ptype: u16) -> Self {
        Self(((id as u32) << 16) | ptype as u32)
    }

    /// Create a tag from the first 4 raw bytes of a property description
    /// (little endian type code followed by little endian property ID)
    pub fn from_raw(raw: [u8; 4]) -> Self {
        Self::new(
            u16::from_le_bytes([raw[2], raw[3]]),
            u16::from_le_bytes([raw[0], raw[1]]),
        )
    }

    /// The property ID
    pub const fn id(&self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// The property type code
    pub const fn ptype(&self) -> u16 {
        (self.0 & 0xffff) as u16
    }

    /// Whether the ID lies in the named property range
    pub const fn is_named(&self) -> bool {
        self.id() >= 0x8000
    }

    /// The name of the stream holding the content of this property
    pub fn stream_name(&self) -> String {
        format!("__substg1.0_{self}")
    }

    /// The tag of the content stream name `name`, if it is one
    ///
    /// The per element streams of multi valued properties
    /// (`__substg1.0_XXXXXXXX-NNNNNNNN`) are reported with their index
    pub fn from_stream_name(name: &str) -> Option<(Self, Option<u32>)> {
        let suffix = name.strip_prefix("__substg1.0_")?;
        let (tag, index) = match suffix.split_once('-') {
            Some((tag, index)) if index.len() == 8 => {
                (tag, Some(u32::from_str_radix(index, 16).ok()?))
            }
            Some(_) => return None,
            None => (suffix, None),
        };
        Some((tag.parse().ok()?, index))
    }

    /// A human readable name for standard properties
    pub fn name(&self) -> Option<&'static str> {
        tag_name(self.id())
    }
}

impl fmt::Display for PropertyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl FromStr for PropertyTag {
    type Err = ();

    /// Parses exactly 8 hex digits
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(());
        }
        u32::from_str_radix(s, 16).map(Self).map_err(|_| ())
    }
}

// Message envelope
/// PidTagImportance
pub const PID_TAG_IMPORTANCE: u16 = 0x0017;
/// PidTagMessageClass
pub const PID_TAG_MESSAGE_CLASS: u16 = 0x001a;
/// PidTagPriority
pub const PID_TAG_PRIORITY: u16 = 0x0026;
/// PidTagSensitivity
pub const PID_TAG_SENSITIVITY: u16 = 0x0036;
/// PidTagSubject
pub const PID_TAG_SUBJECT: u16 = 0x0037;
/// PidTagClientSubmitTime
pub const PID_TAG_CLIENT_SUBMIT_TIME: u16 = 0x0039;
/// PidTagSentRepresentingName
pub const PID_TAG_SENT_REPRESENTING_NAME: u16 = 0x0042;
/// PidTagSentRepresentingEmailAddress
pub const PID_TAG_SENT_REPRESENTING_EMAIL_ADDRESS: u16 = 0x0065;
/// PidTagTransportMessageHeaders
pub const PID_TAG_TRANSPORT_MESSAGE_HEADERS: u16 = 0x007d;
/// PidTagSenderName
pub const PID_TAG_SENDER_NAME: u16 = 0x0c1a;
/// PidTagSenderEmailAddress
pub const PID_TAG_SENDER_EMAIL_ADDRESS: u16 = 0x0c1f;
/// PidTagDisplayBcc
pub const PID_TAG_DISPLAY_BCC: u16 = 0x0e02;
/// PidTagDisplayCc
pub const PID_TAG_DISPLAY_CC: u16 = 0x0e03;
/// PidTagDisplayTo
pub const PID_TAG_DISPLAY_TO: u16 = 0x0e04;
/// PidTagMessageDeliveryTime
pub const PID_TAG_MESSAGE_DELIVERY_TIME: u16 = 0x0e06;
/// PidTagMessageFlags
pub const PID_TAG_MESSAGE_FLAGS: u16 = 0x0e07;
/// PidTagNormalizedSubject
pub const PID_TAG_NORMALIZED_SUBJECT: u16 = 0x0e1d;
/// PidTagEntryId
pub const PID_TAG_ENTRY_ID: u16 = 0x0fff;
/// PidTagBody
pub const PID_TAG_BODY: u16 = 0x1000;
/// PidTagRtfCompressed
pub const PID_TAG_RTF_COMPRESSED: u16 = 0x1009;
/// PidTagHtml
pub const PID_TAG_HTML: u16 = 0x1013;
/// PidTagInternetMessageId
pub const PID_TAG_INTERNET_MESSAGE_ID: u16 = 0x1035;
/// PidTagCreationTime
pub const PID_TAG_CREATION_TIME: u16 = 0x3007;
/// PidTagLastModificationTime
pub const PID_TAG_LAST_MODIFICATION_TIME: u16 = 0x3008;
/// PidTagInternetCodepage
pub const PID_TAG_INTERNET_CODEPAGE: u16 = 0x3fde;
/// PidTagMessageCodepage
pub const PID_TAG_MESSAGE_CODEPAGE: u16 = 0x3ffd;
/// PidTagSenderSmtpAddress
pub const PID_TAG_SENDER_SMTP_ADDRESS: u16 = 0x5d01;
/// PidTagSentRepresentingSmtpAddress
pub const PID_TAG_SENT_REPRESENTING_SMTP_ADDRESS: u16 = 0x5d02;

// Recipients
/// PidTagRecipientType
pub const PID_TAG_RECIPIENT_TYPE: u16 = 0x0c15;
/// PidTagDisplayName
pub const PID_TAG_DISPLAY_NAME: u16 = 0x3001;
/// PidTagAddressType
pub const PID_TAG_ADDRESS_TYPE: u16 = 0x3002;
/// PidTagEmailAddress
pub const PID_TAG_EMAIL_ADDRESS: u16 = 0x3003;
/// PidTagSmtpAddress
pub const PID_TAG_SMTP_ADDRESS: u16 = 0x39fe;
/// PidTagTransmittableDisplayName
pub const PID_TAG_TRANSMITTABLE_DISPLAY_NAME: u16 = 0x3a20;
/// PidTagRecipientDisplayName
pub const PID_TAG_RECIPIENT_DISPLAY_NAME: u16 = 0x5ff6;

// Attachments
/// PidTagAttachSize
pub const PID_TAG_ATTACH_SIZE: u16 = 0x0e20;
/// PidTagAttachDataBinary / PidTagAttachDataObject
pub const PID_TAG_ATTACH_DATA: u16 = 0x3701;
/// PidTagAttachFilename
pub const PID_TAG_ATTACH_FILENAME: u16 = 0x3704;
/// PidTagAttachMethod
pub const PID_TAG_ATTACH_METHOD: u16 = 0x3705;
/// PidTagAttachLongFilename
pub const PID_TAG_ATTACH_LONG_FILENAME: u16 = 0x3707;
/// PidTagAttachPathname
pub const PID_TAG_ATTACH_PATHNAME: u16 = 0x3708;
/// PidTagAttachLongPathname
pub const PID_TAG_ATTACH_LONG_PATHNAME: u16 = 0x370d;
/// PidTagAttachMimeTag
pub const PID_TAG_ATTACH_MIME_TAG: u16 = 0x370e;
/// PidTagAttachContentId
pub const PID_TAG_ATTACH_CONTENT_ID: u16 = 0x3712;
/// PidTagAttachmentHidden
pub const PID_TAG_ATTACHMENT_HIDDEN: u16 = 0x7ffe;

// Contacts
/// PidTagGeneration
pub const PID_TAG_GENERATION: u16 = 0x3a05;
/// PidTagGivenName
pub const PID_TAG_GIVEN_NAME: u16 = 0x3a06;
/// PidTagBusinessTelephoneNumber
pub const PID_TAG_BUSINESS_TELEPHONE_NUMBER: u16 = 0x3a08;
/// PidTagHomeTelephoneNumber
pub const PID_TAG_HOME_TELEPHONE_NUMBER: u16 = 0x3a09;
/// PidTagSurname
pub const PID_TAG_SURNAME: u16 = 0x3a11;
/// PidTagCompanyName
pub const PID_TAG_COMPANY_NAME: u16 = 0x3a16;
/// PidTagTitle
pub const PID_TAG_TITLE: u16 = 0x3a17;
/// PidTagDepartmentName
pub const PID_TAG_DEPARTMENT_NAME: u16 = 0x3a18;
/// PidTagMobileTelephoneNumber
pub const PID_TAG_MOBILE_TELEPHONE_NUMBER: u16 = 0x3a1c;
/// PidTagBirthday
pub const PID_TAG_BIRTHDAY: u16 = 0x3a42;
/// PidTagMiddleName
pub const PID_TAG_MIDDLE_NAME: u16 = 0x3a44;
/// PidTagDisplayNamePrefix
pub const PID_TAG_DISPLAY_NAME_PREFIX: u16 = 0x3a45;
/// PidTagGender
pub const PID_TAG_GENDER: u16 = 0x3a4d;
/// PidTagNickname
pub const PID_TAG_NICKNAME: u16 = 0x3a4f;

// Named properties (long IDs)
/// PidLidFileUnder (PSETID_Address)
pub const PID_LID_FILE_UNDER: u32 = 0x8005;
/// PidLidEmail1DisplayName (PSETID_Address)
pub const PID_LID_EMAIL1_DISPLAY_NAME: u32 = 0x8080;
/// PidLidEmail1EmailAddress (PSETID_Address)
pub const PID_LID_EMAIL1_EMAIL_ADDRESS: u32 = 0x8083;
/// PidLidEmail2EmailAddress (PSETID_Address)
pub const PID_LID_EMAIL2_EMAIL_ADDRESS: u32 = 0x8093;
/// PidLidEmail3EmailAddress (PSETID_Address)
pub const PID_LID_EMAIL3_EMAIL_ADDRESS: u32 = 0x80a3;
/// PidLidTaskStatus (PSETID_Task)
pub const PID_LID_TASK_STATUS: u32 = 0x8101;
/// PidLidPercentComplete (PSETID_Task)
pub const PID_LID_PERCENT_COMPLETE: u32 = 0x8102;
/// PidLidTaskStartDate (PSETID_Task)
pub const PID_LID_TASK_START_DATE: u32 = 0x8104;
/// PidLidTaskDueDate (PSETID_Task)
pub const PID_LID_TASK_DUE_DATE: u32 = 0x8105;
/// PidLidTaskDateCompleted (PSETID_Task)
pub const PID_LID_TASK_DATE_COMPLETED: u32 = 0x810f;
/// PidLidTaskHistory (PSETID_Task)
pub const PID_LID_TASK_HISTORY: u32 = 0x811a;
/// PidLidTaskComplete (PSETID_Task)
pub const PID_LID_TASK_COMPLETE: u32 = 0x811c;
/// PidLidTaskOwner (PSETID_Task)
pub const PID_LID_TASK_OWNER: u32 = 0x811f;
/// PidLidTaskAssigner (PSETID_Task)
pub const PID_LID_TASK_ASSIGNER: u32 = 0x8121;
/// PidLidTaskOwnership (PSETID_Task)
pub const PID_LID_TASK_OWNERSHIP: u32 = 0x8129;
/// PidLidTaskAcceptanceState (PSETID_Task)
pub const PID_LID_TASK_ACCEPTANCE_STATE: u32 = 0x812a;
/// PidLidAppointmentSequence (PSETID_Appointment)
pub const PID_LID_APPOINTMENT_SEQUENCE: u32 = 0x8201;
/// PidLidBusyStatus (PSETID_Appointment)
pub const PID_LID_BUSY_STATUS: u32 = 0x8205;
/// PidLidLocation (PSETID_Appointment)
pub const PID_LID_LOCATION: u32 = 0x8208;
/// PidLidAppointmentStartWhole (PSETID_Appointment)
pub const PID_LID_APPOINTMENT_START_WHOLE: u32 = 0x820d;
/// PidLidAppointmentEndWhole (PSETID_Appointment)
pub const PID_LID_APPOINTMENT_END_WHOLE: u32 = 0x820e;
/// PidLidAppointmentSubType (PSETID_Appointment), set for all day events
pub const PID_LID_APPOINTMENT_SUB_TYPE: u32 = 0x8215;
/// PidLidAppointmentRecur (PSETID_Appointment)
pub const PID_LID_APPOINTMENT_RECUR: u32 = 0x8216;
/// PidLidRecurring (PSETID_Appointment)
pub const PID_LID_RECURRING: u32 = 0x8223;
/// PidLidRecurrencePattern (PSETID_Appointment)
pub const PID_LID_RECURRENCE_PATTERN: u32 = 0x8232;
/// PidLidForwardNotificationRecipients (PSETID_Appointment)
pub const PID_LID_FORWARD_NOTIFICATION_RECIPIENTS: u32 = 0x8261;
/// PidLidPromptSendUpdate (PSETID_Common)
pub const PID_LID_PROMPT_SEND_UPDATE: u32 = 0x8045;
/// PidLidTaskMode (PSETID_Common)
pub const PID_LID_TASK_MODE: u32 = 0x8518;
/// PidLidMeetingType (PSETID_Meeting)
pub const PID_LID_MEETING_TYPE: u32 = 0x0026;

static TAG_NAMES: &[(u16, &str)] = &[
    (PID_TAG_IMPORTANCE, "Importance"),
    (PID_TAG_MESSAGE_CLASS, "MessageClass"),
    (PID_TAG_PRIORITY, "Priority"),
    (PID_TAG_SENSITIVITY, "Sensitivity"),
    (PID_TAG_SUBJECT, "Subject"),
    (PID_TAG_CLIENT_SUBMIT_TIME, "ClientSubmitTime"),
    (PID_TAG_SENT_REPRESENTING_NAME, "SentRepresentingName"),
    (
        PID_TAG_SENT_REPRESENTING_EMAIL_ADDRESS,
        "SentRepresentingEmailAddress",
    ),
    (PID_TAG_TRANSPORT_MESSAGE_HEADERS, "TransportMessageHeaders"),
    (PID_TAG_SENDER_NAME, "SenderName"),
    (PID_TAG_SENDER_EMAIL_ADDRESS, "SenderEmailAddress"),
    (PID_TAG_RECIPIENT_TYPE, "RecipientType"),
    (PID_TAG_DISPLAY_BCC, "DisplayBcc"),
    (PID_TAG_DISPLAY_CC, "DisplayCc"),
    (PID_TAG_DISPLAY_TO, "DisplayTo"),
    (PID_TAG_MESSAGE_DELIVERY_TIME, "MessageDeliveryTime"),
    (PID_TAG_MESSAGE_FLAGS, "MessageFlags"),
    (PID_TAG_NORMALIZED_SUBJECT, "NormalizedSubject"),
    (PID_TAG_ATTACH_SIZE, "AttachSize"),
    (PID_TAG_ENTRY_ID, "EntryId"),
    (PID_TAG_BODY, "Body"),
    (PID_TAG_RTF_COMPRESSED, "RtfCompressed"),
    (PID_TAG_HTML, "Html"),
    (PID_TAG_INTERNET_MESSAGE_ID, "InternetMessageId"),
    (PID_TAG_DISPLAY_NAME, "DisplayName"),
    (PID_TAG_ADDRESS_TYPE, "AddressType"),
    (PID_TAG_EMAIL_ADDRESS, "EmailAddress"),
    (PID_TAG_CREATION_TIME, "CreationTime"),
    (PID_TAG_LAST_MODIFICATION_TIME, "LastModificationTime"),
    (PID_TAG_ATTACH_DATA, "AttachData"),
    (PID_TAG_ATTACH_FILENAME, "AttachFilename"),
    (PID_TAG_ATTACH_METHOD, "AttachMethod"),
    (PID_TAG_ATTACH_LONG_FILENAME, "AttachLongFilename"),
    (PID_TAG_ATTACH_PATHNAME, "AttachPathname"),
    (PID_TAG_ATTACH_LONG_PATHNAME, "AttachLongPathname"),
    (PID_TAG_ATTACH_MIME_TAG, "AttachMimeTag"),
    (PID_TAG_ATTACH_CONTENT_ID, "AttachContentId"),
    (PID_TAG_SMTP_ADDRESS, "SmtpAddress"),
    (PID_TAG_GENERATION, "Generation"),
    (PID_TAG_GIVEN_NAME, "GivenName"),
    (PID_TAG_BUSINESS_TELEPHONE_NUMBER, "BusinessTelephoneNumber"),
    (PID_TAG_HOME_TELEPHONE_NUMBER, "HomeTelephoneNumber"),
    (PID_TAG_SURNAME, "Surname"),
    (PID_TAG_COMPANY_NAME, "CompanyName"),
    (PID_TAG_TITLE, "Title"),
    (PID_TAG_DEPARTMENT_NAME, "DepartmentName"),
    (PID_TAG_MOBILE_TELEPHONE_NUMBER, "MobileTelephoneNumber"),
    (PID_TAG_TRANSMITTABLE_DISPLAY_NAME, "TransmittableDisplayName"),
    (PID_TAG_BIRTHDAY, "Birthday"),
    (PID_TAG_MIDDLE_NAME, "MiddleName"),
    (PID_TAG_DISPLAY_NAME_PREFIX, "DisplayNamePrefix"),
    (PID_TAG_GENDER, "Gender"),
    (PID_TAG_NICKNAME, "Nickname"),
    (PID_TAG_INTERNET_CODEPAGE, "InternetCodepage"),
    (PID_TAG_MESSAGE_CODEPAGE, "MessageCodepage"),
    (PID_TAG_SENDER_SMTP_ADDRESS, "SenderSmtpAddress"),
    (
        PID_TAG_SENT_REPRESENTING_SMTP_ADDRESS,
        "SentRepresentingSmtpAddress",
    ),
    (PID_TAG_RECIPIENT_DISPLAY_NAME, "RecipientDisplayName"),
    (PID_TAG_ATTACHMENT_HIDDEN, "AttachmentHidden"),
];

/// Return the name of a standard property ID
pub fn tag_name(id: u16) -> Option<&'static str> {
    TAG_NAMES
        .iter()
        .find_map(|(tid, name)| (*tid == id).then_some(*name))
}

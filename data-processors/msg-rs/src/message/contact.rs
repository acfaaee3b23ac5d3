use super::{BaseMessage, HeaderBlock, Message, MessageKind};
use crate::enums::Gender;
use crate::named::PropertySet;
use crate::tags::*;
use once_cell::sync::OnceCell;
use time::OffsetDateTime;

#[derive(Debug)]
/// A contact
pub struct Contact {
    base: BaseMessage,
    header: OnceCell<HeaderBlock>,
}

impl Contact {
    pub(crate) fn new(base: BaseMessage) -> Self {
        Self {
            base,
            header: OnceCell::new(),
        }
    }

    fn address_prop(&self, lid: u32) -> Option<&str> {
        self.properties()
            .named(PropertySet::Address, lid)?
            .as_str()
    }

    /// Full name
    pub fn display_name(&self) -> Option<&str> {
        self.properties().string(PID_TAG_DISPLAY_NAME)
    }

    /// Given name
    pub fn given_name(&self) -> Option<&str> {
        self.properties().string(PID_TAG_GIVEN_NAME)
    }

    /// Middle name
    pub fn middle_name(&self) -> Option<&str> {
        self.properties().string(PID_TAG_MIDDLE_NAME)
    }

    /// Surname
    pub fn surname(&self) -> Option<&str> {
        self.properties().string(PID_TAG_SURNAME)
    }

    /// Title prefix (e.g. `Dr.`)
    pub fn prefix(&self) -> Option<&str> {
        self.properties().string(PID_TAG_DISPLAY_NAME_PREFIX)
    }

    /// Generation suffix (e.g. `Jr.`)
    pub fn generation(&self) -> Option<&str> {
        self.properties().string(PID_TAG_GENERATION)
    }

    /// Nickname
    pub fn nickname(&self) -> Option<&str> {
        self.properties().string(PID_TAG_NICKNAME)
    }

    /// The name the contact is filed under
    pub fn file_under(&self) -> Option<&str> {
        self.address_prop(PID_LID_FILE_UNDER)
    }

    /// Company
    pub fn company(&self) -> Option<&str> {
        self.properties().string(PID_TAG_COMPANY_NAME)
    }

    /// Job title
    pub fn job_title(&self) -> Option<&str> {
        self.properties().string(PID_TAG_TITLE)
    }

    /// Department
    pub fn department(&self) -> Option<&str> {
        self.properties().string(PID_TAG_DEPARTMENT_NAME)
    }

    /// Business phone number
    pub fn business_phone(&self) -> Option<&str> {
        self.properties().string(PID_TAG_BUSINESS_TELEPHONE_NUMBER)
    }

    /// Home phone number
    pub fn home_phone(&self) -> Option<&str> {
        self.properties().string(PID_TAG_HOME_TELEPHONE_NUMBER)
    }

    /// Mobile phone number
    pub fn mobile_phone(&self) -> Option<&str> {
        self.properties().string(PID_TAG_MOBILE_TELEPHONE_NUMBER)
    }

    /// The e-mail addresses of the contact, up to three
    pub fn emails(&self) -> Vec<&str> {
        [
            PID_LID_EMAIL1_EMAIL_ADDRESS,
            PID_LID_EMAIL2_EMAIL_ADDRESS,
            PID_LID_EMAIL3_EMAIL_ADDRESS,
        ]
        .into_iter()
        .filter_map(|lid| self.address_prop(lid))
        .collect()
    }

    /// Display name of the first e-mail address
    pub fn email1_display_name(&self) -> Option<&str> {
        self.address_prop(PID_LID_EMAIL1_DISPLAY_NAME)
    }

    /// Birthday
    pub fn birthday(&self) -> Option<&OffsetDateTime> {
        self.properties().time(PID_TAG_BIRTHDAY)
    }

    /// Gender
    pub fn gender(&self) -> Option<Gender> {
        Gender::from_int(self.properties().int(PID_TAG_GENDER)?)
    }
}

impl Message for Contact {
    fn base(&self) -> &BaseMessage {
        &self.base
    }

    fn kind(&self) -> MessageKind {
        MessageKind::Contact
    }

    fn header_block(&self) -> &HeaderBlock {
        self.header.get_or_init(|| {
            let s = |v: Option<&str>| v.map(String::from);
            HeaderBlock::default()
                .section(
                    "-name-",
                    vec![
                        ("Full Name", s(self.display_name())),
                        ("First Name", s(self.given_name())),
                        ("Middle Name", s(self.middle_name())),
                        ("Last Name", s(self.surname())),
                        ("Suffix", s(self.generation())),
                        ("Nickname", s(self.nickname())),
                    ],
                )
                .section(
                    "-business-",
                    vec![
                        ("Company", s(self.company())),
                        ("Job Title", s(self.job_title())),
                        ("Department", s(self.department())),
                    ],
                )
                .section(
                    "-phone-",
                    vec![
                        ("Business Phone", s(self.business_phone())),
                        ("Home Phone", s(self.home_phone())),
                        ("Mobile Phone", s(self.mobile_phone())),
                    ],
                )
                .section(
                    "-email-",
                    vec![
                        ("Email 1", s(self.address_prop(PID_LID_EMAIL1_EMAIL_ADDRESS))),
                        ("Email 2", s(self.address_prop(PID_LID_EMAIL2_EMAIL_ADDRESS))),
                        ("Email 3", s(self.address_prop(PID_LID_EMAIL3_EMAIL_ADDRESS))),
                    ],
                )
                .section(
                    "-other-",
                    vec![(
                        "Birthday",
                        self.birthday().map(|t| self.base.format_date(t)),
                    )],
                )
        })
    }
}

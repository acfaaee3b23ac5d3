//! Closed value domains of integer properties
use serde::Serialize;
use std::fmt;

macro_rules! value_enum {
    ($(#[$doc:meta])* $name:ident { $($(#[$vdoc:meta])* $variant:ident = $value:literal => $text:literal,)* }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($(#[$vdoc])* $variant,)*
        }

        impl $name {
            /// Look up an integer property value
            pub fn from_int(v: i64) -> Option<Self> {
                match v {
                    $($value => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// The integer value
            pub const fn value(&self) -> i64 {
                match self {
                    $(Self::$variant => $value,)*
                }
            }

            /// A human readable name
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

value_enum! {
    /// Message importance (PidTagImportance)
    Importance {
        /// Low
        Low = 0 => "Low",
        /// Normal
        Normal = 1 => "Normal",
        /// High
        High = 2 => "High",
    }
}

value_enum! {
    /// Message sensitivity (PidTagSensitivity)
    Sensitivity {
        /// Normal
        Normal = 0 => "Normal",
        /// Personal
        Personal = 1 => "Personal",
        /// Private
        Private = 2 => "Private",
        /// Confidential
        Confidential = 3 => "Confidential",
    }
}

value_enum! {
    /// Message priority (PidTagPriority)
    Priority {
        /// Urgent
        Urgent = 1 => "Urgent",
        /// Normal
        Normal = 0 => "Normal",
        /// Not urgent
        NotUrgent = -1 => "Not urgent",
    }
}

value_enum! {
    /// Recipient type (PidTagRecipientType)
    RecipientType {
        /// The originator
        Sender = 0 => "Sender",
        /// Primary recipient
        To = 1 => "To",
        /// Carbon copy
        Cc = 2 => "Cc",
        /// Blind carbon copy
        Bcc = 3 => "Bcc",
    }
}

value_enum! {
    /// How the attachment data is stored (PidTagAttachMethod)
    AttachMethod {
        /// Just created, no data
        None = 0 => "None",
        /// Data in PidTagAttachDataBinary
        ByValue = 1 => "By value",
        /// Path in PidTagAttachLongPathname
        ByReference = 2 => "By reference",
        /// Path to be resolved
        ByReferenceResolve = 3 => "By reference resolve",
        /// Path only
        ByReferenceOnly = 4 => "By reference only",
        /// An embedded message
        EmbeddedMessage = 5 => "Embedded message",
        /// An OLE object
        Ole = 6 => "OLE",
        /// A web reference
        ByWebReference = 7 => "By web reference",
    }
}

value_enum! {
    /// Free/busy status of an appointment (PidLidBusyStatus)
    BusyStatus {
        /// Free
        Free = 0 => "Free",
        /// Tentative
        Tentative = 1 => "Tentative",
        /// Busy
        Busy = 2 => "Busy",
        /// Out of office
        OutOfOffice = 3 => "Out of Office",
        /// Working elsewhere
        WorkingElsewhere = 4 => "Working Elsewhere",
    }
}

value_enum! {
    /// Task status (PidLidTaskStatus)
    TaskStatus {
        /// Not started
        NotStarted = 0 => "Not Started",
        /// In progress
        InProgress = 1 => "In Progress",
        /// Complete
        Complete = 2 => "Complete",
        /// Waiting on someone else
        WaitingOnOther = 3 => "Waiting on someone else",
        /// Deferred
        Deferred = 4 => "Deferred",
    }
}

value_enum! {
    /// Task acceptance state (PidLidTaskAcceptanceState)
    TaskAcceptance {
        /// Not assigned
        NotAssigned = 0 => "Not assigned",
        /// Unknown
        Unknown = 1 => "Unknown",
        /// Accepted
        Accepted = 2 => "Accepted",
        /// Rejected
        Rejected = 3 => "Rejected",
    }
}

value_enum! {
    /// Last change to a task (PidLidTaskHistory)
    TaskHistory {
        /// No change
        None = 0 => "None",
        /// Accepted
        Accepted = 1 => "Accepted",
        /// Rejected
        Rejected = 2 => "Rejected",
        /// Other change
        Other = 3 => "Other",
        /// Due date changed
        DueDateChanged = 4 => "Due date changed",
        /// Assigned
        Assigned = 5 => "Assigned",
    }
}

value_enum! {
    /// Task mode (PidLidTaskMode)
    TaskMode {
        /// Not assigned
        Unassigned = 0 => "Unassigned",
        /// Embedded in a task request
        EmbeddedRequest = 1 => "Embedded request",
        /// Accepted by the assignee
        Accepted = 2 => "Accepted",
        /// Rejected by the assignee
        Rejected = 3 => "Rejected",
        /// Embedded in a task update
        EmbeddedUpdate = 4 => "Embedded update",
        /// Assigned to the assigner
        SelfAssigned = 5 => "Self assigned",
    }
}

value_enum! {
    /// Role of the user relative to a task (PidLidTaskOwnership)
    TaskOwnership {
        /// Not assigned
        NotAssigned = 0 => "Not assigned",
        /// The assigner's copy
        AssignersCopy = 1 => "Assigner's copy",
        /// The assignee's copy
        AssigneesCopy = 2 => "Assignee's copy",
    }
}

value_enum! {
    /// Contact gender (PidTagGender)
    Gender {
        /// Unspecified
        Unspecified = 0 => "Unspecified",
        /// Female
        Female = 1 => "Female",
        /// Male
        Male = 2 => "Male",
    }
}

impl Priority {
    /// Look up a raw 32 bit value, where "not urgent" is stored as `0xFFFFFFFF`
    pub fn from_raw(v: i64) -> Option<Self> {
        Self::from_int(v).or_else(|| (v == 0xffffffff).then_some(Self::NotUrgent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups() {
        assert_eq!(Importance::from_int(2), Some(Importance::High));
        assert_eq!(Importance::from_int(3), None);
        assert_eq!(Importance::High.to_string(), "High");
        assert_eq!(RecipientType::from_int(2), Some(RecipientType::Cc));
        assert_eq!(AttachMethod::from_int(5), Some(AttachMethod::EmbeddedMessage));
        assert_eq!(AttachMethod::Ole.value(), 6);
        assert_eq!(Priority::from_raw(-1), Some(Priority::NotUrgent));
        assert_eq!(Priority::from_raw(0xffffffff), Some(Priority::NotUrgent));
        assert_eq!(TaskStatus::from_int(4), Some(TaskStatus::Deferred));
        assert_eq!(Gender::Female.as_str(), "Female");
    }
}

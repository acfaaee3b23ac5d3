//! MAPI error and warning codes
//!
//! The values carried by `PtypErrorCode` properties, as listed in
//! [MS-OXCDATA] 2.4
use serde::Serialize;
use std::fmt;

macro_rules! error_codes {
    ($($(#[$doc:meta])* $name:ident = $value:literal,)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        /// A known MAPI error or warning code
        pub enum ErrorCode {
            $($(#[$doc])* $name,)*
        }

        impl ErrorCode {
            /// The 32 bit value of the code
            pub const fn code(&self) -> u32 {
                match self {
                    $(Self::$name => $value,)*
                }
            }

            /// Look up a 32 bit value
            pub const fn from_code(code: u32) -> Option<Self> {
                match code {
                    $($value => Some(Self::$name),)*
                    _ => None,
                }
            }
        }
    };
}

error_codes! {
    /// The operation succeeded
    Success = 0x00000000,
    /// The operation failed for an unspecified reason
    GeneralFailure = 0x80004005,
    /// Not enough memory
    OutOfMemory = 0x8007000E,
    /// An invalid parameter was passed
    InvalidParameter = 0x80070057,
    /// The requested interface is not supported
    NoInterface = 0x80004002,
    /// Insufficient access rights
    AccessDenied = 0x80070005,
    /// Invalid storage function
    StorageInvalidFunction = 0x80030001,
    /// Storage access denied
    StorageAccessDenied = 0x80030005,
    /// Storage memory exhausted
    StorageInsufficientMemory = 0x80030008,
    /// Invalid storage pointer
    StorageInvalidPointer = 0x80030009,
    /// Storage read fault
    StorageReadFault = 0x8003001E,
    /// Storage lock violation
    StorageLockViolation = 0x80030021,
    /// Invalid storage parameter
    StorageInvalidParameter = 0x80030057,
    /// Invalid stream size
    StreamSizeError = 0x80030070,
    /// Invalid storage flag
    StorageInvalidFlag = 0x800300FF,
    /// The storage could not be saved
    StorageCantSave = 0x80030103,
    /// The operation is not supported
    NotSupported = 0x80040102,
    /// Invalid character width
    InvalidCharacterWidth = 0x80040103,
    /// A string is too long
    StringTooLong = 0x80040105,
    /// Unknown flags
    InvalidFlag = 0x80040106,
    /// Invalid entry ID
    InvalidEntryId = 0x80040107,
    /// Invalid object
    InvalidObject = 0x80040108,
    /// The object changed
    ObjectChanged = 0x80040109,
    /// The object was deleted
    ObjectDeleted = 0x8004010A,
    /// The server is busy
    ServerBusy = 0x8004010B,
    /// Out of disk space
    OutOfDisk = 0x8004010D,
    /// Out of resources
    OutOfResources = 0x8004010E,
    /// Not found
    NotFound = 0x8004010F,
    /// Version mismatch
    VersionMismatch = 0x80040110,
    /// Logon failed
    LogonFailed = 0x80040111,
    /// Too many sessions
    TooManySessions = 0x80040112,
    /// The user cancelled
    UserCanceled = 0x80040113,
    /// The abort failed
    AbortFailed = 0x80040114,
    /// Network error
    NetworkError = 0x80040115,
    /// Disk error
    DiskError = 0x80040116,
    /// The operation is too complex
    TooComplex = 0x80040117,
    /// Invalid column
    InvalidColumn = 0x80040118,
    /// The value is computed
    ComputedValue = 0x8004011A,
    /// Corrupt data
    CorruptData = 0x8004011B,
    /// Invalid codepage
    InvalidCodepage = 0x8004011E,
    /// Invalid locale
    InvalidLocale = 0x8004011F,
    /// Time skew
    TimeSkew = 0x80040123,
    /// End of session
    EndOfSession = 0x80040200,
    /// Unknown entry ID
    UnknownEntryId = 0x80040201,
    /// Not completed
    NotCompleted = 0x80040400,
    /// Timeout
    Timeout = 0x80040401,
    /// Empty table
    EmptyTable = 0x80040402,
    /// Table too big
    TableTooBig = 0x80040403,
    /// Invalid bookmark
    InvalidBookmark = 0x80040405,
    /// Wait error
    ErrorWait = 0x80040500,
    /// Cancel error
    ErrorCancel = 0x80040501,
    /// No suppress
    NoSuppress = 0x80040602,
    /// Colliding names
    CollidingNames = 0x80040604,
    /// Not initialized
    NotInitialized = 0x80040605,
    /// No recipients
    NoRecipients = 0x80040607,
    /// Already sent
    AlreadySent = 0x80040608,
    /// The folder has subfolders
    HasFolders = 0x80040609,
    /// The folder has messages
    HasMessages = 0x8004060A,
    /// Folder cycle
    FolderCycle = 0x8004060B,
    /// Too many locks
    TooManyLocks = 0x8004060D,
    /// Ambiguous recipient
    AmbiguousRecipient = 0x80040700,
    /// The synchronized object was deleted
    SyncObjectDeleted = 0x80040800,
    /// Ignore failure
    IgnoreFailure = 0x80040801,
    /// Synchronization conflict
    SyncConflict = 0x80040802,
    /// No parent folder
    NoParentFolder = 0x80040803,
    /// Cycle detected
    CycleDetected = 0x80040804,
    /// Not synchronized
    NotSynchronized = 0x80040805,
    /// Named property quota exceeded
    NamedPropertyQuota = 0x80040900,
    /// Not implemented
    NotImplemented = 0x80040FFF,
    /// Warning: errors were returned
    ErrorsReturned = 0x00040380,
    /// Warning: position changed
    PositionChanged = 0x00040481,
    /// Warning: approximate count
    ApproximateCount = 0x00040482,
    /// Warning: partially complete
    PartiallyComplete = 0x00040680,
    /// Warning: synchronization progress
    SyncProgress = 0x00040820,
    /// Warning: new client change
    NewClientChange = 0x00040821,
}

impl ErrorCode {
    /// Whether the code is a warning rather than an error
    pub const fn is_warning(&self) -> bool {
        self.code() & 0x80000000 == 0 && self.code() != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// The value of an error code property
pub enum ErrorValue {
    /// A code from the table
    Known(ErrorCode),
    /// A value outside the table
    Unmapped(u32),
}

impl ErrorValue {
    /// Classify a raw value
    pub const fn new(code: u32) -> Self {
        match ErrorCode::from_code(code) {
            Some(known) => Self::Known(known),
            None => Self::Unmapped(code),
        }
    }

    /// The raw 32 bit value
    pub const fn code(&self) -> u32 {
        match self {
            Self::Known(known) => known.code(),
            Self::Unmapped(code) => *code,
        }
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(known) => write!(f, "{:?} ({:#010x})", known, known.code()),
            Self::Unmapped(code) => write!(f, "{code:#010x}"),
        }
    }
}

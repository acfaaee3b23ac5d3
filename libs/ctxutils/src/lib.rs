//! Miscellaneous utility functions and structures
//!
//! Shared by the binary format parsers: Win32 value types and the time
//! encodings found in Microsoft file formats
#![warn(missing_docs)]

#[cfg(feature = "win32")]
pub mod win32;

//! Shared data types for PCH GPIO pad extraction.
//!
//! This crate holds the platform-independent pad descriptor model (the two
//! configuration words DW0/DW1 and their decoded fields), the semantic pad
//! validator, and the per-platform profiles that drive detection. Everything
//! here is pure data and pure functions; no I/O happens in this crate.

pub mod alderlake;
pub mod pad;
pub mod profile;

pub use pad::{PadDescriptor, PadDirection, PadMode, PadPull, PadReset, PadTrigger, RxTxConfig};
pub use profile::{ClassBand, PadGroup, PlatformProfile, SignatureEntry, TableClass};

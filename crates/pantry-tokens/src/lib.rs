//! # Pantry Tokens
//!
//! The design-token model of the KitchenPantry toolchain and the text
//! scanners every other stage is built on.
//!
//! All functions here are pure: they take file text plus a logical path used
//! only for provenance, and return data. Nothing reads the file system.
//!
//! ```text
//! extract_tokens   ← `--name: value;` declarations → TokenSheet
//!     │
//! scan_usages      ← `var(--name)` + semantic utility classes → UsageSite
//!     │
//! scan_hardcoded   ← palette/spacing/typography literals → HardcodedValue
//! ```

pub mod digest;
pub mod extract;
pub mod hardcoded;
pub mod text;
pub mod token;
pub mod usage;

pub use digest::TokenDigest;
pub use extract::{Declaration, declarations, extract_tokens, property_name_spans};
pub use hardcoded::{HardcodedKind, HardcodedValue, scan_hardcoded};
pub use token::{Token, TokenCategory, TokenSheet, categorize, merge_sheets};
pub use usage::{UsageKind, UsageSite, scan_usages, used_token_names};

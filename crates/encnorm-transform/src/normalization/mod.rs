//! Value-level normalization.
//!
//! - **sentinel**: sentinel-to-absent mapping and per-column policy
//! - **flags**: tri-state flag decoding
//! - **code_table**: code table builders and reference resolution
//! - **names**: display names for fixed-code dimensions

pub mod code_table;
pub mod flags;
pub mod names;
pub mod sentinel;

pub use code_table::{
    CodeTableBuilder, FixedCodeTableBuilder, build_code_table, build_code_tables,
    categorical_value, parse_code, resolve_reference,
};
pub use flags::decode_flag;
pub use names::{MappedNames, NameSource, TemplateNames};
pub use sentinel::{SentinelPolicy, normalize_sentinel};

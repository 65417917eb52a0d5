//! Lookups built from the legacy flat index files

pub mod fulltext;
pub mod reader;
pub mod usage;

pub use fulltext::*;
pub use reader::*;
pub use usage::*;

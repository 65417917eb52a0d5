pub mod bibcode;
pub mod quirks;

pub use bibcode::*;
pub use quirks::*;

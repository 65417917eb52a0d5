pub mod collections;
pub mod report;

pub use collections::run_collections;
pub use report::{generate_report, run_report};

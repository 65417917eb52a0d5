//! Coverage reporting for curated journal collections: how much of each
//! journal volume has full text, resolved references and metadata, and
//! collection-level record, citation and usage figures.

pub mod aggregate;
pub mod classic;
pub mod cli;
pub mod commands;
pub mod common;
pub mod config;
pub mod error;
pub mod journal;
pub mod report;
pub mod search;

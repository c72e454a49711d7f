// lib.rs - SubRecon library
// Passive subdomain enumeration over a threat-intel lookup and search engines

pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod logger;
pub mod refine;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod scan;
pub mod sources;

#[cfg(test)]
mod testing;

pub use error::{ReconError, ReconResult};

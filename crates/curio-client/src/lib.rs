//! Curio Client - HTTP clients for museum collection APIs
//!
//! This crate provides the source fetchers and the aggregator:
//!
//! - [`harvard`] - Harvard Art Museums `object` endpoint (paginated)
//! - [`met`] - Metropolitan Museum of Art search and object endpoints
//! - [`aggregator`] - runs both and concatenates their items
//!
//! # Overview
//!
//! Every fetcher normalizes upstream records into [`curio_core::Item`] and
//! absorbs its own failures: a broken source contributes zero items instead
//! of failing the search.

pub mod aggregator;
pub mod harvard;
pub mod met;
pub mod transport;

#[cfg(test)]
mod test_support;

// Re-export main client types
pub use aggregator::{Aggregator, CollectionSearch};
pub use harvard::HarvardClient;
pub use met::MetClient;
pub use transport::{JsonTransport, ReqwestTransport};

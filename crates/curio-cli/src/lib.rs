//! Curio CLI - Command-line interface for the Curio museum search aggregator
//!
//! This crate ties the query translator, both fetchers and the settings layer
//! into the `curio` binary.

pub mod config;

pub use config::{mask_secret, Command, Config, SearchArgs};

//! Developer harness for canopy-query
//!
//! Drives the library from files on disk: a describe JSON for the schema
//! resolver and a response JSON standing in for the remote store.

pub mod cli;
pub mod commands;
pub mod output;

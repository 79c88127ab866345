//! CLI subcommands.

pub mod cache;
pub mod common;
pub mod query;
pub mod tiles;

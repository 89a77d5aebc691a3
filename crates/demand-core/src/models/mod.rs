//! Data models shared across the crate.

pub mod agreement;
pub mod canonical;
pub mod config;
pub mod letter;
pub mod statement;

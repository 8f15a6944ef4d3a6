//! # LXP Common Library
//!
//! Shared code for the LXP learner-engagement services:
//! - Error type used by store and configuration code
//! - Configuration loading (CLI → ENV → TOML → compiled default)
//! - SQLite schema initialization
//! - Timestamp helpers for the RFC 3339 text columns

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};

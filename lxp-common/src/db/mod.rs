//! Database access shared by LXP services

pub mod init;

pub use init::{create_schema, init_database};

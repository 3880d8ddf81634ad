//! HTTP route modules.

pub mod checkouts;
pub mod dars;
pub mod init;
pub mod sessions;

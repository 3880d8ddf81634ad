//! Core library for darbind.
//!
//! Contains the token validator, project path sanitizer, session directory
//! binder, and the editor session lifecycle state machine. This crate
//! depends on `darbind-store` for the alias store trait and knows nothing
//! about HTTP routes or document content; archive bytes are opaque here.

pub mod binder;
pub mod error;
pub mod lifecycle;
pub mod path;
pub mod token;

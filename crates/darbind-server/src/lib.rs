//! darbind HTTP server.
//!
//! Wires together the core library and alias store into a running Axum
//! server: session init at `/init`, the archive storage gateway at
//! `/dars/{session}/…`, the save/commit relay at `/checkouts/…`, and
//! best-effort session teardown at `/sessions/…`. The historical front-end
//! variants differed only in route prefix, which is configuration here.

pub mod config;
pub mod credentials;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;
pub mod sync;

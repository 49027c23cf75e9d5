//! Jobtrack common library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Pieces shared by every jobtrack binary. Today that is the logging setup in
//! [`logging`]; anything that is not specific to the HTTP server belongs here.

pub mod logging;

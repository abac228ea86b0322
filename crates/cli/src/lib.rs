//! SurfingBro bridge daemon.
//!
//! Browser extensions connect to `/ws`; agents drive them through the
//! token-guarded `/api` routes and operators inspect them through `/admin`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;

//! Shared configuration, errors and constants for the Caucus CRM server.

pub mod config;
pub mod constants;
pub mod error;

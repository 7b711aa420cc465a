//! Authentication for the mutating endpoints.
//!
//! ## Module Organization
//!
//! - `authenticator`: The `Authenticator` trait and its database-backed implementation
//! - `header`: Parsing of `Basic` and `Bearer` authorization headers
//! - `password`: Password hashing and verification with Argon2
//! - `token`: Bearer token generation and digesting

pub mod authenticator;
pub mod header;
pub mod password;
pub mod token;

pub use authenticator::{AuthenticatedSubject, Authenticator, DbAuthenticator, IssuedToken};
pub use header::{BasicCredentials, parse_basic, parse_bearer};

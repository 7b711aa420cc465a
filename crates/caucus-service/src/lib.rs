//! Business logic for the Caucus CRM server.
//!
//! ## Module Organization
//!
//! - `auth`: Credential verification and bearer token issuance
//! - `constituent`: Listing, upsert-by-email, status updates and edits
//! - `dashboard`: Top-issue ranking and sign-up / area-code aggregation
//! - `exchange`: CSV export and import
//! - `mail`: Bulk email to constituents through a `Mailer`
//! - `validation`: Field-level input validation

pub mod auth;
pub mod constituent;
pub mod dashboard;
pub mod error;
pub mod exchange;
pub mod mail;
pub mod validation;

//! Constituent operations: listing, upsert-by-email, status updates and edits.

mod edit;
mod input;
mod listing;
mod status;
mod upsert;


pub use edit::{ConstituentPatch, ValidPatch, edit_constituent};
pub use input::{ConstituentInput, ValidConstituent};
pub use listing::{ListParams, list_constituents};
pub use status::update_status;
pub use upsert::{UpsertOutcome, upsert_constituent, upsert_in_transaction};

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Parses a constituent ID taken from a request path.
///
/// ## Errors
/// Returns `InvalidInput` unless the value is a positive integer.
pub fn parse_constituent_id(raw: &str) -> ServiceResult<i32> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ServiceError::InvalidInput(format!(
            "Invalid constituent id '{raw}'"
        ))),
    }
}

use chrono::{DateTime, Utc};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Deserialize;

use caucus_db::db::connection::DbConnection;
use caucus_db::db::query::constituent;
use caucus_db::model::constituent::{Constituent, ConstituentChanges};

use super::input::{check_email, check_phone, clean_tags};
use crate::error::{ServiceError, ServiceResult};
use crate::validation::{Violations, non_blank};

/// Partial edit submitted for an existing constituent. Unknown keys such as
/// `id` or `signUpTime` are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConstituentPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub active: Option<i32>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub preferred_contact_method: Option<String>,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A validated edit. Blank optional strings were dropped and leave the
/// stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub active: Option<i32>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub preferred_contact_method: Option<String>,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn required_if_present(
    violations: &mut Violations,
    field: &str,
    label: &str,
    value: Option<&String>,
) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        violations.push(field, format!("{label} cannot be empty"));
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn optional(value: Option<&String>) -> Option<String> {
    non_blank(value.map(String::as_str)).map(str::to_owned)
}

impl ConstituentPatch {
    /// ## Summary
    /// Validates the supplied fields, collecting every violation.
    ///
    /// ## Errors
    /// Returns all violations when a supplied name or email is blank, or a
    /// supplied email or phone is malformed.
    pub fn validate(&self) -> Result<ValidPatch, Violations> {
        let mut violations = Violations::new();

        let first_name = required_if_present(
            &mut violations,
            "firstName",
            "First name",
            self.first_name.as_ref(),
        );
        let last_name = required_if_present(
            &mut violations,
            "lastName",
            "Last name",
            self.last_name.as_ref(),
        );
        let email = required_if_present(&mut violations, "email", "Email", self.email.as_ref());
        if let Some(email) = email.as_deref() {
            check_email(&mut violations, email);
        }
        let phone = optional(self.phone.as_ref());
        check_phone(&mut violations, phone.as_deref());

        violations.into_result(ValidPatch {
            first_name,
            last_name,
            email,
            phone,
            active: self.active,
            address: optional(self.address.as_ref()),
            city: optional(self.city.as_ref()),
            state: optional(self.state.as_ref()),
            zip_code: optional(self.zip_code.as_ref()),
            date_of_birth: self.date_of_birth,
            preferred_contact_method: optional(self.preferred_contact_method.as_ref()),
            last_contact_date: self.last_contact_date,
            notes: optional(self.notes.as_ref()),
            tags: clean_tags(self.tags.as_ref()),
        })
    }
}

impl ValidPatch {
    #[must_use]
    pub fn to_changes(&self, now: DateTime<Utc>) -> ConstituentChanges<'_> {
        ConstituentChanges {
            first_name: self.first_name.as_deref(),
            last_name: self.last_name.as_deref(),
            email: self.email.as_deref(),
            phone: self.phone.as_deref(),
            active: self.active,
            address: self.address.as_deref(),
            city: self.city.as_deref(),
            state: self.state.as_deref(),
            zip_code: self.zip_code.as_deref(),
            date_of_birth: self.date_of_birth,
            preferred_contact_method: self.preferred_contact_method.as_deref(),
            last_contact_date: self.last_contact_date,
            notes: self.notes.as_deref(),
            tags: self.tags.clone(),
            updated_time: Some(now),
        }
    }
}

/// ## Summary
/// Applies an edit to the constituent with the given ID.
///
/// ## Errors
/// Returns `NotFound` for an unknown ID, `Conflict` when the new email belongs
/// to another constituent, or a database error if the update fails.
#[tracing::instrument(skip(conn, patch))]
pub async fn edit_constituent(
    conn: &mut DbConnection<'_>,
    id: i32,
    patch: &ValidPatch,
) -> ServiceResult<Constituent> {
    let changes = patch.to_changes(Utc::now());

    let updated = match constituent::update_by_id(conn, id, &changes).await {
        Ok(updated) => updated,
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            tracing::warn!(id, "Edit rejected, email already in use");
            return Err(ServiceError::Conflict("Email already in use".to_owned()));
        }
        Err(e) => return Err(e.into()),
    };

    let updated =
        updated.ok_or_else(|| ServiceError::NotFound("Constituent not found".to_owned()))?;

    tracing::info!(id, "Constituent edited");

    Ok(updated)
}

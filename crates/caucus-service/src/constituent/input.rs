use chrono::{DateTime, Utc};
use serde::Deserialize;

use caucus_db::model::constituent::{ConstituentChanges, NewConstituent};

use crate::validation::{Violations, is_valid_email, is_valid_phone, non_blank};

/// Constituent fields as submitted by a client or read from a CSV row.
///
/// Everything is optional at this point so that validation can report every
/// missing field at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConstituentInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub preferred_contact_method: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A constituent that passed validation. Strings are trimmed and blank
/// optional fields are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidConstituent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub preferred_contact_method: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn owned(value: Option<&String>) -> Option<String> {
    non_blank(value.map(String::as_str)).map(str::to_owned)
}

pub(crate) fn clean_tags(tags: Option<&Vec<String>>) -> Option<Vec<String>> {
    let cleaned: Vec<String> = tags?
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

pub(crate) fn check_email(violations: &mut Violations, email: &str) {
    if !is_valid_email(email) {
        violations.push("email", "Invalid email address");
    }
}

pub(crate) fn check_phone(violations: &mut Violations, phone: Option<&str>) {
    if let Some(phone) = phone
        && !is_valid_phone(phone)
    {
        violations.push("phone", "Invalid phone number");
    }
}

impl ConstituentInput {
    /// ## Summary
    /// Validates the input, collecting every violation.
    ///
    /// ## Errors
    /// Returns all violations when any required field is missing or a
    /// supplied email or phone is malformed.
    pub fn validate(&self) -> Result<ValidConstituent, Violations> {
        let mut violations = Violations::new();

        let first_name = non_blank(self.first_name.as_deref());
        if first_name.is_none() {
            violations.push("firstName", "First name is required");
        }
        let last_name = non_blank(self.last_name.as_deref());
        if last_name.is_none() {
            violations.push("lastName", "Last name is required");
        }
        let email = non_blank(self.email.as_deref());
        match email {
            None => violations.push("email", "Email is required"),
            Some(email) => check_email(&mut violations, email),
        }
        let phone = non_blank(self.phone.as_deref());
        check_phone(&mut violations, phone);

        match (first_name, last_name, email) {
            (Some(first_name), Some(last_name), Some(email)) if violations.is_empty() => {
                Ok(ValidConstituent {
                    first_name: first_name.to_owned(),
                    last_name: last_name.to_owned(),
                    email: email.to_owned(),
                    phone: phone.map(str::to_owned),
                    address: owned(self.address.as_ref()),
                    city: owned(self.city.as_ref()),
                    state: owned(self.state.as_ref()),
                    zip_code: owned(self.zip_code.as_ref()),
                    preferred_contact_method: owned(self.preferred_contact_method.as_ref()),
                    notes: owned(self.notes.as_ref()),
                    tags: clean_tags(self.tags.as_ref()),
                })
            }
            _ => Err(violations),
        }
    }
}

impl ValidConstituent {
    /// Insert payload. `sign_up_time` of `None` uses the column default.
    #[must_use]
    pub fn to_new(&self, sign_up_time: Option<DateTime<Utc>>) -> NewConstituent<'_> {
        NewConstituent {
            first_name: &self.first_name,
            last_name: &self.last_name,
            email: &self.email,
            phone: self.phone.as_deref(),
            sign_up_time,
            address: self.address.as_deref(),
            city: self.city.as_deref(),
            state: self.state.as_deref(),
            zip_code: self.zip_code.as_deref(),
            date_of_birth: None,
            preferred_contact_method: self.preferred_contact_method.as_deref(),
            notes: self.notes.as_deref(),
            tags: self.tags.clone(),
        }
    }

    /// Merge payload for an existing row with the same email. Absent optional
    /// fields keep their stored values.
    #[must_use]
    pub fn to_merge(&self, now: DateTime<Utc>) -> ConstituentChanges<'_> {
        ConstituentChanges {
            first_name: Some(&self.first_name),
            last_name: Some(&self.last_name),
            phone: self.phone.as_deref(),
            address: self.address.as_deref(),
            city: self.city.as_deref(),
            state: self.state.as_deref(),
            zip_code: self.zip_code.as_deref(),
            preferred_contact_method: self.preferred_contact_method.as_deref(),
            notes: self.notes.as_deref(),
            tags: self.tags.clone(),
            updated_time: Some(now),
            ..ConstituentChanges::default()
        }
    }
}

// SPDX-License-Identifier: Apache-2.0

use crate::decode::RawRow;
use chrono::{DateTime, NaiveDate};
use civreg_core::{hash_identity, mask_identity};
use civreg_model::{CitizenRecord, PVC_NO};
use std::collections::BTreeMap;

/// Bulk import accepts identity numbers of at least this many characters;
/// shorter rows are skipped outright. (Public intake is stricter and
/// requires exactly eleven.)
pub const MIN_IDENTITY_LEN: usize = 11;

// Ordered alias tables per target field, matched case-insensitively.
// First match wins.
const NIN_ALIASES: &[&str] = &["nin"];
const FIRST_NAME_ALIASES: &[&str] = &["first_name", "firstname"];
const LAST_NAME_ALIASES: &[&str] = &["last_name", "lastname", "surname"];
const GENDER_ALIASES: &[&str] = &["gender"];
const DOB_ALIASES: &[&str] = &["date_of_birth", "dateofbirth"];
const STATE_ALIASES: &[&str] = &["state"];
const LGA_ALIASES: &[&str] = &["lga"];
const WARD_ALIASES: &[&str] = &["ward"];
const PHONE_ALIASES: &[&str] = &["phone"];
const PVC_ALIASES: &[&str] = &["has_pvc", "pvcstatus"];
const EMAIL_ALIASES: &[&str] = &["email"];
const ADDRESS_ALIASES: &[&str] = &["house_address", "address"];

// ISO first, then day-first (the dominant local convention), then
// month-first as a last resort.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%m/%d/%Y"];

/// Maps one heterogeneous spreadsheet row onto a canonical citizen record.
///
/// Returns `None` (row skipped, not an error) when the identity number is
/// absent or shorter than [`MIN_IDENTITY_LEN`] after trimming. The record's
/// `imported_at` is left at zero; the persistence boundary stamps it.
#[must_use]
pub fn normalize_row(row: &RawRow) -> Option<CitizenRecord> {
    let lower: BTreeMap<String, &str> = row
        .iter()
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.as_str()))
        .collect();

    let nin = lookup(&lower, NIN_ALIASES)?.trim();
    if nin.chars().count() < MIN_IDENTITY_LEN {
        return None;
    }

    Some(CitizenRecord {
        identity_hash: hash_identity(nin),
        identity_masked: mask_identity(nin),
        first_name: lookup_owned(&lower, FIRST_NAME_ALIASES),
        last_name: lookup_owned(&lower, LAST_NAME_ALIASES),
        gender: lookup_owned(&lower, GENDER_ALIASES),
        date_of_birth: lookup(&lower, DOB_ALIASES).and_then(parse_date_of_birth),
        state: lookup_owned(&lower, STATE_ALIASES),
        lga: lookup_owned(&lower, LGA_ALIASES),
        ward: lookup_owned(&lower, WARD_ALIASES),
        phone: lookup_owned(&lower, PHONE_ALIASES),
        email: lookup_owned(&lower, EMAIL_ALIASES),
        address: lookup_owned(&lower, ADDRESS_ALIASES),
        pvc_status: lookup(&lower, PVC_ALIASES)
            .map_or_else(|| PVC_NO.to_string(), |v| v.trim().to_ascii_uppercase()),
        imported_at: 0,
    })
}

fn lookup<'a>(lower: &BTreeMap<String, &'a str>, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .find_map(|alias| lower.get(*alias).copied())
        .filter(|v| !v.trim().is_empty())
}

fn lookup_owned(lower: &BTreeMap<String, &str>, aliases: &[&str]) -> Option<String> {
    lookup(lower, aliases).map(|v| v.trim().to_string())
}

/// Coerces any recognizable date string to ISO `YYYY-MM-DD`; anything
/// unparsable becomes `None`, never an error.
#[must_use]
pub fn parse_date_of_birth(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
}

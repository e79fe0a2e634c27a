use chrono::{DateTime, Utc};

use crate::error::ValidationErrors;

pub const TITLE_MAX_LENGTH: usize = 100;

/// Fields an activity is created or edited with, as posted by the client.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityForm {
    pub title: String,
    pub date: Option<DateTime<Utc>>,
    pub description: String,
    pub category: String,
    pub city: String,
    pub venue: String,
    pub latitude: f64,
    pub longitude: f64,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn validate_activity(form: &ActivityForm, now: DateTime<Utc>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if is_blank(&form.title) {
        errors.add("Title", "Title is required");
    } else if form.title.chars().count() > TITLE_MAX_LENGTH {
        errors.add("Title", "Title must not exceed 100 characters");
    }
    if is_blank(&form.description) {
        errors.add("Description", "Description is required");
    }
    match form.date {
        Some(date) if date > now => {}
        _ => errors.add("Date", "Date must be in the future"),
    }
    if is_blank(&form.category) {
        errors.add("Category", "Category is required");
    }
    if is_blank(&form.city) {
        errors.add("City", "City is required");
    }
    if is_blank(&form.venue) {
        errors.add("Venue", "Venue is required");
    }

    // Zero counts as missing.
    if form.latitude == 0.0 {
        errors.add("Latitude", "Latitude is required");
    } else if !(-90.0..=90.0).contains(&form.latitude) {
        errors.add("Latitude", "Latitude must be between -90 and 90");
    }
    if form.longitude == 0.0 {
        errors.add("Longitude", "Longitude is required");
    } else if !(-180.0..=180.0).contains(&form.longitude) {
        errors.add("Longitude", "Longitude must be between -180 and 180");
    }

    errors
}

pub fn validate_display_name(display_name: &str, errors: &mut ValidationErrors) {
    if is_blank(display_name) {
        errors.add("DisplayName", "'Display Name' must not be empty.");
    }
}

/// Lenient address check: exactly one `@` with something on both sides and
/// no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => !local.is_empty() && !domain.is_empty(),
        _ => false,
    }
}

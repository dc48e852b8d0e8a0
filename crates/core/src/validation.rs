//! Movie form validation.
//!
//! Runs before create/update so that malformed input never reaches the
//! catalog service. Input is trimmed first; optional fields left blank are
//! simply omitted from the payload.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::MoviePayload;
use crate::error::FetchError;

pub const YEAR_MIN: i32 = 1888;

static IMAGE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://.*\.(jpg|jpeg|png|webp)$").expect("image URL pattern is valid")
});

/// Raw form input, every field as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieDraft {
    pub title: String,
    pub director: String,
    pub year: String,
    /// Comma-separated genres.
    pub genres: String,
    pub overview: String,
    pub poster: String,
    pub rating: String,
    pub age_rating: String,
}

/// Field name to message, in field order of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(pub BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl From<ValidationErrors> for FetchError {
    fn from(errors: ValidationErrors) -> Self {
        FetchError::Validation(errors.to_string())
    }
}

/// Validate against the current calendar year.
pub fn validate_movie(draft: &MovieDraft) -> Result<MoviePayload, ValidationErrors> {
    validate_movie_at(draft, chrono::Utc::now().year())
}

/// Validate with an explicit current year (the year may be at most one ahead).
pub fn validate_movie_at(
    draft: &MovieDraft,
    current_year: i32,
) -> Result<MoviePayload, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let title = draft.title.trim();
    check_length(&mut errors, "title", title, 2, 150, true);

    let director = draft.director.trim();
    check_length(&mut errors, "director", director, 3, 100, false);

    let year_text = draft.year.trim();
    let year_max = current_year + 1;
    let mut year = None;
    if year_text.is_empty() {
        errors.add("year", "Year is required");
    } else if year_text.len() != 4 || !year_text.bytes().all(|b| b.is_ascii_digit()) {
        errors.add("year", "Must have 4 digits (e.g. 2023)");
    } else {
        match year_text.parse::<i32>() {
            Ok(y) if (YEAR_MIN..=year_max).contains(&y) => year = Some(y),
            _ => errors.add("year", format!("Between {} and {}", YEAR_MIN, year_max)),
        }
    }

    let genres_text = draft.genres.trim();
    check_length(&mut errors, "genres", genres_text, 3, 150, true);

    let poster = draft.poster.trim();
    if !poster.is_empty() && !IMAGE_URL.is_match(poster) {
        errors.add(
            "poster",
            "Must be an http(s) image URL (.jpg, .jpeg, .png, .webp)",
        );
    }

    let overview = draft.overview.trim();
    check_length(&mut errors, "overview", overview, 10, 500, false);

    let rating_text = draft.rating.trim();
    let mut rating = None;
    if !rating_text.is_empty() {
        match rating_text.parse::<f64>() {
            Ok(r) if r.is_nan() => errors.add("rating", "Must be a number"),
            Ok(r) if !(0.0..=10.0).contains(&r) => errors.add("rating", "Between 0 and 10"),
            Ok(r) => rating = Some(((r * 10.0).round() / 10.0) as f32),
            Err(_) => errors.add("rating", "Must be a number"),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(MoviePayload {
        title: title.to_string(),
        year,
        genres: genres_text
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect(),
        director: non_empty(director),
        age_rating: non_empty(draft.age_rating.trim()),
        overview: non_empty(overview),
        poster: non_empty(poster),
        rating,
    })
}

fn check_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
    required: bool,
) {
    let len = value.chars().count();
    if len == 0 {
        if required {
            errors.add(field, format!("{} is required", capitalize(field)));
        }
    } else if len < min {
        errors.add(field, format!("At least {} characters", min));
    } else if len > max {
        errors.add(field, format!("At most {} characters", max));
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

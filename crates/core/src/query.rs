//! Single-search-box query classification.
//!
//! A raw search term is resolved to one of three catalog fields:
//! a four digit year, one of the canonical genres, or a free-text title.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Genre labels as displayed, with their accents.
pub const CANONICAL_GENRES: &[&str] = &[
    "acción",
    "drama",
    "comedia",
    "terror",
    "romance",
    "aventura",
    "animación",
    "thriller",
    "suspenso",
    "ciencia ficción",
    "sci-fi",
    "fantasía",
    "documental",
    "biografía",
    "crimen",
    "bélico",
];

/// Normalized form -> canonical label.
static GENRE_INDEX: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    CANONICAL_GENRES
        .iter()
        .map(|label| (normalize(label), *label))
        .collect()
});

/// Which catalog field a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryField {
    Year,
    Genre,
    Title,
}

impl QueryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryField::Year => "year",
            QueryField::Genre => "genre",
            QueryField::Title => "title",
        }
    }
}

impl fmt::Display for QueryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified search term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub field: QueryField,
    pub value: String,
}

impl QueryDescriptor {
    pub fn title(value: impl Into<String>) -> Self {
        Self {
            field: QueryField::Title,
            value: value.into(),
        }
    }

    pub fn genre(value: impl Into<String>) -> Self {
        Self {
            field: QueryField::Genre,
            value: value.into(),
        }
    }

    pub fn year(value: impl Into<String>) -> Self {
        Self {
            field: QueryField::Year,
            value: value.into(),
        }
    }
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.field, self.value)
    }
}

/// Lowercase, strip diacritics, turn hyphens into spaces, collapse whitespace.
pub fn normalize(input: &str) -> String {
    let folded: String = input
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == '-' { ' ' } else { c })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True for exactly four ASCII digits.
pub fn is_year(value: &str) -> bool {
    value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Canonical (accented) label for a genre typed in any case/accent/hyphen form.
pub fn canonical_genre(input: &str) -> Option<&'static str> {
    GENRE_INDEX.get(&normalize(input)).copied()
}

/// Classify a raw search term.
///
/// Returns `None` for empty or whitespace-only input; callers must not
/// search in that case.
pub fn classify(raw: &str) -> Option<QueryDescriptor> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let simple = normalize(trimmed);

    if is_year(&simple) {
        return Some(QueryDescriptor::year(simple));
    }

    if let Some(label) = GENRE_INDEX.get(&simple) {
        return Some(QueryDescriptor::genre(*label));
    }

    Some(QueryDescriptor::title(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Ciencia-Ficción  "), "ciencia ficcion");
        assert_eq!(normalize("SCI-FI"), "sci fi");
        assert_eq!(normalize("a \t  b\n c"), "a b c");
        assert_eq!(normalize("Animación"), "animacion");
    }

    #[test]
    fn test_classify_year() {
        assert_eq!(classify("2023"), Some(QueryDescriptor::year("2023")));
        assert_eq!(classify("  1999 "), Some(QueryDescriptor::year("1999")));
        for s in ["0000", "1888", "9999", "0420"] {
            assert_eq!(classify(s).unwrap().field, QueryField::Year, "{s}");
        }
    }

    #[test]
    fn test_numeric_non_years_are_titles() {
        assert_eq!(classify("99"), Some(QueryDescriptor::title("99")));
        assert_eq!(classify("20233"), Some(QueryDescriptor::title("20233")));
        assert_eq!(classify("1917 "), Some(QueryDescriptor::year("1917")));
        assert_eq!(classify("2001 odisea").unwrap().field, QueryField::Title);
    }

    #[test]
    fn test_classify_genre_restores_accents() {
        assert_eq!(classify("Bélico"), Some(QueryDescriptor::genre("bélico")));
        assert_eq!(classify("belico"), Some(QueryDescriptor::genre("bélico")));
        assert_eq!(classify("BELICO"), Some(QueryDescriptor::genre("bélico")));
        assert_eq!(
            classify("ciencia-ficcion"),
            Some(QueryDescriptor::genre("ciencia ficción"))
        );
        assert_eq!(
            classify("Ciencia   Ficción"),
            Some(QueryDescriptor::genre("ciencia ficción"))
        );
        assert_eq!(classify("sci fi"), Some(QueryDescriptor::genre("sci-fi")));
        assert_eq!(classify("Accion"), Some(QueryDescriptor::genre("acción")));
    }

    #[test]
    fn test_every_canonical_genre_classifies_as_itself() {
        for label in CANONICAL_GENRES {
            let upper = label.to_uppercase();
            let stripped = normalize(label);
            for input in [label.to_string(), upper, stripped] {
                let descriptor = classify(&input).unwrap();
                assert_eq!(descriptor.field, QueryField::Genre, "{input}");
                assert_eq!(descriptor.value, *label, "{input}");
            }
        }
    }

    #[test]
    fn test_genre_index_keys_are_unique() {
        assert_eq!(GENRE_INDEX.len(), CANONICAL_GENRES.len());
    }

    #[test]
    fn test_classify_title_keeps_original_text() {
        assert_eq!(
            classify("Interstellar"),
            Some(QueryDescriptor::title("Interstellar"))
        );
        assert_eq!(
            classify("  El Laberinto del Fauno "),
            Some(QueryDescriptor::title("El Laberinto del Fauno"))
        );
        assert_eq!(classify("dramas").unwrap().field, QueryField::Title);
    }

    #[test]
    fn test_classify_empty_input() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   \t"), None);
    }

    #[test]
    fn test_canonical_genre_lookup() {
        assert_eq!(canonical_genre("FANTASIA"), Some("fantasía"));
        assert_eq!(canonical_genre("western"), None);
    }

    #[test]
    fn test_is_year() {
        assert!(is_year("2024"));
        assert!(!is_year("202"));
        assert!(!is_year("２０２４"));
        assert!(!is_year("20a4"));
    }
}

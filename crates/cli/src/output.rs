//! Text rendering for command output.

use anyhow::Result;
use serde::Serialize;

use filmoteca_core::{
    catalog::{MovieSummary, ResultPage},
    config::ImagesConfig,
    external_catalog::ExternalCandidate,
    images::{proxy_image_url, tmdb_poster_url},
    search::{SearchOutcome, SearchResults},
};

use crate::cli::OutputFormat;

/// Print `value` as JSON, or run `text` for the human format.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce()) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(),
    }
    Ok(())
}

/// `  m1  Alien (1979 · terror · R)`
pub fn movie_line(movie: &MovieSummary) -> String {
    let subtitle = movie.subtitle();
    if subtitle.is_empty() {
        format!("  {:<26}  {}", movie.id, movie.display_title())
    } else {
        format!("  {:<26}  {} ({})", movie.id, movie.display_title(), subtitle)
    }
}

/// `Page 2 of 5 (53 movies)`
pub fn page_footer(page: &ResultPage) -> String {
    let noun = if page.total_docs == 1 { "movie" } else { "movies" };
    format!(
        "Page {} of {} ({} {})",
        page.page, page.total_pages, page.total_docs, noun
    )
}

pub fn movie_detail(movie: &MovieSummary, images: &ImagesConfig) -> Vec<String> {
    let mut lines = vec![movie.display_title().to_string()];
    let subtitle = movie.subtitle();
    if !subtitle.is_empty() {
        lines.push(subtitle);
    }
    if let Some(director) = &movie.director {
        lines.push(format!("Director: {}", director));
    }
    if let Some(rating) = movie.rating {
        lines.push(format!("Rating: {:.1}/10", rating));
    }
    if let Some(poster) = movie.poster.as_deref().and_then(|p| proxy_image_url(images, p)) {
        lines.push(format!("Poster: {}", poster));
    }
    if let Some(overview) = &movie.overview {
        lines.push(String::new());
        lines.push(overview.clone());
    }
    lines.push(format!("Id: {}", movie.id));
    lines
}

/// `  [603] The Matrix (1999)`, with rating and poster when known.
pub fn candidate_line(candidate: &ExternalCandidate, images: &ImagesConfig) -> String {
    let id = candidate
        .provider_id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!("  [{}] {}", id, candidate.display_title());
    if let Some(year) = candidate.year {
        line.push_str(&format!(" ({})", year));
    }
    if let Some(rating) = candidate.rating_label() {
        line.push_str(&format!(" · {}", rating));
    }
    if let Some(poster) = candidate
        .poster
        .as_deref()
        .and_then(|p| tmdb_poster_url(images, p))
    {
        line.push_str(&format!("\n      {}", poster));
    }
    line
}

pub fn print_page(page: &ResultPage) {
    for movie in &page.items {
        println!("{}", movie_line(movie));
    }
    println!("{}", page_footer(page));
}

pub fn print_search(results: &SearchResults) {
    match &results.outcome {
        SearchOutcome::Direct(items) => {
            println!("{} result(s) for {}:", items.len(), results.query);
            for movie in items {
                println!("{}", movie_line(movie));
            }
        }
        SearchOutcome::Related(items) => {
            println!(
                "No {} matches, related titles for \"{}\":",
                results.query.field, results.query.value
            );
            for movie in items {
                println!("{}", movie_line(movie));
            }
        }
        SearchOutcome::NoResults => println!("No results for {}", results.query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filmoteca_core::testing::fixtures;

    #[test]
    fn test_movie_line() {
        let movie = fixtures::movie("m1", "Alien", 1979, &["terror"]);
        assert_eq!(
            movie_line(&movie),
            format!("  {:<26}  Alien (1979 · terror · PG-13)", "m1")
        );
    }

    #[test]
    fn test_page_footer() {
        let mut page = ResultPage::empty();
        page.total_docs = 1;
        assert_eq!(page_footer(&page), "Page 1 of 1 (1 movie)");
    }

    #[test]
    fn test_candidate_line_resolves_poster() {
        let candidate = fixtures::candidate("603", "The Matrix", 1999);
        let line = candidate_line(&candidate, &ImagesConfig::default());
        assert!(line.starts_with("  [603] The Matrix (1999)"));
        assert!(line.contains("https://image.tmdb.org/t/p/w185/603.jpg"));
    }

    #[test]
    fn test_detail_proxies_poster() {
        let mut movie = fixtures::movie("m1", "Alien", 1979, &[]);
        movie.poster = Some("https://img.example.com/alien.jpg".to_string());
        let lines = movie_detail(&movie, &ImagesConfig::default());
        assert!(lines
            .iter()
            .any(|l| l.starts_with("Poster: https://images.weserv.nl/?url=img.example.com")));
        assert_eq!(lines.last().map(String::as_str), Some("Id: m1"));
    }
}

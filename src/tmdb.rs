use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Settings;

pub const API_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Placeholder shown wherever a year cannot be derived.
pub const UNKNOWN_YEAR: &str = "Desconhecido";

// ── Media type ─────────────────────────────────────────────────────────────

/// The two search categories TMDB exposes that we care about.
/// Wire values match the API path segments ("movie" / "tv").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "movie")]
    Movie,
    #[serde(rename = "tv")]
    Series,
}

impl MediaType {
    /// Path segment for /search/{segment}.
    pub fn path_segment(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "tv",
        }
    }

    /// Localized label used in the note front matter ("tipo").
    pub fn label(&self) -> &'static str {
        match self {
            MediaType::Movie => "Filme",
            MediaType::Series => "Série",
        }
    }

    /// Localized tag written to the note's tag list.
    pub fn tag(&self) -> &'static str {
        match self {
            MediaType::Movie => "filme",
            MediaType::Series => "série",
        }
    }
}

// ── Wire types ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// One item from a TMDB search response. Movies carry `title`/`release_date`,
/// series carry `name`/`first_air_date`; everything else may be missing or
/// empty depending on the catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

impl SearchResult {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Sem título")
    }

    /// Release date for movies, first-air date for series. TMDB sends `""`
    /// for unknown dates, which counts as absent.
    pub fn date(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .filter(|d| !d.is_empty())
            .or_else(|| self.first_air_date.as_deref().filter(|d| !d.is_empty()))
    }

    /// Four-digit year parsed from the ISO date, if any.
    pub fn year(&self) -> Option<String> {
        self.date()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(|d| d.year().to_string())
    }

    /// Year for display, falling back to the fixed placeholder.
    pub fn display_year(&self) -> String {
        self.year().unwrap_or_else(|| UNKNOWN_YEAR.to_string())
    }

    /// Full w500 poster URL, or None when the item has no poster.
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", POSTER_BASE_URL, p))
    }
}

// ── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SearchError {
    /// Empty or whitespace-only query, rejected before any I/O.
    #[error("a busca não pode ser vazia")]
    EmptyQuery,
    /// Request failed or the body was not the expected JSON.
    #[error("erro ao buscar dados")]
    Network(String),
    /// Well-formed response with zero items. Informational, not a failure.
    #[error("nenhum resultado encontrado")]
    NoResults,
    /// A newer search was submitted while this one was in flight.
    #[error("busca substituída por uma mais recente")]
    Superseded,
}

// ── Search ─────────────────────────────────────────────────────────────────

/// Build the /search/{movie|tv} URL with the API key, the URL-encoded query
/// and the configured result language.
pub fn build_search_url(settings: &Settings, query: &str, media_type: MediaType) -> Url {
    let mut url = Url::parse(API_BASE_URL).expect("static base URL");
    url.path_segments_mut()
        .expect("base URL has a path")
        .push("search")
        .push(media_type.path_segment());
    url.query_pairs_mut()
        .append_pair("api_key", &settings.api_key)
        .append_pair("query", query)
        .append_pair("language", &settings.language);
    url
}

/// Issue exactly one search request and decode the result list.
/// No retry, no pagination, no timeout.
pub async fn search(
    settings: &Settings,
    query: &str,
    media_type: MediaType,
) -> Result<Vec<SearchResult>, SearchError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SearchError::EmptyQuery);
    }

    let url = build_search_url(settings, query, media_type);

    let response = reqwest::get(url).await.map_err(|e| {
        tracing::error!(error = %e, "TMDB request failed");
        SearchError::Network(e.to_string())
    })?;

    let body = response
        .error_for_status()
        .map_err(|e| {
            tracing::error!(error = %e, "TMDB returned an error status");
            SearchError::Network(e.to_string())
        })?
        .json::<SearchResponse>()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "TMDB response was not valid JSON");
            SearchError::Network(e.to_string())
        })?;

    if body.results.is_empty() {
        return Err(SearchError::NoResults);
    }

    Ok(body.results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            api_key: "test-key".to_string(),
            language: "pt-BR".to_string(),
            vault_path: String::new(),
            notes_folder: String::new(),
        }
    }

    fn result_with_dates(release: Option<&str>, first_air: Option<&str>) -> SearchResult {
        SearchResult {
            id: 1,
            title: None,
            name: None,
            release_date: release.map(String::from),
            first_air_date: first_air.map(String::from),
            poster_path: None,
            overview: None,
            genre_ids: vec![],
        }
    }

    #[test]
    fn test_build_search_url_movie() {
        let url = build_search_url(&settings(), "Matrix", MediaType::Movie);
        assert_eq!(url.path(), "/3/search/movie");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("api_key".to_string(), "test-key".to_string())));
        assert!(pairs.contains(&("query".to_string(), "Matrix".to_string())));
        assert!(pairs.contains(&("language".to_string(), "pt-BR".to_string())));
    }

    #[test]
    fn test_build_search_url_series_segment() {
        let url = build_search_url(&settings(), "Dark", MediaType::Series);
        assert_eq!(url.path(), "/3/search/tv");
    }

    #[test]
    fn test_build_search_url_encodes_query() {
        let url = build_search_url(&settings(), "O Senhor dos Anéis", MediaType::Movie);
        let encoded = url.query().unwrap();
        // Spaces and accents must not appear raw in the query string
        assert!(!encoded.contains(' '));
        assert!(!encoded.contains('é'));

        let (_, decoded) = url
            .query_pairs()
            .find(|(k, _)| k == "query")
            .unwrap();
        assert_eq!(decoded, "O Senhor dos Anéis");
    }

    #[test]
    fn test_year_from_release_date() {
        let item = result_with_dates(Some("2014-07-30"), None);
        assert_eq!(item.year().as_deref(), Some("2014"));
        assert_eq!(item.display_year(), "2014");
    }

    #[test]
    fn test_year_falls_back_to_first_air_date() {
        let item = result_with_dates(None, Some("2008-01-20"));
        assert_eq!(item.year().as_deref(), Some("2008"));
    }

    #[test]
    fn test_year_missing_uses_placeholder() {
        let item = result_with_dates(None, None);
        assert_eq!(item.year(), None);
        assert_eq!(item.display_year(), UNKNOWN_YEAR);
    }

    #[test]
    fn test_year_empty_string_counts_as_missing() {
        let item = result_with_dates(Some(""), None);
        assert_eq!(item.year(), None);
    }

    #[test]
    fn test_year_garbage_date_counts_as_missing() {
        let item = result_with_dates(Some("em breve"), None);
        assert_eq!(item.year(), None);
    }

    #[test]
    fn test_display_title_prefers_title_over_name() {
        let mut item = result_with_dates(None, None);
        item.title = Some("The Matrix".to_string());
        item.name = Some("Matrix (TV)".to_string());
        assert_eq!(item.display_title(), "The Matrix");

        item.title = None;
        assert_eq!(item.display_title(), "Matrix (TV)");
    }

    #[test]
    fn test_poster_url() {
        let mut item = result_with_dates(None, None);
        assert_eq!(item.poster_url(), None);

        item.poster_path = Some("/x.jpg".to_string());
        assert_eq!(
            item.poster_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/x.jpg")
        );
    }

    #[test]
    fn test_media_type_wire_values() {
        assert_eq!(
            serde_json::from_str::<MediaType>("\"movie\"").unwrap(),
            MediaType::Movie
        );
        assert_eq!(
            serde_json::from_str::<MediaType>("\"tv\"").unwrap(),
            MediaType::Series
        );
        assert_eq!(MediaType::Movie.label(), "Filme");
        assert_eq!(MediaType::Series.label(), "Série");
        assert_eq!(MediaType::Series.tag(), "série");
    }

    #[test]
    fn test_deserialize_search_item_with_missing_fields() {
        let raw = r#"{ "id": 603, "title": "The Matrix", "release_date": "1999-03-31" }"#;
        let item: SearchResult = serde_json::from_str(raw).unwrap();
        assert_eq!(item.id, 603);
        assert_eq!(item.display_title(), "The Matrix");
        assert!(item.genre_ids.is_empty());
        assert_eq!(item.poster_url(), None);
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query_without_io() {
        // Runs without any network available; the validation short-circuits
        // before a request is built.
        for q in ["", "   ", "\t\n"] {
            let err = search(&settings(), q, MediaType::Movie).await.unwrap_err();
            assert!(matches!(err, SearchError::EmptyQuery));
        }
    }
}

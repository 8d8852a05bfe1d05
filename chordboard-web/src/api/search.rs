//! Search page and autocomplete suggestions

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};

use chordboard_common::db::SongSummary;

use super::pages::{escape_html, page_shell, PageError};
use crate::AppState;

/// Maximum autocomplete suggestions returned.
const SUGGESTION_LIMIT: i64 = 10;

/// What a search query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    All,
    Title,
    Artist,
    Chords,
}

impl Default for SearchType {
    fn default() -> Self {
        SearchType::All
    }
}

impl From<&str> for SearchType {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "title" => SearchType::Title,
            "artist" => SearchType::Artist,
            "chords" => SearchType::Chords,
            // Unrecognized values search everything instead of erroring
            _ => SearchType::All,
        }
    }
}

impl<'de> Deserialize<'de> for SearchType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SearchType::from(value.as_str()))
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default, rename = "type")]
    pub search_type: SearchType,
}

/// GET /search?q=...&type=all|title|artist|chords
pub async fn search_page(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, PageError> {
    let term = query.q.trim();

    let mut body = String::from("<h1>Search</h1>\n");
    body.push_str(&format!(
        "<form action=\"/search\" method=\"get\">\
         <input type=\"text\" name=\"q\" value=\"{}\">\
         <select name=\"type\">\
         <option value=\"all\">Everything</option>\
         <option value=\"title\">Title</option>\
         <option value=\"artist\">Artist</option>\
         <option value=\"chords\">Chords</option>\
         </select>\
         <button type=\"submit\">Search</button></form>\n",
        escape_html(term)
    ));

    if term.is_empty() {
        body.push_str("<p class=\"muted\">Type something to search for.</p>\n");
        return Ok(Html(page_shell("Search", &body)));
    }

    let results = run_search(&state, term, query.search_type).await?;
    body.push_str(&format!(
        "<p class=\"stats\">{} result(s) for &ldquo;{}&rdquo;</p>\n",
        results.len(),
        escape_html(term)
    ));

    if !results.is_empty() {
        body.push_str(
            "<table>\n<tr><th>Year</th><th>Title</th><th>Artist</th><th>Chords</th></tr>\n",
        );
        for song in &results {
            body.push_str(&format!(
                "<tr><td>{}</td><td><a href=\"/song/{}\">{}</a></td><td>{}</td><td>{}</td></tr>\n",
                song.year,
                song.id,
                escape_html(&song.title),
                escape_html(&song.artist),
                song.chord_progression
                    .as_deref()
                    .map(|p| escape_html(p))
                    .unwrap_or_else(|| "&ndash;".to_string()),
            ));
        }
        body.push_str("</table>\n");
    }
    body.push_str("<p><a href=\"/\">&larr; All decades</a></p>\n");

    Ok(Html(page_shell("Search", &body)))
}

async fn run_search(
    state: &AppState,
    term: &str,
    search_type: SearchType,
) -> Result<Vec<SongSummary>, PageError> {
    let pattern = format!("%{}%", term);
    const COLUMNS: &str = "id, title, artist, year, position, chord_progression";

    let sql = match search_type {
        SearchType::Title => format!(
            "SELECT {COLUMNS} FROM songs WHERE title LIKE ? ORDER BY year, position"
        ),
        SearchType::Artist => format!(
            "SELECT {COLUMNS} FROM songs WHERE artist LIKE ? ORDER BY year, position"
        ),
        SearchType::Chords => format!(
            "SELECT {COLUMNS} FROM songs WHERE chord_progression LIKE ? ORDER BY year, position"
        ),
        SearchType::All => format!(
            "SELECT {COLUMNS} FROM songs \
             WHERE title LIKE ?1 OR artist LIKE ?1 OR chord_progression LIKE ?1 \
             ORDER BY year, position"
        ),
    };

    let results = sqlx::query_as(&sql)
        .bind(&pattern)
        .fetch_all(&state.db)
        .await?;
    Ok(results)
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

/// GET /api/suggestions?q=...&type=...
///
/// Title and artist completions for the search box. An empty query returns an
/// empty list rather than an error.
pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SuggestionsResponse>, PageError> {
    let term = query.q.trim();
    if term.is_empty() {
        return Ok(Json(SuggestionsResponse {
            suggestions: Vec::new(),
        }));
    }

    let pattern = format!("%{}%", term);
    let sql = match query.search_type {
        SearchType::Title | SearchType::Chords => {
            "SELECT DISTINCT title FROM songs WHERE title LIKE ? ORDER BY title LIMIT ?"
        }
        SearchType::Artist => {
            "SELECT DISTINCT artist FROM songs WHERE artist LIKE ? ORDER BY artist LIMIT ?"
        }
        SearchType::All => {
            "SELECT DISTINCT title FROM songs WHERE title LIKE ?1 \
             UNION SELECT DISTINCT artist FROM songs WHERE artist LIKE ?1 \
             ORDER BY 1 LIMIT ?2"
        }
    };

    let rows: Vec<(String,)> = sqlx::query_as(sql)
        .bind(&pattern)
        .bind(SUGGESTION_LIMIT)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(SuggestionsResponse {
        suggestions: rows.into_iter().map(|(s,)| s).collect(),
    }))
}

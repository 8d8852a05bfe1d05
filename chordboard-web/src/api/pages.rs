//! HTML pages: decade index, decade listing, song detail
//!
//! Pages are rendered by small `format!` templates. Everything pulled from
//! the database or the filesystem goes through [`escape_html`] before it is
//! interpolated.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chordboard_common::db::{DecadeSummary, Song, SongSummary};

use crate::tab;
use crate::AppState;

/// Decades the dataset covers.
const FIRST_DECADE: i64 = 1950;
const LAST_DECADE: i64 = 2020;

/// Page rendering errors
#[derive(Debug)]
pub enum PageError {
    NotFound(String),
    Database(String),
}

impl From<sqlx::Error> for PageError {
    fn from(e: sqlx::Error) -> Self {
        PageError::Database(e.to_string())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            PageError::NotFound(what) => (StatusCode::NOT_FOUND, what),
            PageError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = page_shell(
            "Error",
            &format!("<p class=\"error\">{}</p>", escape_html(&message)),
        );
        (status, Html(body)).into_response()
    }
}

/// GET /
///
/// Decade index: one card per decade with song counts.
pub async fn decade_index(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let decades: Vec<DecadeSummary> = sqlx::query_as(
        "SELECT (year / 10) * 10 AS decade, \
                COUNT(*) AS song_count, \
                COUNT(CASE WHEN chord_progression IS NOT NULL THEN 1 END) AS with_chords, \
                MIN(year) AS first_year, \
                MAX(year) AS last_year \
         FROM songs GROUP BY decade ORDER BY decade",
    )
    .fetch_all(&state.db)
    .await?;

    let mut body = String::from("<h1>Billboard #1 Hits by Decade</h1>\n<ul class=\"decades\">\n");
    for d in &decades {
        body.push_str(&format!(
            "<li><a href=\"/decade/{decade}\">{decade}s</a> \
             ({first}&ndash;{last}) &mdash; {count} songs, {chords} with chords</li>\n",
            decade = d.decade,
            first = d.first_year,
            last = d.last_year,
            count = d.song_count,
            chords = d.with_chords,
        ));
    }
    body.push_str("</ul>\n");
    body.push_str("<form action=\"/search\" method=\"get\">\
                   <input type=\"text\" name=\"q\" placeholder=\"Search songs...\">\
                   <button type=\"submit\">Search</button></form>\n");

    Ok(Html(page_shell("Chordboard", &body)))
}

/// GET /decade/:decade
pub async fn decade_view(
    State(state): State<AppState>,
    Path(decade): Path<i64>,
) -> Result<Html<String>, PageError> {
    if decade % 10 != 0 || !(FIRST_DECADE..=LAST_DECADE).contains(&decade) {
        return Err(PageError::NotFound(format!("No such decade: {}", decade)));
    }

    let songs: Vec<SongSummary> = sqlx::query_as(
        "SELECT id, title, artist, year, position, chord_progression \
         FROM songs WHERE year >= ? AND year < ? ORDER BY year, position",
    )
    .bind(decade)
    .bind(decade + 10)
    .fetch_all(&state.db)
    .await?;

    let (total, with_chords, with_lyrics): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), \
                COUNT(CASE WHEN chord_progression IS NOT NULL THEN 1 END), \
                COUNT(CASE WHEN has_lyrics = 1 THEN 1 END) \
         FROM songs WHERE year >= ? AND year < ?",
    )
    .bind(decade)
    .bind(decade + 10)
    .fetch_one(&state.db)
    .await?;

    let mut body = format!("<h1>The {}s</h1>\n", decade);
    body.push_str(&format!(
        "<p class=\"stats\">{} songs &middot; {} with chords &middot; {} with lyrics</p>\n",
        total, with_chords, with_lyrics
    ));

    body.push_str("<table>\n<tr><th>Year</th><th>#</th><th>Title</th><th>Artist</th><th>Chords</th></tr>\n");
    for song in &songs {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td>\
             <td><a href=\"/song/{}\">{}</a></td><td>{}</td><td>{}</td></tr>\n",
            song.year,
            song.position,
            song.id,
            escape_html(&song.title),
            escape_html(&song.artist),
            song.chord_progression
                .as_deref()
                .map(|p| escape_html(p))
                .unwrap_or_else(|| "&ndash;".to_string()),
        ));
    }
    body.push_str("</table>\n<p><a href=\"/\">&larr; All decades</a></p>\n");

    Ok(Html(page_shell(&format!("The {}s", decade), &body)))
}

/// GET /song/:id
pub async fn song_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, PageError> {
    let song: Song = sqlx::query_as(
        "SELECT id, title, artist, year, position, genre_broad, genre_specific, \
                time_signature, tonic, mode, bpm, audio_link, has_midi_files, \
                has_lyrics, folder_path, midi_file, chord_progression \
         FROM songs WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| PageError::NotFound(format!("No such song: {}", id)))?;

    let mut body = format!(
        "<h1>{}</h1>\n<h2>{}</h2>\n",
        escape_html(&song.title),
        escape_html(&song.artist)
    );

    body.push_str("<dl>\n");
    push_detail(&mut body, "Year", Some(&song.year.to_string()));
    push_detail(&mut body, "Chart position", Some(&format!("#{}", song.position)));
    push_detail(&mut body, "Genre", song.genre_broad.as_deref());
    push_detail(&mut body, "Time signature", song.time_signature.as_deref());
    push_detail(&mut body, "Key", key_description(&song).as_deref());
    push_detail(&mut body, "BPM", song.bpm.map(|b| b.to_string()).as_deref());
    body.push_str("</dl>\n");

    if let Some(link) = &song.audio_link {
        body.push_str(&format!(
            "<p><a href=\"{0}\" rel=\"noopener\">Listen</a></p>\n",
            escape_html(link)
        ));
    }

    match &song.chord_progression {
        Some(progression) => {
            body.push_str(&format!(
                "<h3>Chord progression</h3>\n<p class=\"chords\">{}</p>\n",
                escape_html(progression)
            ));
            render_tablature(&mut body, progression);
        }
        None => {
            body.push_str("<p class=\"muted\">No chord progression available for this song.</p>\n");
        }
    }

    if let Some(lyrics) = load_lyrics(&state, &song) {
        body.push_str(&format!(
            "<h3>Lyrics</h3>\n<pre class=\"lyrics\">{}</pre>\n",
            escape_html(&lyrics)
        ));
    }

    body.push_str(&format!(
        "<p><a href=\"/decade/{}\">&larr; Back to the {}s</a></p>\n",
        (song.year / 10) * 10,
        (song.year / 10) * 10
    ));

    Ok(Html(page_shell(&song.title, &body)))
}

fn render_tablature(body: &mut String, progression: &str) {
    let Some(tab) = tab::render_progression(progression) else {
        return;
    };

    if tab.lines.is_empty() {
        body.push_str("<p class=\"muted\">No tablature available for these chords.</p>\n");
        return;
    }

    body.push_str(&format!(
        "<h3>Guitar tab <span class=\"difficulty\">({})</span></h3>\n",
        tab.difficulty
    ));
    body.push_str("<pre class=\"tab\">");
    for line in &tab.lines {
        body.push_str(&escape_html(line));
        body.push('\n');
    }
    body.push_str("</pre>\n");

    if !tab.missing.is_empty() {
        body.push_str(&format!(
            "<p class=\"muted\">No fingering on file for: {}</p>\n",
            escape_html(&tab.missing.join(", "))
        ));
    }
}

/// Read the song's lyric file from the dataset checkout, when configured.
fn load_lyrics(state: &AppState, song: &Song) -> Option<String> {
    if !song.has_lyrics {
        return None;
    }
    let root = state.dataset_root.as_ref()?;
    let folder = song.folder_path.as_ref()?;

    let filename = format!("{}_{:02}_lyrics.txt", song.year, song.position);
    let path = root.join(folder).join(filename);

    match std::fs::read_to_string(&path) {
        Ok(contents) => Some(contents.trim().to_string()),
        Err(e) => {
            tracing::debug!("No lyrics at {}: {}", path.display(), e);
            None
        }
    }
}

fn key_description(song: &Song) -> Option<String> {
    match (&song.tonic, &song.mode) {
        (Some(tonic), Some(mode)) => Some(format!("{} {}", tonic, mode)),
        (Some(tonic), None) => Some(tonic.clone()),
        _ => None,
    }
}

fn push_detail(body: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        body.push_str(&format!(
            "<dt>{}</dt><dd>{}</dd>\n",
            label,
            escape_html(value)
        ));
    }
}

/// Wrap page content in the shared HTML shell.
pub fn page_shell(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} &middot; Chordboard</title>\n\
         <style>\n\
         body {{ font-family: Georgia, serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         th, td {{ text-align: left; padding: 0.3rem 0.6rem; border-bottom: 1px solid #ddd; }}\n\
         pre.tab, pre.lyrics {{ background: #f6f6f6; padding: 1rem; overflow-x: auto; }}\n\
         .muted {{ color: #777; }}\n\
         .error {{ color: #a00; }}\n\
         </style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = escape_html(title),
        body = body,
    )
}

/// Escape text for interpolation into HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

//! Song-to-chart matching
//!
//! Links BiMMuDa songs to Billboard chart entries. An exact pass on cleaned
//! title and artist runs first; the leftovers go through Jaro-Winkler fuzzy
//! scoring with a combined title/artist weighting. Each chart entry links to
//! at most one song.

use std::collections::HashSet;

use strsim::jaro_winkler;

/// Fuzzy matching tunables.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    pub title_weight: f64,
    pub artist_weight: f64,
    pub threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            title_weight: 0.7,
            artist_weight: 0.3,
            threshold: 0.8,
        }
    }
}

/// A song row offered for matching.
#[derive(Debug, Clone)]
pub struct SongCandidate {
    pub id: i64,
    pub title: String,
    pub artist: String,
}

/// A Billboard chart row offered for matching.
#[derive(Debug, Clone)]
pub struct ChartCandidate {
    pub song_id: i64,
    pub title: String,
    pub artist: String,
}

/// How a link was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Exact,
    Fuzzy,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Fuzzy => "fuzzy",
        }
    }
}

/// One established song-to-chart link.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub song_id: i64,
    pub billboard_song_id: i64,
    pub match_type: MatchType,
    pub confidence: f64,
}

/// Normalize a song title for comparison.
///
/// Lowercases, folds smart quotes and ampersands, and strips a parenthetical
/// suffix so "Song (Remastered)" matches "Song".
pub fn clean_song_title(title: &str) -> String {
    let mut title = title
        .trim()
        .replace('\u{2019}', "'")
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace('&', "and");

    if let Some(idx) = title.find('(') {
        title.truncate(idx);
    }

    title.trim().to_lowercase()
}

/// Normalize an artist name for comparison.
pub fn clean_artist_name(artist: &str) -> String {
    artist
        .trim()
        .replace('&', "and")
        .replace("feat.", "featuring")
        .replace("ft.", "featuring")
        .replace(" w/ ", " with ")
        .replace(" vs ", " versus ")
        .to_lowercase()
}

/// Match songs against chart entries.
///
/// Exact matches on cleaned fields first, then a fuzzy pass over whatever is
/// left. Both passes consume chart entries, so no entry links twice, and the
/// fuzzy pass takes the best-scoring entry above the threshold.
pub fn match_songs(
    songs: &[SongCandidate],
    chart: &[ChartCandidate],
    config: &MatchConfig,
) -> Vec<MatchOutcome> {
    let cleaned_chart: Vec<(String, String)> = chart
        .iter()
        .map(|c| (clean_song_title(&c.title), clean_artist_name(&c.artist)))
        .collect();

    let mut used_chart: HashSet<usize> = HashSet::new();
    let mut outcomes = Vec::new();
    let mut unmatched: Vec<(&SongCandidate, String, String)> = Vec::new();

    // Exact pass
    for song in songs {
        let title = clean_song_title(&song.title);
        let artist = clean_artist_name(&song.artist);

        let exact = cleaned_chart
            .iter()
            .enumerate()
            .find(|(i, (ct, ca))| !used_chart.contains(i) && *ct == title && *ca == artist);

        match exact {
            Some((i, _)) => {
                used_chart.insert(i);
                outcomes.push(MatchOutcome {
                    song_id: song.id,
                    billboard_song_id: chart[i].song_id,
                    match_type: MatchType::Exact,
                    confidence: 1.0,
                });
            }
            None => unmatched.push((song, title, artist)),
        }
    }

    // Fuzzy pass over the remainder
    for (song, title, artist) in unmatched {
        let mut best: Option<(usize, f64)> = None;

        for (i, (ct, ca)) in cleaned_chart.iter().enumerate() {
            if used_chart.contains(&i) {
                continue;
            }

            let title_score = jaro_winkler(&title, ct);
            let artist_score = jaro_winkler(&artist, ca);
            let combined = title_score * config.title_weight + artist_score * config.artist_weight;

            if combined > config.threshold
                && best.map(|(_, score)| combined > score).unwrap_or(true)
            {
                best = Some((i, combined));
            }
        }

        if let Some((i, score)) = best {
            used_chart.insert(i);
            tracing::debug!(
                song = %song.title,
                chart = %chart[i].title,
                score,
                "Fuzzy match"
            );
            outcomes.push(MatchOutcome {
                song_id: song.id,
                billboard_song_id: chart[i].song_id,
                match_type: MatchType::Fuzzy,
                confidence: score,
            });
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: i64, title: &str, artist: &str) -> SongCandidate {
        SongCandidate {
            id,
            title: title.to_string(),
            artist: artist.to_string(),
        }
    }

    fn chart(song_id: i64, title: &str, artist: &str) -> ChartCandidate {
        ChartCandidate {
            song_id,
            title: title.to_string(),
            artist: artist.to_string(),
        }
    }

    #[test]
    fn cleaning_normalizes_quotes_ampersands_and_parentheticals() {
        assert_eq!(clean_song_title("Rock & Roll (Live)"), "rock and roll");
        assert_eq!(clean_song_title("Don\u{2019}t Stop"), "don't stop");
        assert_eq!(
            clean_artist_name("Bill Haley & His Comets"),
            "bill haley and his comets"
        );
        assert_eq!(
            clean_artist_name("Artist feat. Someone"),
            "artist featuring someone"
        );
    }

    #[test]
    fn exact_match_wins_with_full_confidence() {
        let songs = vec![song(1, "Hound Dog", "Elvis Presley")];
        let entries = vec![
            chart(100, "Hound Dog (Remastered)", "Elvis Presley"),
            chart(101, "Hound Dogs", "Elvis Presler"),
        ];

        let outcomes = match_songs(&songs, &entries, &MatchConfig::default());
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].billboard_song_id, 100);
        assert_eq!(outcomes[0].match_type, MatchType::Exact);
        assert_eq!(outcomes[0].confidence, 1.0);
    }

    #[test]
    fn fuzzy_match_picks_best_above_threshold() {
        let songs = vec![song(1, "Rock Around the Clock", "Bill Haley & His Comets")];
        let entries = vec![
            chart(200, "Rock Around the Clock", "Bill Haley and the Comets"),
            chart(201, "Completely Different Tune", "Unrelated Band"),
        ];

        let outcomes = match_songs(&songs, &entries, &MatchConfig::default());
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].billboard_song_id, 200);
        assert_eq!(outcomes[0].match_type, MatchType::Fuzzy);
        assert!(outcomes[0].confidence > 0.8);
    }

    #[test]
    fn below_threshold_means_no_match() {
        let songs = vec![song(1, "Mystery Song", "Mystery Artist")];
        let entries = vec![chart(300, "Totally Unrelated", "Nobody")];

        let outcomes = match_songs(&songs, &entries, &MatchConfig::default());
        assert!(outcomes.is_empty());
    }

    #[test]
    fn each_chart_entry_links_at_most_once() {
        let songs = vec![
            song(1, "Yesterday", "The Beatles"),
            song(2, "Yesterday", "The Beatles"),
        ];
        let entries = vec![chart(400, "Yesterday", "The Beatles")];

        let outcomes = match_songs(&songs, &entries, &MatchConfig::default());
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].song_id, 1);
    }
}

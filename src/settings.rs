//! Playlist settings table.
//!
//! A comma-delimited text file with a header row, one managed playlist per
//! line:
//!
//! ```text
//! playlist_name, program_title, url, test_url, track_limit, day_slots
//! KCRW Eclectic 24, Eclectic24, https://tracklist-api.kcrw.com/Music/date/DATEHERE, https://..., 200,
//! ```
//!
//! `DATEHERE` in `url` becomes today's date as `YYYY/MM/DD`. Fields may be
//! double-quoted; whitespace after a delimiter is ignored.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{Error, Result, ResultExt};
use crate::sync::{HistoryPolicy, PlaylistJob};

/// Placeholder in `url` replaced by the run date
pub const DATE_PLACEHOLDER: &str = "DATEHERE";

const REQUIRED_COLUMNS: &[&str] = &["playlist_name", "url"];

/// One row of the settings table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistSettings {
    pub playlist_name: String,
    pub program_title: String,
    /// Feed locator with the date already filled in
    pub url: String,
    pub test_url: String,
    /// Flat history cap (0 = uncapped)
    pub track_limit: usize,
    /// Last day slot; 0 selects the flat policy
    pub day_slots: usize,
}

impl PlaylistSettings {
    /// Retention policy selected by this row.
    pub fn policy(&self) -> HistoryPolicy {
        if self.day_slots > 0 {
            HistoryPolicy::DaySlots {
                last_day: self.day_slots,
            }
        } else {
            HistoryPolicy::Flat {
                limit: self.track_limit,
            }
        }
    }

    /// Build the sync job for this row.
    pub fn to_job(&self, use_test_url: bool, reset_history: bool) -> PlaylistJob {
        PlaylistJob {
            playlist_name: self.playlist_name.clone(),
            program_title: self.program_title.clone(),
            feed_url: if use_test_url {
                self.test_url.clone()
            } else {
                self.url.clone()
            },
            policy: self.policy(),
            reset_history,
        }
    }
}

/// Read the settings table, dating URLs with today's local date.
pub fn load_settings(path: &Path) -> Result<Vec<PlaylistSettings>> {
    let text = std::fs::read_to_string(path)
        .with_context(format!("reading settings {}", path.display()))?;
    let today = chrono::Local::now().date_naive();
    parse_settings(&text, today)
}

/// Parse settings text, dating URLs with `today`.
pub fn parse_settings(text: &str, today: NaiveDate) -> Result<Vec<PlaylistSettings>> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Ok(Vec::new());
    };
    let columns: Vec<String> = split_record(header)
        .into_iter()
        .map(|c| c.trim().trim_start_matches('\u{feff}').to_string())
        .collect();
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|c| c == required) {
            return Err(Error::settings(1, format!("missing column `{required}`")));
        }
    }

    let date = today.format("%Y/%m/%d").to_string();
    let mut rows = Vec::new();

    for (line_no, line) in lines {
        let fields = split_record(line);
        let row: HashMap<&str, &str> = columns
            .iter()
            .map(String::as_str)
            .zip(fields.iter().map(String::as_str))
            .collect();
        let get = |name: &str| row.get(name).map(|v| v.trim()).unwrap_or("");

        let playlist_name = clean_text(get("playlist_name"));
        if playlist_name.is_empty() {
            return Err(Error::settings(line_no, "playlist_name is empty"));
        }

        rows.push(PlaylistSettings {
            playlist_name,
            program_title: clean_text(get("program_title")),
            url: get("url").replace(DATE_PLACEHOLDER, &date),
            test_url: get("test_url").to_string(),
            track_limit: parse_count(line_no, "track_limit", get("track_limit"))?,
            day_slots: parse_count(line_no, "day_slots", get("day_slots"))?,
        });
    }

    Ok(rows)
}

/// Non-breaking spaces sneak in from copied show titles.
fn clean_text(value: &str) -> String {
    value.replace('\u{a0}', " ")
}

fn parse_count(line: usize, column: &str, value: &str) -> Result<usize> {
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|_| Error::settings(line, format!("{column} must be a whole number, got {value:?}")))
}

/// Split one delimited line into fields.
///
/// Leading spaces of a field are skipped; a field starting with `"` runs to
/// the matching quote, with `""` standing for a literal quote.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut at_field_start = true;
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            ' ' | '\t' if at_field_start => {}
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            _ => {
                field.push(c);
                at_field_start = false;
            }
        }
    }
    fields.push(field);
    fields
}

// Metadata inference: guesses crop, growth stage, location and season from
// an image filename or URL such as `tomato_harvest_nara.jpg`.

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Crop label used when no table entry matches.
pub const DEFAULT_CROP: &str = "野菜";

/// Substring to crop label. The first match in table order wins.
pub const CROP_TABLE: &[(&str, &str)] = &[
    ("tomato", "トマト"),
    ("komatsuna", "小松菜"),
    ("spinach", "ほうれん草"),
    ("cucumber", "きゅうり"),
    ("eggplant", "なす"),
    ("pepper", "ピーマン"),
    ("potato", "じゃがいも"),
    ("carrot", "にんじん"),
];

/// Keywords checked in order; a later stage that matches overrides an
/// earlier one, so germination beats planting.
pub const STAGE_KEYWORDS: &[(Stage, &[&str])] = &[
    (Stage::Planting, &["plant", "植", "定植"]),
    (Stage::Germination, &["germin", "sprout", "発芽", "種"]),
];

/// Romanized place tokens and their Japanese names.
pub const LOCATION_TRANSLATIONS: &[(&str, &str)] = &[
    ("tokyo", "東京"),
    ("nara", "奈良"),
    ("kyoto", "京都"),
    ("osaka", "大阪"),
];

const LOCATION_PATTERN: &str = r"(?i)_(奈良|大阪|京都|tokyo|nara|kyoto|osaka)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Planting,
    Germination,
    Harvest,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Planting => "planting",
            Stage::Germination => "germination",
            Stage::Harvest => "harvest",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Season for a calendar month (1-12). December through February is
    /// winter.
    pub fn from_month(month: u32) -> Season {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    /// Single-kanji label used in captions.
    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "春",
            Season::Summer => "夏",
            Season::Autumn => "秋",
            Season::Winter => "冬",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What we could tell about a photo from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub crop: String,
    pub stage: Stage,
    pub location: String,
    pub season: Season,
}

/// Infer metadata from `input` using `today` for the season.
pub fn infer(input: &str, default_location: &str, today: NaiveDate) -> Metadata {
    let base = basename(input).to_lowercase();
    Metadata {
        crop: infer_crop(&base).to_string(),
        stage: infer_stage(&base),
        location: infer_location(&base).unwrap_or_else(|| default_location.to_string()),
        season: Season::from_month(today.month()),
    }
}

/// Same as [`infer`] with the local calendar date.
pub fn infer_now(input: &str, default_location: &str) -> Metadata {
    infer(input, default_location, Local::now().date_naive())
}

/// Last path segment of a filename or URL.
fn basename(input: &str) -> &str {
    let trimmed = input.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

fn infer_crop(base: &str) -> &'static str {
    CROP_TABLE
        .iter()
        .find(|(key, _)| base.contains(key))
        .map(|(_, label)| *label)
        .unwrap_or(DEFAULT_CROP)
}

fn infer_stage(base: &str) -> Stage {
    let mut stage = Stage::Harvest;
    for (candidate, keywords) in STAGE_KEYWORDS {
        if keywords.iter().any(|k| base.contains(k)) {
            stage = *candidate;
        }
    }
    stage
}

fn location_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LOCATION_PATTERN).expect("location regex is valid"))
}

fn infer_location(base: &str) -> Option<String> {
    let token = location_regex().captures(base)?.get(1)?.as_str();
    let translated = LOCATION_TRANSLATIONS
        .iter()
        .find(|(roman, _)| token.eq_ignore_ascii_case(roman))
        .map(|(_, name)| *name)
        .unwrap_or(token);
    Some(translated.to_string())
}

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static CJK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{4e00}-\u{9fa5}]+").unwrap());

/// Lines carrying either of these are section headers, never dialogue,
/// and beat every other marker.
const SECTION_MARKERS: &[&str] = &["剧情选项", "剧情内容"];
const BRANCH_MARKER: &str = "剧情";
const OPTION_MARKER: &str = "选项";
/// Full-width colon separating a speaker from their line.
const SPEAKER_COLON: char = '：';
/// Option lines belong to the player character unless a colon names someone.
pub const PROTAGONIST: &str = "开拓者";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Default,
    BranchContent,
    Option,
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    pub line_number: usize,
    pub content: String,
    pub category: Category,
    pub character: String,
}

/// Classify every line of a page's wikitext, one record per input line in
/// original order, `line_number` counting from 1. Blank lines keep their
/// slot with empty content; empty input yields no records.
pub fn classify_lines(source: &str) -> Vec<ClassifiedLine> {
    source
        .lines()
        .enumerate()
        .map(|(idx, line)| classify_line(idx + 1, line))
        .collect()
}

/// Line-local classification. Containment checks and the colon split look
/// at the raw line; only the stored content is trimmed.
fn classify_line(line_number: usize, line: &str) -> ClassifiedLine {
    let mut category = Category::Default;
    let mut character = String::new();

    if SECTION_MARKERS.iter().any(|m| line.contains(m)) {
        // Section header: category stays default whatever else is present.
    } else if line.contains(BRANCH_MARKER) {
        category = Category::BranchContent;
    } else if line.contains(OPTION_MARKER) {
        category = Category::Option;
        character = PROTAGONIST.to_string();
    } else if line.contains(SPEAKER_COLON) {
        category = Category::Content;
    }

    // Speaker extraction is colon-driven and independent of the category
    // outcome; it replaces the option default, possibly with nothing.
    if let Some((before, _)) = line.split_once(SPEAKER_COLON) {
        character = last_cjk_run(before).unwrap_or_default();
    }

    ClassifiedLine {
        line_number,
        content: line.trim().to_string(),
        category,
        character,
    }
}

/// Last maximal run of CJK ideographs (U+4E00..=U+9FA5) in `text`.
fn last_cjk_run(text: &str) -> Option<String> {
    CJK_RUN_RE
        .find_iter(text)
        .last()
        .map(|m| m.as_str().to_string())
}

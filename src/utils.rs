// utils.rs - URL parsing and file naming helpers

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref VIDEO_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap();
    static ref URL_ID_RE: Regex = Regex::new(
        r"(?:[?&]v=|youtu\.be/|/shorts/|/embed/|/live/)([A-Za-z0-9_-]{11})"
    )
    .unwrap();
    static ref FILE_NAME_RE: Regex = Regex::new(r"[^\w\s-]").unwrap();
}

pub const DEFAULT_REPORT_NAME: &str = "report.csv";
const MAX_FILE_STEM_CHARS: usize = 30;

/// Extract the 11-character video id from a watch/short/embed URL or a bare id
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if VIDEO_ID_RE.is_match(input) {
        return Some(input.to_string());
    }

    URL_ID_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Build the export file name from a video title: punctuation stripped,
/// first 30 characters kept.
pub fn report_file_name(title: &str) -> String {
    let cleaned = FILE_NAME_RE.replace_all(title, "");
    let stem: String = cleaned.chars().take(MAX_FILE_STEM_CHARS).collect();
    let stem = stem.trim();

    if stem.is_empty() {
        DEFAULT_REPORT_NAME.to_string()
    } else {
        format!("{}.csv", stem)
    }
}

/// Truncate to at most `max_chars` characters without splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Split text into chunks of at most `chunk_chars` characters
pub fn chunk_chars(text: &str, chunk_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_chars.max(1))
        .map(|c| c.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id_formats() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(extract_video_id(" dQw4w9WgXcQ ").as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_extract_video_id_rejects_garbage() {
        assert_eq!(extract_video_id("https://example.com/page"), None);
        assert_eq!(extract_video_id("short"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(report_file_name("Hello, World!"), "Hello World.csv");
        assert_eq!(report_file_name("!!!"), DEFAULT_REPORT_NAME);
        let long = "a".repeat(50);
        assert_eq!(report_file_name(&long), format!("{}.csv", "a".repeat(30)));
    }

    #[test]
    fn test_truncate_and_chunk_respect_char_boundaries() {
        assert_eq!(truncate_chars("привет", 3), "при");
        assert_eq!(truncate_chars("ok", 10), "ok");

        let chunks = chunk_chars("абвгде", 4);
        assert_eq!(chunks, vec!["абвг".to_string(), "де".to_string()]);
        assert!(chunk_chars("", 4).is_empty());
    }
}

//! Category filtering for entry lists

use core_mirror::{Entry, EntryKind};

const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff"];
const DOCUMENT_SUFFIXES: &[&str] = &[
    ".pdf", ".doc", ".docx", ".txt", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".ods", ".odp",
];
const ARCHIVE_SUFFIXES: &[&str] = &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2"];
const VIDEO_SUFFIXES: &[&str] = &[".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv"];
const AUDIO_SUFFIXES: &[&str] = &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".m4a"];

fn suffix_class(category: &str) -> Option<&'static [&'static str]> {
    match category {
        "images" => Some(IMAGE_SUFFIXES),
        "documents" => Some(DOCUMENT_SUFFIXES),
        "archives" => Some(ARCHIVE_SUFFIXES),
        "videos" => Some(VIDEO_SUFFIXES),
        "audio" => Some(AUDIO_SUFFIXES),
        _ => None,
    }
}

/// Narrow `entries` to the given display category.
///
/// `all` passes the list through in its original order; `files` and
/// `folders` select by kind; the extension categories (`images`,
/// `documents`, `archives`, `videos`, `audio`) match filename suffixes
/// case-insensitively. An unrecognized category yields an empty list, not
/// the full one.
pub fn filter_entries(entries: &[Entry], category: &str) -> Vec<Entry> {
    match category {
        "all" => entries.to_vec(),
        "files" => entries
            .iter()
            .filter(|e| e.kind == EntryKind::File)
            .cloned()
            .collect(),
        "folders" => entries
            .iter()
            .filter(|e| e.kind == EntryKind::Dir)
            .cloned()
            .collect(),
        other => match suffix_class(other) {
            Some(suffixes) => entries
                .iter()
                .filter(|e| {
                    let name = e.name.to_lowercase();
                    suffixes.iter().any(|suffix| name.ends_with(suffix))
                })
                .cloned()
                .collect(),
            None => Vec::new(),
        },
    }
}

// Name normalization: turns arbitrary (often Cyrillic) folder and file names
// into identifiers the storage service and public links handle cleanly.
//
// Normalization always works on one path segment at a time so separators
// survive; the helpers at the bottom build whole remote paths from segments.

use std::path::{Component, Path};

/// Storage-safe form of a single path segment.
///
/// Transliterates to Latin, collapses each run of characters outside
/// `[A-Za-z0-9]` into one `_`, trims underscores from both ends and
/// lowercases. Total: characters with no transliteration are dropped.
pub fn normalize(segment: &str) -> String {
    let latin = deunicode::deunicode(segment);
    let mut out = String::with_capacity(latin.len());
    let mut pending_sep = false;
    for ch in latin.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Like [`normalize`], but keeps the file extension as a separate, lowercased
/// suffix so `IMG 01.JPG` becomes `img_01.jpg` rather than `img_01_jpg`.
pub fn normalize_file_name(name: &str) -> String {
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, normalize(ext)),
        _ => (name, String::new()),
    };
    let mut out = normalize(stem);
    if out.is_empty() {
        out.push_str("file");
    }
    if !ext.is_empty() {
        out.push('.');
        out.push_str(&ext);
    }
    out
}

/// Normalize every segment of a `/`-separated remote path.
///
/// Segments that normalize to nothing are dropped. The result always starts
/// with `/`; an empty path maps to the root `/`.
pub fn normalize_remote_path(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .map(normalize)
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// Parent folder of a normalized remote path (`/a/b/c.jpg` -> `/a/b`).
pub fn remote_parent(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some(("", _)) | None => "/",
        Some((parent, _)) => parent,
    }
}

/// Remote destination for a file at `relative` (relative to the local root).
///
/// When the first directory of `relative` repeats the last folder of
/// `remote_base` (compared case-insensitively) it is dropped, so a base of
/// `/Photos` and a tree that already starts with `photos/` do not produce
/// `/photos/photos/...`.
pub fn remote_path_for(relative: &Path, remote_base: &str) -> String {
    let mut parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let file_name = match parts.pop() {
        Some(name) => name,
        None => return normalize_remote_path(remote_base),
    };

    let base_last = remote_base.split('/').filter(|s| !s.is_empty()).next_back();
    if let (Some(first), Some(base_last)) = (parts.first(), base_last) {
        if first.to_lowercase() == base_last.to_lowercase() {
            parts.remove(0);
        }
    }

    let mut segments: Vec<String> = remote_base
        .split('/')
        .chain(parts.iter().map(String::as_str))
        .map(normalize)
        .filter(|s| !s.is_empty())
        .collect();
    segments.push(normalize_file_name(&file_name));
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transliterates_cyrillic() {
        assert_eq!(normalize("Опоры трубопроводов"), "opory_truboprovodov");
    }

    #[test]
    fn collapses_separator_runs() {
        assert_eq!(normalize("A///B"), "a_b");
        assert_eq!(normalize("  --Hello,  World!--  "), "hello_world");
        assert_eq!(normalize("scan_img1"), "scan_img1");
    }

    #[test]
    fn empty_and_symbol_only_segments() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize("Фото — Лето 2023");
        assert_eq!(normalize(&once), once);
        assert!(!once.starts_with('_') && !once.ends_with('_'));
        assert!(once.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    }

    #[test]
    fn file_names_keep_their_extension() {
        assert_eq!(normalize_file_name("scan_img1.jpg"), "scan_img1.jpg");
        assert_eq!(normalize_file_name("Фото 1.JPG"), "foto_1.jpg");
        assert_eq!(normalize_file_name("!!!.png"), "file.png");
        assert_eq!(normalize_file_name("README"), "readme");
    }

    #[test]
    fn remote_paths_are_normalized_per_segment() {
        assert_eq!(normalize_remote_path("/A/B/C"), "/a/b/c");
        assert_eq!(normalize_remote_path("/Опоры трубопроводов/"), "/opory_truboprovodov");
        assert_eq!(normalize_remote_path(""), "/");
    }

    #[test]
    fn parent_of_remote_path() {
        assert_eq!(remote_parent("/base/sub/x.jpg"), "/base/sub");
        assert_eq!(remote_parent("/x.jpg"), "/");
    }

    #[test]
    fn remote_path_joins_base_and_relative_path() {
        let rel = Path::new("sub").join("scan_img1.jpg");
        assert_eq!(remote_path_for(&rel, "Base"), "/base/sub/scan_img1.jpg");
        assert_eq!(
            remote_path_for(Path::new("IMG 1.JPG"), "/Опоры трубопроводов"),
            "/opory_truboprovodov/img_1.jpg"
        );
    }

    #[test]
    fn duplicate_base_folder_is_stripped() {
        let rel = Path::new("BASE").join("sub").join("a.png");
        assert_eq!(remote_path_for(&rel, "/Base"), "/base/sub/a.png");

        let rel = Path::new("Опоры").join("a.png");
        assert_eq!(remote_path_for(&rel, "/опоры"), "/opory/a.png");
    }

    #[test]
    fn file_named_like_base_is_not_stripped() {
        assert_eq!(remote_path_for(Path::new("base.jpg"), "/base"), "/base/base.jpg");
    }
}

//! Mapping between script titles and filesystem-safe file names.
//!
//! Titles inside a bundle may contain characters that are illegal in file
//! names. Each one is replaced by a short `&xx;` token on the way to disk
//! and restored on the way back.

const ESCAPES: &[(char, &str)] = &[
    ('\\', "&bs;"),
    ('/', "&fs;"),
    (':', "&cn;"),
    ('*', "&as;"),
    ('?', "&qm;"),
    ('"', "&dq;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('|', "&po;"),
];

/// Fallback name for titles and folders that come out empty.
pub const UNNAMED: &str = "unnamed";

/// Replace path-unsafe characters in a title with their escape tokens.
pub fn title_to_filename(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        match ESCAPES.iter().find(|(raw, _)| *raw == c) {
            Some((_, token)) => out.push_str(token),
            None => out.push(c),
        }
    }
    out
}

/// Recover a title from a file or folder name: drop a `.rb` extension and a
/// leading all-digit `NNN_` ordering prefix, then undo the escaping. Names
/// that reduce to nothing become [`UNNAMED`].
pub fn filename_to_title(filename: &str) -> String {
    let stem = filename.strip_suffix(".rb").unwrap_or(filename);
    let stem = match stem.split_once('_') {
        Some((prefix, rest))
            if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            rest
        }
        _ => stem,
    };
    let title = stem.trim();
    if title.is_empty() {
        return UNNAMED.to_owned();
    }

    let mut out = title.to_owned();
    for (raw, token) in ESCAPES {
        out = out.replace(token, &raw.to_string());
    }
    out
}

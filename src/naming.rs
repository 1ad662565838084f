//! File and URL naming helpers: cross-platform filename sanitization,
//! URL slugs, and the numbered destination stem for downloaded lessons.

/// Sanitizes a title for safe use as a cross-platform file or directory name.
///
/// - Replaces `\ / : * ? " < > |` and control characters with a space
/// - Collapses runs of whitespace into a single space
/// - Trims leading/trailing whitespace
pub fn sanitize_title(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_space = false;

    for c in name.chars() {
        let replacement = match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => ' ',
            c if c.is_control() => ' ',
            c => c,
        };

        if replacement == ' ' || replacement.is_whitespace() {
            if !prev_space && !out.is_empty() {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(replacement);
            prev_space = false;
        }
    }

    out.trim().to_string()
}

/// Converts a title into a URL-friendly slug: lowercase ASCII alphanumerics
/// with single hyphens in between. Falls back to `"lesson"` for titles that
/// sanitize to nothing.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_hyphen = false;

    for c in text.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen && !out.is_empty() {
            out.push('-');
            prev_hyphen = true;
        }
    }

    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "lesson".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Destination file stem for a lesson: `NN - Title` with a zero-padded
/// sequence number. The sequence prefix is unique within a course, so two
/// lessons whose titles sanitize identically still get distinct paths.
pub fn target_stem(sequence: u32, title: &str) -> String {
    format!("{:02} - {}", sequence, sanitize_title(title))
}

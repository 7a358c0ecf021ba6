use regex::Regex;
use std::sync::LazyLock;

// Identifier is exactly 11 characters; anything without whitespace may follow it.
static SOURCE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(https?://)?(www\.)?(youtube\.com/watch\?v=|youtu\.be/|youtube\.com/shorts/)([a-zA-Z0-9_-]{11})(\S*)?$",
    )
    .expect("source URL pattern is valid")
});

/// Check whether `input` is a watch, short-link or shorts URL with a valid video id.
pub fn validate_url(input: &str) -> bool {
    SOURCE_URL.is_match(input)
}

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

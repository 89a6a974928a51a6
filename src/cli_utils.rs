/// CLI utilities for consistent output formatting
use std::io::IsTerminal;

/// Get a colored prefix
///
/// Returns bright cyan if stderr is a TTY, plain text otherwise.
pub fn libdoc_cache_prefix() -> &'static str {
    if std::io::stderr().is_terminal() {
        "\x1b[96m[libdoc-cache]\x1b[0m"
    } else {
        "[libdoc-cache]"
    }
}

/// Split a comma-separated command line list, skipping blank segments
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

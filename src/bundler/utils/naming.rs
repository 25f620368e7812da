//! Name sanitization for file names, package names and assembly names.

use regex::Regex;
use std::sync::LazyLock;

/// Fallback for names that sanitize to nothing.
pub const DEFAULT_SAFE_NAME: &str = "photino-wrapper";

/// Fallback assembly name.
pub const DEFAULT_ASSEMBLY_NAME: &str = "PhotinoWrapper";

static NON_WORD_OR_HYPHEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-]+").expect("file name regex is valid"));

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w]+").expect("assembly name regex is valid"));

/// Collapses runs of characters other than word characters and `-` into a
/// single `-`, trims leading and trailing `-`, and lower-cases the result.
///
/// Blank input, or input that sanitizes to nothing, yields `photino-wrapper`.
pub fn sanitize_for_file_system(input: &str) -> String {
    if input.trim().is_empty() {
        return DEFAULT_SAFE_NAME.to_string();
    }
    let replaced = NON_WORD_OR_HYPHEN.replace_all(input, "-");
    let trimmed = replaced.trim_matches('-');
    if trimmed.trim().is_empty() {
        DEFAULT_SAFE_NAME.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

/// Strips every non-word character, keeping case.
///
/// Blank input, or input with no word characters, yields `PhotinoWrapper`.
pub fn sanitize_for_assembly_name(input: &str) -> String {
    let stripped = NON_WORD.replace_all(input, "");
    if stripped.trim().is_empty() {
        DEFAULT_ASSEMBLY_NAME.to_string()
    } else {
        stripped.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_system_names() {
        assert_eq!(sanitize_for_file_system("My Cool App!"), "my-cool-app");
        assert_eq!(sanitize_for_file_system("  --Viewer--  "), "viewer");
        assert_eq!(sanitize_for_file_system("1.2.0"), "1-2-0");
        assert_eq!(sanitize_for_file_system("snake_case-ok"), "snake_case-ok");
    }

    #[test]
    fn test_file_system_fallback() {
        assert_eq!(sanitize_for_file_system(""), "photino-wrapper");
        assert_eq!(sanitize_for_file_system("   "), "photino-wrapper");
        assert_eq!(sanitize_for_file_system("!!!"), "photino-wrapper");
    }

    #[test]
    fn test_assembly_names() {
        assert_eq!(sanitize_for_assembly_name("My Cool App!"), "MyCoolApp");
        assert_eq!(sanitize_for_assembly_name("a-b.c"), "abc");
        assert_eq!(sanitize_for_assembly_name(""), "PhotinoWrapper");
        assert_eq!(sanitize_for_assembly_name("???"), "PhotinoWrapper");
    }
}

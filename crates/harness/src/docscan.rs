//! Doc-comment metadata fallback
//!
//! When a test has no registry entry, its metadata can still be recovered
//! statically from the `///` block above the function definition:
//!
//! ```ignore
//! /// Login with a valid TOTP code
//! /// Expected: Session cookie issued, 200 OK
//! /// Module: Auth
//! /// ID: AUTH-001
//! fn test_login() { ... }
//! ```
//!
//! The first non-empty doc line is the description; later lines starting
//! with `Expected:`, `Module:` or `ID:` supply the remaining fields.

use std::fs;
use std::path::Path;

use crate::extract::PartialMetadata;

/// Scan `source_path` for the doc block above `fn <test_name>` and parse
/// whatever fields it declares. Returns an empty partial when the file or
/// the function cannot be found; the extractor decides whether that is
/// fatal.
pub fn scan(source_path: &Path, test_name: &str) -> PartialMetadata {
    let Ok(source) = fs::read_to_string(source_path) else {
        return PartialMetadata::default();
    };
    let lines: Vec<&str> = source.lines().collect();

    let Some(fn_line) = find_fn_line(&lines, test_name) else {
        return PartialMetadata::default();
    };

    parse_doc_block(collect_doc_block(&lines, fn_line))
}

/// Index of the line declaring `fn <test_name>`, if any.
fn find_fn_line(lines: &[&str], test_name: &str) -> Option<usize> {
    let needles = [
        format!("fn {}(", test_name),
        format!("fn {}<", test_name),
    ];
    lines.iter().position(|line| {
        let trimmed = line.trim_start();
        needles.iter().any(|n| {
            trimmed
                .find(n.as_str())
                // `fn` must start a token: either at line start or after
                // a qualifier like `pub`/`async`/`unsafe`.
                .map(|at| at == 0 || trimmed.as_bytes()[at - 1] == b' ')
                .unwrap_or(false)
        })
    })
}

/// Walk upwards from the `fn` line, skipping attributes, and gather the
/// contiguous `///` block in source order.
fn collect_doc_block<'a>(lines: &[&'a str], fn_line: usize) -> Vec<&'a str> {
    let mut block = Vec::new();
    for line in lines[..fn_line].iter().rev() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("#[") || trimmed.starts_with("#!") {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("///") {
            block.push(rest.trim());
            continue;
        }
        break;
    }
    block.reverse();
    block
}

fn parse_doc_block(block: Vec<&str>) -> PartialMetadata {
    let mut partial = PartialMetadata::default();

    for line in block {
        if let Some(value) = line.strip_prefix("Expected:") {
            partial.expected_result = non_empty(value);
        } else if let Some(value) = line.strip_prefix("Module:") {
            partial.module = non_empty(value);
        } else if let Some(value) = line.strip_prefix("ID:") {
            partial.test_id = non_empty(value);
        } else if partial.description.is_none() && !line.is_empty() {
            partial.description = Some(line.to_string());
        }
    }

    partial
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scan_source(source: &str, test_name: &str) -> PartialMetadata {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(source.as_bytes()).unwrap();
        scan(file.path(), test_name)
    }

    #[test]
    fn test_full_doc_block() {
        let partial = scan_source(
            r#"
/// Login with a valid TOTP code
/// Expected: Session cookie issued, 200 OK
/// Module: Auth
/// ID: AUTH-001
fn test_login() {}
"#,
            "test_login",
        );
        assert_eq!(partial.description.as_deref(), Some("Login with a valid TOTP code"));
        assert_eq!(partial.expected_result.as_deref(), Some("Session cookie issued, 200 OK"));
        assert_eq!(partial.module.as_deref(), Some("Auth"));
        assert_eq!(partial.test_id.as_deref(), Some("AUTH-001"));
    }

    #[test]
    fn test_attributes_between_docs_and_fn() {
        let partial = scan_source(
            r#"
/// Menu listing returns all categories
/// Expected: 200 OK with category array
/// Module: Menus
/// ID: MENU-004
#[allow(dead_code)]
async fn test_menu_categories() {}
"#,
            "test_menu_categories",
        );
        assert_eq!(partial.module.as_deref(), Some("Menus"));
        assert_eq!(partial.test_id.as_deref(), Some("MENU-004"));
    }

    #[test]
    fn test_partial_block_leaves_fields_unset() {
        let partial = scan_source(
            r#"
/// Only a description here
pub fn test_bare() {}
"#,
            "test_bare",
        );
        assert_eq!(partial.description.as_deref(), Some("Only a description here"));
        assert!(partial.expected_result.is_none());
        assert!(partial.module.is_none());
        assert!(partial.test_id.is_none());
    }

    #[test]
    fn test_missing_function_yields_empty_partial() {
        let partial = scan_source("fn other() {}", "test_absent");
        assert!(partial.description.is_none());
    }

    #[test]
    fn test_does_not_match_prefixed_names() {
        // `fn test_login_extra` must not satisfy a lookup for `test_login`
        let partial = scan_source(
            r#"
/// Wrong block
fn test_login_extra() {}

/// Right block
/// Module: Auth
fn test_login() {}
"#,
            "test_login",
        );
        assert_eq!(partial.description.as_deref(), Some("Right block"));
        assert_eq!(partial.module.as_deref(), Some("Auth"));
    }

    #[test]
    fn test_unreadable_file_yields_empty_partial() {
        let partial = scan(Path::new("/nonexistent/src.rs"), "test_x");
        assert!(partial.description.is_none());
    }
}

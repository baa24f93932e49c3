//! Validation primitives shared by every command constructor.
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    // Best-effort email syntax, not a full RFC-5322 parser. Only the start of the input is
    // anchored and the classes are lowercase, so this accepts exactly what it always has.
    // See: https://uibakery.io/regex-library/email-regex-python
    static ref EMAIL_RE: Regex = Regex::new(concat!(
        r#"^(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*|"#,
        r#""(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|"#,
        r#"\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")@(?:(?:[a-z0-9](?:[a-z0-9-]*"#,
        r#"[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?|\[(?:(?:25[0-5]|2[0-4]"#,
        r#"[0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?|"#,
        r#"[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-"#,
        r#"\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])"#,
    ))
    .unwrap();
}

/// Returns true if `s` starts with a syntactically plausible email address.
#[must_use]
pub fn is_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

/// Narrows `port` to a TCP port, or returns `None` when it falls outside `1..=65535`.
#[must_use]
pub fn port(port: i64) -> Option<u16> {
    u16::try_from(port).ok().filter(|p| *p != 0)
}

/// Coerces an optional flag value into a bool. An absent flag is `false`.
#[must_use]
pub fn flag(value: Option<bool>) -> bool {
    value.unwrap_or(false)
}

/// Returns true if `path` is set and refers to an existing regular file.
#[must_use]
pub fn is_file(path: Option<&Path>) -> bool {
    path.is_some_and(Path::is_file)
}

/// Returns true if `domains` is non-empty and every entry is non-empty and not flag-like.
#[must_use]
pub fn domain_list(domains: &[String]) -> bool {
    !domains.is_empty() && domains.iter().all(|d| !d.is_empty() && !d.starts_with('-'))
}

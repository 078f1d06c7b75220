//! Event name validation and pattern matching
//!
//! Event names are dot-separated segments: `app.user.add`. A registered
//! pattern may contain two wildcard tokens: the single-level `*` and the
//! to-end `**` (only meaningful at the start or end of a pattern).
//!
//! Two mutually exclusive match modes exist, fixed per manager:
//!
//! - [`MatchMode::Simple`]: firing `a.b.c` consults the exact pattern
//!   `a.b.c`, then the trailing-group pattern `a.b.*`, then the bare
//!   catch-all `*`. `a.*` does NOT match `a.b.c`.
//! - [`MatchMode::Path`]: every registered pattern is glob-tested against
//!   the fired name; `*` matches within one segment, `**` matches across
//!   separators.

use crate::bus::error::{EventError, EventResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// The bare catch-all pattern matching every fired name
pub const WILDCARD: &str = "*";

/// The to-end wildcard token, matching any run including separators
pub const ANY_TO_END: &str = "**";

/// Segment separator in event names
pub const SEPARATOR: char = '.';

/// Grammar for a well-formed event name: starts ASCII alphabetic,
/// remainder ASCII alphanumeric/underscore/hyphen/dot/asterisk.
static GOOD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][0-9A-Za-z_.*-]*$").expect("valid name regex"));

/// Name matching mode, fixed per manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Exact name, then trailing-group wildcard, then catch-all
    #[default]
    Simple,
    /// Full glob test of every registered pattern against the fired name
    Path,
}

/// Validate a fired event name. Trims whitespace; returns the
/// normalized name or [`EventError::InvalidName`].
pub fn validate_name(raw: &str) -> EventResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(EventError::InvalidName {
            name: raw.to_string(),
            reason: "event name cannot be empty".to_string(),
        });
    }
    if !GOOD_NAME.is_match(name) {
        return Err(EventError::InvalidName {
            name: name.to_string(),
            reason: format!("must match {}", GOOD_NAME.as_str()),
        });
    }
    Ok(name.to_string())
}

/// Validate a registration pattern.
///
/// Accepts everything [`validate_name`] accepts, plus the bare catch-all
/// (`*` or `**`, normalized to `*`) and `**`-prefixed patterns without
/// further grammar checks.
pub fn validate_pattern(raw: &str) -> EventResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(EventError::InvalidName {
            name: raw.to_string(),
            reason: "event name cannot be empty".to_string(),
        });
    }
    if name == WILDCARD || name == ANY_TO_END {
        return Ok(WILDCARD.to_string());
    }
    if name.starts_with(ANY_TO_END) {
        return Ok(name.to_string());
    }
    validate_name(name)
}

/// Trailing-group pattern for a fired name: `app.user.add` -> `app.user.*`.
///
/// Returns `None` for names without an interior separator - a name like
/// `app` has no group level.
pub fn group_pattern(name: &str) -> Option<String> {
    match name.rfind(SEPARATOR) {
        Some(pos) if pos > 0 => Some(format!("{}{}", &name[..pos + 1], WILDCARD)),
        _ => None,
    }
}

/// Path-mode pattern test.
///
/// - bare `*` matches every name
/// - `**` at pattern start matches any name ending with the rest
/// - `**` at pattern end matches any name starting with the rest
/// - otherwise a glob match where `*` stays within one segment
pub fn match_node_path(pattern: &str, name: &str) -> bool {
    if pattern == WILDCARD {
        return true;
    }

    if let Some(i) = pattern.find(ANY_TO_END) {
        if i == 0 {
            return name.ends_with(&pattern[2..]);
        }
        return name.starts_with(&pattern[..pattern.len() - 2]);
    }

    // Map separators onto '/' so glob treats each segment as a path
    // component; require_literal_separator keeps '*' within one segment.
    let glob_pattern = pattern.replace(SEPARATOR, "/");
    let subject = name.replace(SEPARATOR, "/");
    match glob::Pattern::new(&glob_pattern) {
        Ok(compiled) => compiled.matches_with(
            &subject,
            glob::MatchOptions {
                require_literal_separator: true,
                ..Default::default()
            },
        ),
        Err(_) => false,
    }
}

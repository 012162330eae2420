//! Permissive glob matching for rule-file and ignore-file patterns.
//!
//! Paths and patterns are compared with `/` separators regardless of platform.
//! `?` and `*` stay inside a single segment, `**` crosses segments.

use anyhow::{Context, Result};
use regex::Regex;

#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    strategy: Strategy,
}

#[derive(Debug, Clone)]
enum Strategy {
    /// `**/sub`: `sub` must match a trailing run of whole segments.
    Suffix(Regex),
    /// `**sub`: `sub` may occur anywhere.
    Anywhere(Regex),
    /// Everything else: full match, or literal prefix when the pattern ends in a bare `*`.
    Full { regex: Regex, prefix: Option<String> },
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = pattern.replace('\\', "/");
        let strategy = if let Some(sub) = pattern.strip_prefix("**/") {
            Strategy::Suffix(compile(&format!("(?:^|/){}$", translate(sub)), &pattern)?)
        } else if let Some(sub) = pattern.strip_prefix("**") {
            Strategy::Anywhere(compile(&translate(sub), &pattern)?)
        } else {
            let prefix = match pattern.strip_suffix('*') {
                Some(prefix) if !prefix.ends_with('*') => Some(prefix.to_string()),
                _ => None,
            };
            Strategy::Full {
                regex: compile(&format!("^{}$", translate(&pattern)), &pattern)?,
                prefix,
            }
        };
        Ok(Self { pattern, strategy })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        let candidate = candidate.replace('\\', "/");
        match &self.strategy {
            Strategy::Suffix(regex) | Strategy::Anywhere(regex) => regex.is_match(&candidate),
            Strategy::Full { regex, prefix } => {
                regex.is_match(&candidate)
                    || prefix.as_deref().is_some_and(|p| candidate.starts_with(p))
            }
        }
    }
}

/// One-shot form of [`Glob::is_match`]; an uncompilable pattern matches nothing.
#[cfg(test)]
pub(crate) fn matches(candidate: &str, pattern: &str) -> bool {
    Glob::new(pattern).is_ok_and(|glob| glob.is_match(candidate))
}

fn compile(source: &str, pattern: &str) -> Result<Regex> {
    Regex::new(source).with_context(|| format!("Invalid glob pattern: {}", pattern))
}

/// Glob to regex body; every non-wildcard character is escaped.
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                // `a/**/b` also matches `a/b`
                if chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("(?:.*/)?");
                } else {
                    out.push_str(".*");
                }
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }
    out
}

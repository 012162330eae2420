//! Gitignore-style pattern files imported with `--ignorefile:`.
//!
//! Rules are evaluated in file order and the first rule that matches decides the
//! verdict. This differs from git, where the last matching rule wins: with
//! `build/` followed by `!build/keep.txt`, `build/keep.txt` stays ignored here.

use crate::app::glob::Glob;
use crate::app::models::Report;
use crate::app::paths::to_slash;
use anyhow::Result;
use pathdiff::diff_paths;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnorePattern {
    Plain(String),
    /// Leading `/`: only matched from the base directory.
    Anchored(String),
    /// Leading `!`: a match means "keep".
    Negated(Box<IgnorePattern>),
}

impl IgnorePattern {
    pub fn parse(line: &str) -> Self {
        match line.strip_prefix('!') {
            Some(rest) => IgnorePattern::Negated(Box::new(Self::parse_positive(rest))),
            None => Self::parse_positive(line),
        }
    }

    fn parse_positive(line: &str) -> Self {
        match line.strip_prefix('/') {
            Some(rest) => IgnorePattern::Anchored(rest.to_string()),
            None => IgnorePattern::Plain(line.to_string()),
        }
    }
}

/// Reads an ignore file; a missing file yields no patterns.
pub fn import_patterns(path: &Path, report: &mut Report) -> Vec<IgnorePattern> {
    if !path.exists() {
        log::debug!("Ignore file {} does not exist", path.display());
        return Vec::new();
    }

    match fs::read_to_string(path) {
        Ok(content) => parse_patterns(&content),
        Err(err) => {
            report.warn(format!("Failed to read ignore file {}: {}", path.display(), err));
            Vec::new()
        }
    }
}

pub fn parse_patterns(content: &str) -> Vec<IgnorePattern> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(IgnorePattern::parse)
        .collect()
}

struct CompiledRule {
    glob: Glob,
    negated: bool,
    anchored: bool,
    /// Trailing `/`: matched against directory segments only.
    directory: bool,
}

impl CompiledRule {
    fn new(pattern: &IgnorePattern) -> Result<Self> {
        let (negated, positive) = match pattern {
            IgnorePattern::Negated(inner) => (true, inner.as_ref()),
            other => (false, other),
        };
        let (body, anchored) = match positive {
            IgnorePattern::Anchored(body) => (body.as_str(), true),
            other => (positive_body(other), false),
        };
        let (body, directory) = match body.strip_suffix('/') {
            Some(dir) => (dir, true),
            None => (body, false),
        };
        Ok(Self {
            glob: Glob::new(body)?,
            negated,
            anchored,
            directory,
        })
    }

    fn is_match(&self, relative: &str) -> bool {
        let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
        let candidates: &[&str] = if self.directory {
            &segments[..segments.len().saturating_sub(1)]
        } else {
            &segments
        };

        if self.anchored {
            (1..=candidates.len()).any(|n| self.glob.is_match(&candidates[..n].join("/")))
        } else if self.directory {
            candidates.iter().any(|seg| self.glob.is_match(seg))
                || (1..=candidates.len()).any(|n| self.glob.is_match(&candidates[..n].join("/")))
        } else {
            self.glob.is_match(relative) || candidates.iter().any(|seg| self.glob.is_match(seg))
        }
    }
}

fn positive_body(pattern: &IgnorePattern) -> &str {
    match pattern {
        IgnorePattern::Plain(body) | IgnorePattern::Anchored(body) => body,
        IgnorePattern::Negated(inner) => positive_body(inner),
    }
}

/// Compiled rule list for repeated matching against many files.
pub struct IgnoreMatcher {
    base: PathBuf,
    rules: Vec<CompiledRule>,
}

impl IgnoreMatcher {
    pub fn new(patterns: &[IgnorePattern], base: &Path) -> Result<Self> {
        Ok(Self {
            base: base.to_path_buf(),
            rules: patterns.iter().map(CompiledRule::new).collect::<Result<_>>()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First matching rule decides; no match means not ignored.
    pub fn is_ignored(&self, file: &Path) -> bool {
        let relative = diff_paths(file, &self.base).unwrap_or_else(|| file.to_path_buf());
        let relative = to_slash(&relative);
        self.rules
            .iter()
            .find(|rule| rule.is_match(&relative))
            .is_some_and(|rule| !rule.negated)
    }
}

#[cfg(test)]
pub(crate) fn matches_ignore_pattern(file: &Path, patterns: &[IgnorePattern], base: &Path) -> bool {
    IgnoreMatcher::new(patterns, base).is_ok_and(|matcher| matcher.is_ignored(file))
}

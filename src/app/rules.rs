use crate::app::models::RuleSet;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

const INCLUDE_PREFIX: &str = "++";
const EXCLUDE_PREFIX: &str = "--";
const IGNORE_FILE_PREFIX: &str = "--ignorefile:";
const IGNORE_EXTENSION_PREFIX: &str = "--ignoreextension:";

/// Reads the rule file. A missing file is fatal.
pub fn load_rules(path: &Path) -> Result<RuleSet> {
    if !path.is_file() {
        bail!("Rule file not found: {}", path.display());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule file {}", path.display()))?;
    Ok(parse_rules(&content))
}

pub fn parse_rules(content: &str) -> RuleSet {
    let mut rules = RuleSet::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix(IGNORE_FILE_PREFIX) {
            push_non_empty(&mut rules.ignore_files, strip_quotes(rest.trim()));
        } else if let Some(rest) = line.strip_prefix(IGNORE_EXTENSION_PREFIX) {
            if let Some(ext) = normalize_extension(strip_quotes(rest.trim())) {
                rules.ignore_extensions.push(ext);
            }
        } else if let Some(rest) = line.strip_prefix(INCLUDE_PREFIX) {
            push_non_empty(&mut rules.include, strip_quotes(rest.trim()));
        } else if let Some(rest) = line.strip_prefix(EXCLUDE_PREFIX) {
            push_non_empty(&mut rules.exclude, strip_quotes(rest.trim()));
        } else {
            log::debug!("Ignoring unrecognised rule line: {}", line);
        }
    }

    rules
}

/// `PNG`, `.png` and `"png"` all become `.png`.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim().trim_start_matches('.').to_lowercase();
    if ext.is_empty() {
        None
    } else {
        Some(format!(".{}", ext))
    }
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn push_non_empty(list: &mut Vec<String>, value: &str) {
    if !value.is_empty() {
        list.push(value.to_string());
    }
}

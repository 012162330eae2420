use std::fmt;
use std::path::PathBuf;

/// Pattern lists read from the rule file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub ignore_files: Vec<String>,
    /// Lower-cased, with the leading dot.
    pub ignore_extensions: Vec<String>,
}

/// Represents the final configuration after merging presets, the rule file and CLI args.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub rules: RuleSet,
    pub output: PathBuf,
    pub tree_only_output: bool,
    pub list_only: bool,
    pub to_stdout: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unreadable(String),
    TooLarge(u64),
    OutputLimitReached,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable(err) => write!(f, "unreadable: {}", err),
            SkipReason::TooLarge(size) => write!(f, "too large ({} bytes)", size),
            SkipReason::OutputLimitReached => write!(f, "output size limit reached"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: SkipReason,
}

/// Diagnostics for a single run, threaded through the pipeline by `&mut`.
#[derive(Debug, Default)]
pub struct Report {
    pub warnings: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub total_files: usize,
    pub processed_files: usize,
    pub total_bytes: u64,
}

impl Report {
    pub fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn skip(&mut self, path: String, reason: SkipReason) {
        log::warn!("Skipping {}: {}", path, reason);
        self.skipped.push(SkippedFile { path, reason });
    }
}

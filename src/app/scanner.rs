use crate::app::glob::Glob;
use crate::app::ignore_file::{import_patterns, IgnoreMatcher, IgnorePattern};
use crate::app::models::{Report, RuleSet};
use crate::app::paths::{absolutize, glob_base, is_glob, to_slash};
use crate::app::walker::walk;
use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Turns a [`RuleSet`] into the final, sorted file list.
pub struct Scanner {
    root: PathBuf,
    include: Vec<String>,
    exclude: Vec<Exclusion>,
    ignore_files: Vec<PathBuf>,
    ignore_extensions: HashSet<String>,
}

struct Exclusion {
    glob: Glob,
    /// `<path>/` for glob-free patterns, so everything beneath them goes too.
    below: Option<String>,
}

impl Exclusion {
    fn new(pattern: &str, root: &Path) -> Result<Self> {
        if pattern.starts_with("**") {
            return Ok(Self {
                glob: Glob::new(pattern)?,
                below: None,
            });
        }

        let resolved = to_slash(&absolutize(pattern, root));
        let below = if is_glob(pattern) {
            None
        } else {
            Some(format!("{}/", resolved.trim_end_matches('/')))
        };
        Ok(Self {
            glob: Glob::new(&resolved)?,
            below,
        })
    }

    fn is_match(&self, candidate: &str) -> bool {
        self.glob.is_match(candidate)
            || self.below.as_deref().is_some_and(|dir| candidate.starts_with(dir))
    }
}

impl Scanner {
    /// `root` is the working directory that relative patterns resolve against.
    pub fn new(root: PathBuf, rules: &RuleSet) -> Result<Self> {
        let exclude = rules
            .exclude
            .iter()
            .map(|pattern| Exclusion::new(pattern, &root))
            .collect::<Result<Vec<_>>>()?;
        let ignore_files = rules
            .ignore_files
            .iter()
            .map(|path| absolutize(path, &root))
            .collect();

        Ok(Self {
            include: rules.include.clone(),
            exclude,
            ignore_files,
            ignore_extensions: rules.ignore_extensions.iter().cloned().collect(),
            root,
        })
    }

    /// Include resolution, then exclude, ignore-file and extension passes, then sort.
    pub fn scan(&self, report: &mut Report) -> Result<Vec<PathBuf>> {
        let mut candidates = self.resolve_includes(report);
        log::debug!("Include patterns resolved to {} candidates", candidates.len());

        if !self.exclude.is_empty() {
            candidates.retain(|path| !self.is_excluded(path));
        }

        let ignore = self.load_ignore_matcher(report)?;
        if !ignore.is_empty() {
            candidates.retain(|path| !ignore.is_ignored(path));
        }

        if !self.ignore_extensions.is_empty() {
            candidates.retain(|path| !self.has_ignored_extension(path));
        }

        let mut files: Vec<PathBuf> = candidates.into_iter().collect();
        files.sort_by_cached_key(|path| path.to_string_lossy().into_owned());
        Ok(files)
    }

    fn resolve_includes(&self, report: &mut Report) -> HashSet<PathBuf> {
        let mut candidates = HashSet::new();

        for pattern in &self.include {
            let path = absolutize(pattern, &self.root);

            if path.is_file() {
                candidates.insert(path);
            } else if path.is_dir() {
                candidates.extend(walk(&path, report));
            } else if is_glob(pattern) {
                let base = glob_base(&path);
                if !base.is_dir() {
                    log::debug!("Glob base {} does not exist", base.display());
                    continue;
                }
                let glob = match Glob::new(&to_slash(&path)) {
                    Ok(glob) => glob,
                    Err(err) => {
                        report.warn(format!("{:#}", err));
                        continue;
                    }
                };
                candidates.extend(
                    walk(&base, report)
                        .into_iter()
                        .filter(|file| glob.is_match(&to_slash(file))),
                );
            } else {
                log::debug!("Include pattern {} matched nothing", pattern);
            }
        }

        candidates
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let candidate = to_slash(path);
        match self.exclude.iter().find(|rule| rule.is_match(&candidate)) {
            Some(rule) => {
                log::debug!("Excluded {} by {}", candidate, rule.glob.as_str());
                true
            }
            None => false,
        }
    }

    fn load_ignore_matcher(&self, report: &mut Report) -> Result<IgnoreMatcher> {
        let patterns: Vec<IgnorePattern> = self
            .ignore_files
            .iter()
            .flat_map(|path| import_patterns(path, report))
            .collect();
        IgnoreMatcher::new(&patterns, &self.root)
    }

    fn has_ignored_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .is_some_and(|ext| self.ignore_extensions.contains(&ext))
    }
}

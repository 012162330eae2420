use crate::app::models::Report;
use ignore::{DirEntry, WalkBuilder};
use std::path::{Path, PathBuf};

/// Directory names never descended into, whatever the rules say.
pub const ALWAYS_SKIPPED_DIRS: [&str; 2] = ["node_modules", ".git"];

/// Lists every file under `root`. Unreadable directories are reported and skipped.
///
/// The walker keeps its own work list, so deep trees don't grow the call stack.
/// Order follows the directory listing; callers sort.
pub fn walk(root: &Path, report: &mut Report) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .filter_entry(|entry| !is_always_skipped(entry))
        .build();

    let mut files = Vec::new();
    for result in walker {
        match result {
            Ok(entry) => {
                if entry.path().is_file() {
                    files.push(entry.into_path());
                }
            }
            Err(err) => report.warn(format!("Error walking {}: {}", root.display(), err)),
        }
    }
    files
}

fn is_always_skipped(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_dir())
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| ALWAYS_SKIPPED_DIRS.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_walk_recurses_and_skips_cache_dirs() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/nested"))?;
        fs::create_dir_all(root.join("node_modules/pkg"))?;
        fs::create_dir_all(root.join(".git/objects"))?;
        fs::write(root.join("README.md"), "# hi")?;
        fs::write(root.join("src/main.rs"), "fn main() {}")?;
        fs::write(root.join("src/nested/mod.rs"), "")?;
        fs::write(root.join("node_modules/pkg/index.js"), "")?;
        fs::write(root.join(".git/objects/abc"), "")?;
        fs::write(root.join(".env"), "KEY=1")?;

        let mut report = Report::default();
        let mut files: Vec<PathBuf> = walk(root, &mut report)
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        files.sort();

        assert_eq!(
            files,
            vec![
                PathBuf::from(".env"),
                PathBuf::from("README.md"),
                PathBuf::from("src/main.rs"),
                PathBuf::from("src/nested/mod.rs"),
            ]
        );
        assert!(report.warnings.is_empty());
        Ok(())
    }

    #[test]
    fn test_walk_missing_root_warns() {
        let temp_dir = TempDir::new().unwrap();
        let mut report = Report::default();
        let files = walk(&temp_dir.path().join("gone"), &mut report);
        assert!(files.is_empty());
        assert!(!report.warnings.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_unreadable_dir_and_continues() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("ok"))?;
        fs::create_dir_all(root.join("locked"))?;
        fs::write(root.join("ok/a.txt"), "a")?;
        fs::write(root.join("locked/b.txt"), "b")?;
        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

        // root ignores permission bits; nothing to check then
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
            return Ok(());
        }

        let mut report = Report::default();
        let files = walk(root, &mut report);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;

        assert!(files.contains(&root.join("ok/a.txt")));
        assert!(!files.contains(&root.join("locked/b.txt")));
        assert!(!report.warnings.is_empty());
        Ok(())
    }
}

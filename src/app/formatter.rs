use crate::app::models::{Report, SkipReason};
use crate::app::paths::to_slash;
use pathdiff::diff_paths;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const WARN_FILE_BYTES: u64 = 10 * 1024 * 1024;
pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;
pub const MAX_OUTPUT_BYTES: u64 = 500 * 1024 * 1024;

#[derive(Debug, Clone)]
pub(crate) struct SizeLimits {
    pub warn_file: u64,
    pub max_file: u64,
    pub max_output: u64,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            warn_file: WARN_FILE_BYTES,
            max_file: MAX_FILE_BYTES,
            max_output: MAX_OUTPUT_BYTES,
        }
    }
}

const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff", "psd", "pdf", "zip", "gz", "tgz",
    "tar", "7z", "rar", "bz2", "xz", "exe", "dll", "so", "dylib", "o", "a", "lib", "bin", "class",
    "jar", "pyc", "wasm", "woff", "woff2", "ttf", "otf", "eot", "mp3", "mp4", "wav", "ogg", "avi",
    "mov", "mkv", "flac", "sqlite", "db",
];

#[derive(Default)]
struct TreeNode {
    size: u64,
    is_file: bool,
    children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    fn insert(&mut self, components: &[String], size: u64) {
        self.size += size;
        let Some((name, rest)) = components.split_first() else {
            return;
        };
        let child = self.children.entry(name.clone()).or_default();
        if rest.is_empty() {
            child.is_file = true;
            child.size += size;
        } else {
            child.insert(rest, size);
        }
    }

    fn render(&self, prefix: &str, out: &mut String) {
        let count = self.children.len();
        for (i, (name, child)) in self.children.iter().enumerate() {
            let last = i + 1 == count;
            let branch = if last { "└── " } else { "├── " };
            let marker = if child.is_file { "" } else { "/" };
            out.push_str(&format!(
                "{}{}{}{} ({})\n",
                prefix,
                branch,
                name,
                marker,
                format_size(child.size)
            ));
            if !child.is_file {
                let next = format!("{}{}", prefix, if last { "    " } else { "│   " });
                child.render(&next, out);
            }
        }
    }
}

pub struct OutputGenerator;

impl OutputGenerator {
    /// Box-drawing tree of `files` relative to `root`, each node with its size.
    pub fn generate_tree(files: &[PathBuf], root: &Path) -> String {
        let mut tree = TreeNode::default();
        for file in files {
            let size = fs::metadata(file).map(|m| m.len()).unwrap_or(0);
            let components: Vec<String> = relative_path(file, root)
                .split('/')
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
            tree.insert(&components, size);
        }

        let root_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| to_slash(root));
        let mut output = format!("{}/ ({})\n", root_name, format_size(tree.size));
        tree.render("", &mut output);

        output.trim_end().to_string()
    }

    /// Reads every file into a delimited block, honouring the size caps.
    pub fn generate_content(files: &[PathBuf], root: &Path, report: &mut Report) -> String {
        Self::generate_content_with_limits(files, root, report, &SizeLimits::default())
    }

    /// `report.total_bytes` counts what lands in the output, so binary files
    /// are charged for their placeholder line, not their size on disk.
    pub(crate) fn generate_content_with_limits(
        files: &[PathBuf],
        root: &Path,
        report: &mut Report,
        limits: &SizeLimits,
    ) -> String {
        let mut blocks = Vec::new();
        report.total_files = files.len();

        for (index, file) in files.iter().enumerate() {
            let relative = relative_path(file, root);

            let size = match fs::metadata(file) {
                Ok(meta) => meta.len(),
                Err(err) => {
                    report.skip(relative, SkipReason::Unreadable(err.to_string()));
                    continue;
                }
            };

            if size > limits.max_file {
                report.skip(relative, SkipReason::TooLarge(size));
                continue;
            }

            let placeholder = is_binary_extension(file)
                .then(|| format!("[Binary file omitted: {}]", format_size(size)));
            let charge = placeholder.as_ref().map_or(size, |p| p.len() as u64);

            if report.total_bytes + charge > limits.max_output {
                report.warn(format!(
                    "Output limit of {} reached, skipping remaining files",
                    format_size(limits.max_output)
                ));
                for rest in &files[index..] {
                    report.skip(relative_path(rest, root), SkipReason::OutputLimitReached);
                }
                break;
            }
            if size > limits.warn_file {
                report.warn(format!("{} is large ({})", relative, format_size(size)));
            }

            let body = match placeholder {
                Some(placeholder) => placeholder,
                None => match fs::read(file) {
                    Ok(bytes) => {
                        let text = String::from_utf8_lossy(&bytes);
                        format!(
                            "```{}\n{}\n```",
                            language_tag(file),
                            escape_fences(text.trim_end_matches('\n'))
                        )
                    }
                    Err(err) => {
                        report.skip(relative, SkipReason::Unreadable(err.to_string()));
                        continue;
                    }
                },
            };

            blocks.push(format!(
                "--- FILE: {0} ---\n{1}\n--- END FILE: {0} ---",
                relative, body
            ));
            report.total_bytes += charge;
            report.processed_files += 1;
        }

        blocks.join("\n\n")
    }

    pub fn format_full_output(tree: &str, content: &str) -> String {
        let mut out = Self::format_tree_output(tree);

        if !content.is_empty() {
            out.push_str("\n\n<file_contents>\n");
            out.push_str(content);
            out.push_str("\n</file_contents>");
        }

        out
    }

    pub fn format_tree_output(tree: &str) -> String {
        format!("<directory_structure>\n{}\n</directory_structure>", tree)
    }
}

/// Forward-slash path of `file` relative to `root`.
pub fn relative_path(file: &Path, root: &Path) -> String {
    let relative = diff_paths(file, root).unwrap_or_else(|| file.to_path_buf());
    to_slash(&relative)
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

pub fn is_binary_extension(path: &Path) -> bool {
    BINARY_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// Fence tag for syntax highlighting; empty when unknown.
pub fn language_tag(path: &Path) -> &'static str {
    match extension_of(path).as_str() {
        "rs" => "rust",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "tsx",
        "py" => "python",
        "rb" => "ruby",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "swift" => "swift",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => "cpp",
        "cs" => "csharp",
        "php" => "php",
        "lua" => "lua",
        "sh" | "bash" | "zsh" => "bash",
        "ps1" => "powershell",
        "sql" => "sql",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "xml" => "xml",
        "md" | "markdown" => "markdown",
        "vue" => "vue",
        "svelte" => "svelte",
        _ => "",
    }
}

/// Keeps file content from closing the surrounding fence.
pub fn escape_fences(text: &str) -> String {
    text.replace("```", "\\`\\`\\`")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_language_tag_and_binary_detection() {
        assert_eq!(language_tag(Path::new("src/main.RS")), "rust");
        assert_eq!(language_tag(Path::new("a/b.test.js")), "javascript");
        assert_eq!(language_tag(Path::new("Makefile")), "");
        assert!(is_binary_extension(Path::new("logo.PNG")));
        assert!(!is_binary_extension(Path::new("notes.txt")));
    }

    #[test]
    fn test_escape_fences() {
        assert_eq!(escape_fences("a ``` b"), "a \\`\\`\\` b");
        assert_eq!(escape_fences("``"), "``");
    }

    #[test]
    fn test_generate_tree_with_sizes() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("proj");
        fs::create_dir_all(root.join("src/util"))?;
        fs::write(root.join("README.md"), "0123456789")?;
        fs::write(root.join("src/a.js"), "abc")?;
        fs::write(root.join("src/util/b.js"), "de")?;
        let files = vec![
            root.join("README.md"),
            root.join("src/a.js"),
            root.join("src/util/b.js"),
        ];

        let tree = OutputGenerator::generate_tree(&files, &root);
        let expected = "proj/ (15 B)\n\
            ├── README.md (10 B)\n\
            └── src/ (5 B)\n    \
                ├── a.js (3 B)\n    \
                └── util/ (2 B)\n        \
                    └── b.js (2 B)";
        assert_eq!(tree, expected);
        Ok(())
    }

    #[test]
    fn test_generate_content_blocks_and_report() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::write(root.join("a.md"), "Use ```rust\nfn x() {}\n```\n")?;
        fs::write(root.join("logo.png"), [0u8, 159, 146, 150])?;
        let files = vec![root.join("a.md"), root.join("gone.rs"), root.join("logo.png")];

        let mut report = Report::default();
        let content = OutputGenerator::generate_content(&files, root, &mut report);

        assert!(content.starts_with("--- FILE: a.md ---\n```markdown\nUse \\`\\`\\`rust\n"));
        assert!(content.contains("--- END FILE: a.md ---"));
        assert!(content.contains("--- FILE: logo.png ---\n[Binary file omitted: 4 B]\n--- END FILE: logo.png ---"));
        assert!(!content.contains("gone.rs"));

        assert_eq!(report.total_files, 3);
        assert_eq!(report.processed_files, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, "gone.rs");
        assert!(matches!(report.skipped[0].reason, SkipReason::Unreadable(_)));
        Ok(())
    }

    #[test]
    fn test_oversized_file_is_skipped_unread() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::File::create(root.join("huge.log"))?.set_len(MAX_FILE_BYTES + 1)?;
        fs::write(root.join("small.txt"), "ok")?;
        let files = vec![root.join("huge.log"), root.join("small.txt")];

        let mut report = Report::default();
        let content = OutputGenerator::generate_content(&files, root, &mut report);

        assert!(!content.contains("huge.log"));
        assert!(content.contains("--- FILE: small.txt ---"));
        assert_eq!(report.processed_files, 1);
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::TooLarge(MAX_FILE_BYTES + 1)
        );
        Ok(())
    }

    #[test]
    fn test_output_limit_skips_remaining_files() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        for name in ["a.txt", "b.txt", "c.txt", "d.txt"] {
            fs::write(root.join(name), "0123456789")?;
        }
        let files: Vec<PathBuf> = ["a.txt", "b.txt", "c.txt", "d.txt"]
            .iter()
            .map(|n| root.join(n))
            .collect();
        let limits = SizeLimits {
            warn_file: 5,
            max_file: 100,
            max_output: 25,
        };

        let mut report = Report::default();
        let content =
            OutputGenerator::generate_content_with_limits(&files, root, &mut report, &limits);

        assert!(content.contains("--- FILE: b.txt ---"));
        assert!(!content.contains("c.txt"));
        assert_eq!(report.processed_files, 2);
        assert_eq!(report.total_bytes, 20);
        let skipped: Vec<&str> = report.skipped.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(skipped, vec!["c.txt", "d.txt"]);
        assert!(report
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::OutputLimitReached));
        // two "is large" warnings plus the limit warning
        assert_eq!(report.warnings.len(), 3);
        assert!(report.warnings[0].contains("a.txt is large"));
        Ok(())
    }

    #[test]
    fn test_binary_files_charge_placeholder_not_disk_size() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::write(root.join("photo.jpg"), vec![0u8; 4096])?;
        fs::write(root.join("notes.txt"), "0123456789")?;
        let files = vec![root.join("notes.txt"), root.join("photo.jpg")];
        let limits = SizeLimits {
            warn_file: 1024 * 1024,
            max_file: 1024 * 1024,
            max_output: 1024,
        };

        let mut report = Report::default();
        let content =
            OutputGenerator::generate_content_with_limits(&files, root, &mut report, &limits);

        assert!(content.contains("[Binary file omitted: 4.0 KB]"));
        assert!(report.skipped.is_empty());
        assert_eq!(
            report.total_bytes,
            10 + "[Binary file omitted: 4.0 KB]".len() as u64
        );
        Ok(())
    }

    #[test]
    fn test_full_output_sections() {
        let out = OutputGenerator::format_full_output("proj/ (0 B)", "--- FILE: x ---");
        assert!(out.starts_with("<directory_structure>\nproj/ (0 B)\n</directory_structure>"));
        assert!(out.ends_with("<file_contents>\n--- FILE: x ---\n</file_contents>"));
        assert_eq!(
            OutputGenerator::format_full_output("t", ""),
            "<directory_structure>\nt\n</directory_structure>"
        );
    }
}

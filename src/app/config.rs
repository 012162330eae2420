use crate::app::cli::Cli;
use crate::app::models::{RuleSet, RuntimeConfig};
use crate::app::rules::{load_rules, normalize_extension};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT: &str = "context.txt";

#[derive(Deserialize, Debug)]
struct PresetsFile {
    #[serde(flatten)]
    presets: HashMap<String, PresetConfig>,
}

#[derive(Deserialize, Debug, Clone, Default)]
struct PresetConfig {
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    ignore_files: Option<Vec<String>>,
    ignore_extensions: Option<Vec<String>>,
    output: Option<String>,
}

fn presets_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home
        .join(".config")
        .join("context_concat")
        .join("presets.toml"))
}

fn load_presets_file(path: &Path) -> Result<HashMap<String, PresetConfig>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read presets at {}", path.display()))?;

    let parsed: PresetsFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(parsed.presets)
}

/// Rule-file entries first, preset entries after; first occurrence wins.
fn merge_vecs(rule_vec: Vec<String>, preset_vec: Option<Vec<String>>) -> Vec<String> {
    let mut combined = rule_vec;
    if let Some(mut preset_items) = preset_vec {
        combined.append(&mut preset_items);
    }
    let mut seen = HashSet::new();
    combined.retain(|item| seen.insert(item.clone()));
    combined
}

/// Loads the rule file relative to `cwd` and layers the selected preset on top.
pub fn resolve_config(cli: Cli, cwd: &Path, project_name: Option<&str>) -> Result<RuntimeConfig> {
    let rules = load_rules(&cwd.join(&cli.rules))?;
    let presets = load_presets_file(&presets_path()?)?;
    Ok(merge_config(cli, rules, &presets, project_name))
}

fn merge_config(
    cli: Cli,
    rules: RuleSet,
    presets: &HashMap<String, PresetConfig>,
    project_name: Option<&str>,
) -> RuntimeConfig {
    // --preset > working directory name > none
    let preset_key = cli.preset.as_deref().or(project_name);
    let preset = preset_key
        .and_then(|k| presets.get(k))
        .cloned()
        .unwrap_or_default();
    if let Some(key) = preset_key.filter(|k| presets.contains_key(*k)) {
        log::info!("Using preset '{}'", key);
    } else if let Some(key) = cli.preset.as_deref() {
        log::warn!("Preset '{}' not found, using the rule file only", key);
    }

    let preset_extensions = preset.ignore_extensions.map(|exts| {
        exts.iter()
            .filter_map(|ext| normalize_extension(ext))
            .collect()
    });

    let output = cli
        .output
        .or_else(|| preset.output.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    RuntimeConfig {
        rules: RuleSet {
            include: merge_vecs(rules.include, preset.include),
            exclude: merge_vecs(rules.exclude, preset.exclude),
            ignore_files: merge_vecs(rules.ignore_files, preset.ignore_files),
            ignore_extensions: merge_vecs(rules.ignore_extensions, preset_extensions),
        },
        output,
        tree_only_output: cli.tree,
        list_only: cli.list,
        to_stdout: cli.stdout,
    }
}

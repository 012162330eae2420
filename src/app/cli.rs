use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Concatenate selected files into a single annotated context document"
)]
pub struct Cli {
    /// Rule file listing `++ include`, `-- exclude`, `--ignorefile:` and `--ignoreextension:` lines
    #[arg(long, short = 'r', default_value = ".context-rules")]
    pub rules: PathBuf,

    /// Where to write the document [default: context.txt]
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Use a predefined set of patterns from presets.toml
    #[arg(long)]
    pub preset: Option<String>,

    /// Show only the directory tree structure
    #[arg(long)]
    pub tree: bool,

    /// Print the selected files and exit
    #[arg(long, conflicts_with = "tree")]
    pub list: bool,

    /// Print the document instead of writing the output file
    #[arg(long)]
    pub stdout: bool,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

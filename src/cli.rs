use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "qdd",
    version,
    about = "Normalize fisheries decision-tree spreadsheet exports and evaluate them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize the exported tables into a single decision model document.
    Import(ImportArgs),
    /// Recommend targets for one answer to one question.
    Evaluate(EvaluateArgs),
    /// Walk through questions interactively.
    Ask(AskArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Directory holding attributes.json, targets.json, questions.json,
    /// criteria.json, caveats.json, colormap.json and notes.json.
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Single JSON file with every table under its own key; takes precedence
    /// over --data-dir.
    #[arg(long)]
    pub bundle: Option<PathBuf>,

    #[arg(long, default_value = "qdd.json")]
    pub output: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[arg(long, default_value = "qdd.json")]
    pub model: PathBuf,

    /// Spreadsheet QuestionID.
    #[arg(long)]
    pub question: i64,

    /// Zero-based answer index.
    #[arg(long)]
    pub choice: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub no_color: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    #[arg(long, default_value = "qdd.json")]
    pub model: PathBuf,

    #[arg(long, default_value_t = false)]
    pub no_color: bool,
}

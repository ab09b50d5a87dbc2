//! Feedview CLI
//!
//! Command-line access to the stage-tree and path-tree builders and to
//! replaying store actions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use feedview_store::{Action, ResourceStore};
use feedview_tree::{
    build_instance_tree, FileRecord, PathTreeBuilder, RootPolicy, StageId, StageRecord,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "feedview")]
#[command(author, version, about = "Feedview: browse pipeline stages and their output files")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a feed snapshot: the stage tree and one stage's files
    Feed {
        /// Snapshot file: {"stages": [...], "files": {"<stageId>": [...]}}
        input: PathBuf,

        /// Stage whose files to show (defaults to the root stage)
        #[arg(long)]
        stage: Option<StageId>,

        /// How to root the file tree: empty | common-prefix
        #[arg(long)]
        root_policy: Option<RootPolicy>,
    },

    /// Dispatch a JSON array of actions into a fresh store and show a path
    Replay {
        /// Actions file
        input: PathBuf,

        /// Path to show (defaults to the store's current path)
        #[arg(long)]
        path: Option<String>,

        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Deserialize)]
struct FeedSnapshot {
    stages: Vec<StageRecord>,
    #[serde(default)]
    files: BTreeMap<StageId, Vec<FileRecord>>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    init_tracing(&config, cli.verbose);

    match cli.command {
        Commands::Feed {
            input,
            stage,
            root_policy,
        } => cmd_feed(&input, stage, root_policy.unwrap_or(config.root_policy)),
        Commands::Replay { input, path, json } => cmd_replay(&input, path.as_deref(), json, &config),
    }
}

fn init_tracing(config: &CliConfig, verbose: bool) {
    let filter = EnvFilter::new(config.log_filter(verbose));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {what} {}", path.display()))
}

fn cmd_feed(input: &Path, stage: Option<StageId>, root_policy: RootPolicy) -> Result<ExitCode> {
    let snapshot: FeedSnapshot = read_json(input, "snapshot")?;
    tracing::info!(
        stages = snapshot.stages.len(),
        file_sets = snapshot.files.len(),
        "loaded snapshot"
    );

    let root = match build_instance_tree(&snapshot.stages) {
        Ok(root) => root,
        Err(err) => {
            println!("{} {}", "tree unavailable:".red().bold(), err);
            return Ok(ExitCode::from(2));
        }
    };

    let selected_id = stage.unwrap_or_else(|| root.id());
    let selected = root
        .find(selected_id)
        .ok_or_else(|| anyhow!("stage {selected_id} is not part of the feed"))?;

    println!("{} ({} stages)", "Stages".green().bold(), root.len());
    print!("{}", render::render_stage_tree(&root, Some(selected_id)));
    if let Some(path) = root.path_to(selected_id) {
        let trail: Vec<String> = path.iter().map(|id| id.to_string()).collect();
        println!("{} {}", "Selected".green().bold(), trail.join(" > "));
    }

    let files = snapshot
        .files
        .get(&selected_id)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let mut builder = PathTreeBuilder::new().with_root_policy(root_policy);
    if root_policy == RootPolicy::Empty {
        builder = builder.with_root_name(selected.record.display_name());
    }
    match builder.build(files) {
        Ok(tree) => {
            println!();
            println!("{} ({} files)", "Files".green().bold(), tree.leaf_count());
            print!("{}", render::render_path_tree(&tree));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("{} {}", "file tree unavailable:".red().bold(), err);
            Ok(ExitCode::from(2))
        }
    }
}

fn cmd_replay(input: &Path, path: Option<&str>, json: bool, config: &CliConfig) -> Result<ExitCode> {
    let actions: Vec<Action> = read_json(input, "actions")?;
    let mut store = ResourceStore::new(config.store.clone());
    for action in actions {
        store.dispatch(action);
    }

    let view = match path {
        Some(path) => store.view(path),
        None => store.current_view(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render::render_view(&view));
    }
    Ok(ExitCode::SUCCESS)
}

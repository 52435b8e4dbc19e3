mod config;

use std::{env, path::PathBuf};

use clap::{Parser, Subcommand};
use novelty_story::{
    DocumentError, LocalFileStore, NodeId, NodeTable, Story, StoryNode, StoreError, load_story,
};
use novelty_tree::{Order, Tree};
use novelty_view::{Layout, LayoutError, Outline, Size};
use thiserror::Error;
use tracing::{debug, info};

pub use crate::config::{CONFIG_FILE_NAME, Config, ConfigError, TraversalConfig};

#[derive(Parser, Debug)]
#[command(name = "novelty", version, about = "Explore branching stories as trees")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long = "config", global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level (e.g., trace, debug, info, warn, error).
    #[arg(long = "log", global = true, default_value = "info")]
    pub log: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print node titles in traversal order
    Traverse {
        /// Story document (.json, .toml or .storybundle)
        file: PathBuf,

        /// bfs or dfs, defaults to the configured order
        #[arg(long = "order")]
        order: Option<Order>,
    },
    /// Print the story as an outline
    Outline { file: PathBuf },
    /// Print node positions and edges as JSON
    Layout { file: PathBuf },
    /// Load a story from a directory of node files
    Import {
        dir: PathBuf,

        /// Id of the first node
        #[arg(long = "root")]
        root: String,
    },
    /// Write a story out as a directory of node files
    Export { file: PathBuf, dir: PathBuf },
    /// Rewrite a story document in the format named by the output extension
    Convert { file: PathBuf, out: PathBuf },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("failed to encode layout: {0}")]
    Json(#[from] serde_json::Error),
}

pub async fn get_config(cli: &Cli) -> Result<Config, AppError> {
    let config_path = cli
        .config_path
        .clone()
        .or_else(|| env::var("NOVELTY_CONFIG").ok().map(PathBuf::from))
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let config = Config::load(&config_path).await?;
    Ok(config)
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = get_config(&cli).await?;
    let output = execute(&config, cli.command).await?;
    println!("{output}");
    Ok(())
}

/// Run one command, returning what it prints.
pub async fn execute(config: &Config, command: Command) -> Result<String, AppError> {
    match command {
        Command::Traverse { file, order } => {
            let order = order.unwrap_or(config.traversal.order);
            cmd_traverse(Story::load(&file).await?, order)
        }
        Command::Outline { file } => cmd_outline(Story::load(&file).await?),
        Command::Layout { file } => cmd_layout(config, Story::load(&file).await?),
        Command::Import { dir, root } => cmd_import(dir, NodeId::new(root)).await,
        Command::Export { file, dir } => cmd_export(Story::load(&file).await?, dir).await,
        Command::Convert { file, out } => cmd_convert(Story::load(&file).await?, out).await,
    }
}

fn titles(story: &Story) -> Tree<&str> {
    story.tree_ref().map(StoryNode::title_or_untitled)
}

fn cmd_traverse(story: Story, order: Order) -> Result<String, AppError> {
    debug!(%order, "traversing story");
    Ok(titles(&story).traversal(order).to_string())
}

fn cmd_outline(story: Story) -> Result<String, AppError> {
    Ok(Outline::new(&story.tree_ref()).to_string())
}

fn cmd_layout(config: &Config, story: Story) -> Result<String, AppError> {
    let mut next = 0;
    let numbered = titles(&story).map(|title| {
        let index = next;
        next += 1;
        (index, title)
    });
    let layout = Layout::compute(
        &numbered,
        &config.layout,
        |&(index, _)| index,
        |(_, title)| Size::new(title.chars().count() as f64, 1.0),
    )?;
    Ok(serde_json::to_string_pretty(&layout)?)
}

async fn cmd_import(dir: PathBuf, root: NodeId) -> Result<String, AppError> {
    let store = LocalFileStore::new(dir);
    let story = load_story(&store, root).await?;
    info!(nodes = story.nodes().len(), "imported story");
    cmd_outline(story)
}

async fn cmd_export(story: Story, dir: PathBuf) -> Result<String, AppError> {
    let table = NodeTable::from_story(&story);
    let store = LocalFileStore::new(dir);
    let root = store.write_table(&table).await?;
    info!(nodes = table.nodes.len(), dir = ?store.dir(), "exported story");
    Ok(root.to_string())
}

async fn cmd_convert(story: Story, out: PathBuf) -> Result<String, AppError> {
    story.save(&out).await?;
    info!(out = ?out, "converted story");
    Ok(out.display().to_string())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    async fn sample_file(dir: &Path) -> PathBuf {
        let path = dir.join("sample.json");
        Story::sample().save(&path).await.unwrap();
        path
    }

    #[tokio::test]
    async fn traverse_in_either_order() {
        let dir = tempfile::tempdir().unwrap();
        let file = sample_file(dir.path()).await;
        let config = Config::default();

        let dfs = execute(&config, Command::Traverse {
            file: file.clone(),
            order: None,
        })
        .await
        .unwrap();
        assert_eq!(dfs, "Beginnings, Mock 1, Mock 2, Mock 4, Mock 3");

        let bfs = execute(&config, Command::Traverse {
            file,
            order: Some(Order::Bfs),
        })
        .await
        .unwrap();
        assert_eq!(bfs, "Beginnings, Mock 1, Mock 2, Mock 3, Mock 4");
    }

    #[tokio::test]
    async fn configured_order_is_the_default() {
        let dir = tempfile::tempdir().unwrap();
        let file = sample_file(dir.path()).await;
        let config = Config {
            traversal: TraversalConfig { order: Order::Bfs },
            ..Default::default()
        };
        let output = execute(&config, Command::Traverse { file, order: None })
            .await
            .unwrap();
        assert_eq!(output, "Beginnings, Mock 1, Mock 2, Mock 3, Mock 4");
    }

    #[tokio::test]
    async fn export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let file = sample_file(dir.path()).await;
        let nodes = dir.path().join("nodes");
        let config = Config::default();

        let root = execute(&config, Command::Export {
            file: file.clone(),
            dir: nodes.clone(),
        })
        .await
        .unwrap();
        assert_eq!(root, "node-0");

        let imported = execute(&config, Command::Import { dir: nodes, root })
            .await
            .unwrap();
        let outline = execute(&config, Command::Outline { file }).await.unwrap();
        assert_eq!(imported, outline);
        assert_eq!(
            outline.lines().collect::<Vec<_>>(),
            vec![
                "Beginnings",
                "└── Mock 1",
                "    ├── Mock 2",
                "    │   └── Mock 4",
                "    └── Mock 3",
            ]
        );
    }

    #[tokio::test]
    async fn convert_to_story_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let file = sample_file(dir.path()).await;
        let bundle = dir.path().join(Story::sample().bundle_file_name());
        let config = Config::default();

        execute(&config, Command::Convert {
            file: file.clone(),
            out: bundle.clone(),
        })
        .await
        .unwrap();

        let from_bundle = execute(&config, Command::Outline { file: bundle }).await.unwrap();
        let from_json = execute(&config, Command::Outline { file }).await.unwrap();
        assert_eq!(from_bundle, from_json);
    }

    #[tokio::test]
    async fn layout_is_json() {
        let dir = tempfile::tempdir().unwrap();
        let file = sample_file(dir.path()).await;
        let output = execute(&Config::default(), Command::Layout { file })
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["nodes"].as_object().unwrap().len(), 5);
        assert_eq!(value["edges"].as_array().unwrap().len(), 4);
        assert_eq!(value["edges"][0]["from"], 0);
        assert_eq!(value["edges"][0]["to"], 1);
    }

    #[tokio::test]
    async fn missing_story_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(&Config::default(), Command::Outline {
            file: dir.path().join("absent.json"),
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Document(DocumentError::Read { .. })));
    }
}

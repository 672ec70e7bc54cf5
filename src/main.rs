//! Embedding Annotation Viewer
//!
//! CLI commands:
//! - gui: Launch the native viewer
//! - list: List configured model views
//! - summarize: Run the transform headless and print counts
//! - export: Write transformed points as JSON

mod color;
mod config;
mod dataset;
mod gui;
mod logging;
mod session;
mod transform;
mod xref;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "embedviz")]
#[command(about = "Interactive scatterplots of motion-caption embeddings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to views.yaml config
    #[arg(short, long, default_value = "views.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch native viewer
    Gui {
        /// View to open (defaults to the first configured view)
        #[arg(long)]
        view: Option<String>,
    },

    /// List configured model views
    List,

    /// Run the transform without a display and print a summary
    Summarize {
        /// View to summarize (defaults to the first configured view)
        #[arg(long)]
        view: Option<String>,

        /// Annotation cap (defaults to the config's default_cap)
        #[arg(long)]
        cap: Option<usize>,
    },

    /// Write transformed points and caption lists as JSON
    Export {
        /// View to export (defaults to the first configured view)
        #[arg(long)]
        view: Option<String>,

        /// Annotation cap (defaults to the config's default_cap)
        #[arg(long)]
        cap: Option<usize>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging first
    logging::init_logging("logs");
    tracing::info!("Embedding viewer starting up");

    let cli = Cli::parse();
    tracing::debug!("CLI args parsed: config={:?}", cli.config);

    // Load config
    let config = if cli.config.exists() {
        tracing::info!("Loading config from {:?}", cli.config);
        config::Config::load(&cli.config)?
    } else {
        tracing::warn!("Config file not found: {:?}, using defaults", cli.config);
        default_config()
    };
    tracing::info!("Config loaded: {} views, default cap {}",
        config.views.len(), config.default_cap);

    match cli.command {
        Commands::Gui { view } => {
            tracing::info!("Launching native viewer");
            gui::run_viewer(config, view)?;
        }

        Commands::List => {
            list_views(&config);
        }

        Commands::Summarize { view, cap } => {
            let view = resolve_view(&config, view.as_deref())?;
            let cap = cap.unwrap_or(config.default_cap);
            summarize(&view, cap)?;
        }

        Commands::Export { view, cap, output } => {
            let view = resolve_view(&config, view.as_deref())?;
            let cap = cap.unwrap_or(config.default_cap);
            export(&view, cap, &output)?;
        }
    }

    Ok(())
}

/// Pick a view by ID, or the first configured one
fn resolve_view(config: &config::Config, id: Option<&str>) -> anyhow::Result<config::ModelView> {
    match id {
        Some(id) => config
            .get_view(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("View not found: {}", id)),
        None => config
            .views
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No views configured")),
    }
}

/// List configured views
fn list_views(config: &config::Config) {
    println!("Configured views ({}):", config.views.len());
    println!();
    for view in &config.views {
        println!("  - {} [{}] key={} data={}", view.name, view.id, view.embedding_key, view.data);
    }
}

/// Run the transform and print counts
fn summarize(view: &config::ModelView, cap: usize) -> anyhow::Result<()> {
    let dataset = dataset::load_dataset(&view.data)?;
    let out = transform::transform(&dataset, cap, &view.embedding_key);

    println!("View: {} ({})", view.name, view.id);
    println!("  sequences in dataset: {}", dataset.len());
    println!("  cap: {}", cap);
    println!("  points: {}", out.points.len());
    println!("  BABEL captions: {}", out.babel_texts.len());
    println!("  HumanML3D captions: {}", out.humanml3d_texts.len());
    Ok(())
}

/// Run the transform and write the result as JSON
fn export(view: &config::ModelView, cap: usize, output: &PathBuf) -> anyhow::Result<()> {
    let dataset = dataset::load_dataset(&view.data)?;
    let out = transform::transform(&dataset, cap, &view.embedding_key);

    let points: Vec<serde_json::Value> = out
        .points
        .iter()
        .map(|p| {
            serde_json::json!({
                "x": p.x,
                "y": p.y,
                "text": p.text,
                "labels": p.labels,
            })
        })
        .collect();

    let data = serde_json::json!({
        "view": view.id,
        "embedding_key": view.embedding_key,
        "cap": cap,
        "points": points,
        "babel_texts": out.babel_texts,
        "humanml3d_texts": out.humanml3d_texts,
    });

    std::fs::write(output, serde_json::to_string_pretty(&data)?)?;
    println!("Wrote {} points to {:?}", out.points.len(), output);
    Ok(())
}

/// Default config when no file exists
fn default_config() -> config::Config {
    config::Config {
        default_cap: 1000,
        views: vec![config::ModelView {
            id: "clip".to_string(),
            name: "CLIP projection".to_string(),
            data: "data/babel_humanml3d_embedding.json".to_string(),
            embedding_key: "clip_embedding_2d".to_string(),
        }],
    }
}

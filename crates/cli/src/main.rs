//! `sdtd-config` - inspect, edit and normalize 7 Days to Die config XML

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use sdtd_config::config::default_config_path;
use sdtd_config::serializer;
use sdtd_config::{
    load_blocks, load_items, load_materials, load_recipes, Block, Collection, DataSet, EditorConfig,
    Entity,
};

#[derive(Parser)]
#[command(author, version, about = "Inspect and edit 7 Days to Die config XML", long_about = None)]
struct Cli {
    /// Editor settings file (defaults to ./sdtd-config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Blocks,
    Items,
    Materials,
    Recipes,
}

#[derive(Subcommand)]
enum Cmd {
    /// Load a document and write it back in canonical form
    Normalize {
        input: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Kind::Blocks)]
        kind: Kind,
    },
    /// Print a block's effective property value
    Get {
        blocks: PathBuf,
        block: String,
        property: String,
    },
    /// Set or reset a property on one or more blocks
    Set {
        blocks: PathBuf,
        property: String,
        /// New value
        #[arg(long, required_unless_present = "unset", conflicts_with = "unset")]
        value: Option<String>,
        /// Remove the override so the inherited value applies
        #[arg(long)]
        unset: bool,
        #[arg(required = true)]
        names: Vec<String>,
        /// Output file (edits in place if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print every effective property of a block
    Show {
        blocks: PathBuf,
        block: String,
        #[arg(long)]
        json: bool,
    },
    /// List blocks of a data directory matching a material and/or name
    Filter {
        dir: PathBuf,
        #[arg(long)]
        material: Option<String>,
        /// Case-insensitive part of the block name
        #[arg(long)]
        name: Option<String>,
    },
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::load(path).with_context(|| format!("load config {}", path.display())),
        None => {
            let path = default_config_path();
            if path.exists() {
                EditorConfig::load(&path).with_context(|| format!("load config {}", path.display()))
            } else {
                Ok(EditorConfig::default())
            }
        }
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn open_blocks(path: &Path, config: &EditorConfig) -> Result<Collection<Block>> {
    let text = read(path)?;
    load_blocks(&text, &Collection::new(), config.load_options())
        .with_context(|| format!("load blocks from {}", path.display()))
}

fn normalize(input: &Path, output: Option<&Path>, kind: Kind, config: &EditorConfig) -> Result<()> {
    let text = read(input)?;
    let root = match kind {
        Kind::Blocks => {
            let blocks = load_blocks(&text, &Collection::new(), config.load_options())?;
            serializer::blocks_document(&blocks)?
        }
        Kind::Items => serializer::items_document(&load_items(&text)?),
        Kind::Materials => serializer::materials_document(&load_materials(&text)?)?,
        Kind::Recipes => serializer::recipes_document(&load_recipes(&text)?),
    };

    match output {
        Some(path) => serializer::save(path, &root, config.indent)?,
        None => print!("{}", serializer::to_string(&root, config.indent)?),
    }
    Ok(())
}

fn set(
    path: &Path,
    property: &str,
    value: Option<&str>,
    names: &[String],
    output: Option<&Path>,
    config: &EditorConfig,
) -> Result<()> {
    let mut data = DataSet::new();
    data.blocks = open_blocks(path, config)?;
    let changed = data.set_property_bulk(names, property, value)?;

    let target = output.unwrap_or(path);
    serializer::save(target, &serializer::blocks_document(&data.blocks)?, config.indent)?;
    info!("{} of {} blocks changed", changed, names.len());
    println!("{changed}");
    Ok(())
}

fn show(path: &Path, block: &str, json: bool, config: &EditorConfig) -> Result<()> {
    let blocks = open_blocks(path, config)?;
    let properties = blocks.effective_properties(block)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&properties)?);
    } else {
        for (key, value) in &properties {
            println!("{key} = {value}");
        }
    }
    Ok(())
}

fn filter(dir: PathBuf, material: Option<&str>, name: Option<&str>, config: EditorConfig) -> Result<()> {
    let config = EditorConfig {
        data_dir: dir,
        ..config
    };
    let data = DataSet::load(&config).with_context(|| format!("load {}", config.data_dir.display()))?;
    for block in data.filter_blocks(material, name)? {
        println!("{}\t{}", block.block_id(), block.name());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.log_level);

    match cli.cmd {
        Cmd::Normalize {
            input,
            output,
            kind,
        } => normalize(&input, output.as_deref(), kind, &config),
        Cmd::Get {
            blocks,
            block,
            property,
        } => {
            let collection = open_blocks(&blocks, &config)?;
            match collection.get_property(&block, &property)? {
                Some(value) => println!("{value}"),
                // Unset means the game default applies
                None => debug!("{block} has no value for {property}"),
            }
            Ok(())
        }
        Cmd::Set {
            blocks,
            property,
            value,
            unset: _,
            names,
            output,
        } => set(
            &blocks,
            &property,
            value.as_deref(),
            &names,
            output.as_deref(),
            &config,
        ),
        Cmd::Show { blocks, block, json } => show(&blocks, &block, json, &config),
        Cmd::Filter {
            dir,
            material,
            name,
        } => filter(dir, material.as_deref(), name.as_deref(), config),
    }
}

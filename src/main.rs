use anyhow::{Context, bail};
use clap::{ArgAction, Parser};
use std::fs;
use std::path::{Path, PathBuf};

mod diagnostics;
mod model;
mod record;
mod render;
mod source;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "omni-treemap")]
#[command(about = "Turn an Omni semantic model into D3 treemap JSON", long_about = None)]
struct Cli {
    /// Model directory, searched recursively for *.topic.yaml and *.view.yaml.
    #[arg(long, default_value = "omni")]
    root: PathBuf,

    #[arg(short = 'o', long, default_value = "treemap.json")]
    output: PathBuf,

    /// Indent the JSON output by two spaces (`--pretty false` for one line).
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pretty: bool,

    /// Print one line per parsed topic and view.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    run(&Cli::parse())
}

/// Fails before anything is scanned or written when `root` is not a directory.
fn check_root(root: &Path) -> Result<()> {
    if !root.is_dir() {
        bail!("omni root directory not found: {}", root.display());
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    check_root(&cli.root)?;

    println!("Scanning: {}", cli.root.display());

    // 1) Discover + parse sources (bad files are reported and skipped).
    let files = source::find_source_files(&cli.root)?;
    let catalog = source::Catalog::load(&files);

    if cli.verbose {
        for topic in catalog.topics() {
            println!(
                "topic {}: base {}, {} join(s)",
                topic.name,
                topic.base_view,
                topic.joined_views.len()
            );
        }
        for view in catalog.views() {
            println!(
                "view {}.{}: {} field(s)",
                view.schema,
                view.name,
                view.field_count()
            );
        }
    }

    // 2) Assemble.
    let tree = model::build_treemap(catalog.topics(), catalog.views());
    println!("{}", model::Summary::of(&tree));

    // 3) Serialize.
    let json = render::render_treemap_json(&tree, cli.pretty)?;
    fs::write(&cli.output, json).with_context(|| {
        diagnostics::error_message(format!("write output file {}", cli.output.display()))
    })?;
    println!("Wrote {}", cli.output.display());

    Ok(())
}

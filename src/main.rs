use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use namedfile::bootstrap::{
    load_config, tracing::init_tracing_subscriber, wire_scaling, ScalingRuntime,
};
use namedfile::FileDocument;
use nf_app::{ScaleQuery, TagOptions};
use nf_core::ports::BlobPort;
use nf_core::{Direction, ScalingConfig};
use nf_infra::FsBlobStore;

#[derive(Parser, Debug)]
#[command(name = "namedfile", version, about = "Scale images and render their tags")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scale an image file and print the `<img>` tag of the scale
    Scale(ScaleArgs),
    /// Print the named size catalog
    Sizes {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ScaleArgs {
    /// Source image file
    image: PathBuf,
    #[arg(long, default_value = "image")]
    field: String,
    /// Named size; takes precedence over --width/--height
    #[arg(long)]
    scale: Option<String>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// thumbnail, scale-crop-to-fit or scale-crop-to-fill
    #[arg(long)]
    direction: Option<Direction>,
    #[arg(long)]
    quality: Option<u8>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the scaled image here
    #[arg(long)]
    out: Option<PathBuf>,
    /// Address of the content object used in rendered urls
    #[arg(long, default_value = "http://localhost/item")]
    url: String,
    /// Directory holding ingested blobs; defaults to the system temp dir
    #[arg(long)]
    blob_root: Option<PathBuf>,
}

fn load(config: Option<&PathBuf>) -> anyhow::Result<ScalingConfig> {
    match config {
        Some(path) => load_config(path),
        None => Ok(ScalingConfig::defaults()),
    }
}

fn scale_document(
    args: &ScaleArgs,
    runtime: &ScalingRuntime,
    blob: Arc<dyn BlobPort>,
) -> anyhow::Result<()> {
    let document = Arc::new(FileDocument::ingest(
        &args.image,
        &args.field,
        &args.url,
        blob,
    )?);
    let view = runtime.view(document);

    let mut query = ScaleQuery::new().field(args.field.as_str());
    query.scale = args.scale.clone();
    query.width = args.width;
    query.height = args.height;
    query.direction = args.direction;
    query.quality = args.quality;

    let scale = view
        .scale(&query)?
        .context("No scale could be produced for this request")?;
    println!("{}", scale.tag(&TagOptions::new()));

    if let Some(out) = &args.out {
        let bytes = scale.bytes()?;
        std::fs::write(out, &bytes)
            .with_context(|| format!("Failed to write scale: {}", out.display()))?;
        tracing::info!(path = %out.display(), bytes = bytes.len(), "wrote scale");
    }
    Ok(())
}

fn run_scale(args: ScaleArgs) -> anyhow::Result<()> {
    let config = load(args.config.as_ref())?;
    let runtime = wire_scaling(&config);

    let root = args
        .blob_root
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("namedfile"));
    let store = FsBlobStore::new(root);
    let blob = store.create().context("Failed to allocate blob")?;
    let blob_id = blob.blob_id().to_string();

    let result = scale_document(&args, &runtime, Arc::new(blob));

    if let Err(err) = store.delete(&blob_id) {
        tracing::warn!(blob_id = %blob_id, error = %err, "failed to remove ingested blob");
    }
    result
}

fn run_sizes(config: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load(config.as_ref())?;
    if config.scaling.sizes.is_empty() {
        println!("no named sizes configured");
    }
    for (name, (width, height)) in &config.scaling.sizes {
        println!("{name}\t{width}x{height}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing_subscriber()?;

    match Cli::parse().command {
        Command::Scale(args) => run_scale(args),
        Command::Sizes { config } => run_sizes(config),
    }
}

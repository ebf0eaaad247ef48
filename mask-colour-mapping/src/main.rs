/// Mask colour mapping entry point
use anyhow::{Context, Result};
use clap::Parser;
use mask_colour_mapping::{
    ManifestGenerator, MappingConfig, MappingManifest, MaskMappingPipeline, Session,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mask-colour-mapping",
    about = "Composite overlapping masks and resolve the label colour mapping"
)]
struct Args {
    /// Session JSON with renderables, channel averages and mask voxels
    session: PathBuf,

    /// Mapping configuration JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Manifest output path (defaults to <session>_mapping.json)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => MappingConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => MappingConfig::default(),
    };

    let session = Session::load(&args.session)
        .with_context(|| format!("reading session {}", args.session.display()))?;

    let mut pipeline = MaskMappingPipeline::new(config)?;
    let output = pipeline.run(&session).context("mask colour mapping failed")?;

    let output_path = args.output.unwrap_or_else(|| {
        let stem = args
            .session
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        args.session.with_file_name(format!("{}_mapping.json", stem))
    });

    let manifest = MappingManifest::from_output(&output);
    ManifestGenerator::new(&output_path)
        .write(&manifest)
        .with_context(|| format!("writing manifest {}", output_path.display()))?;

    Ok(())
}

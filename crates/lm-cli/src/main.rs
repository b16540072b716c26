mod manifest;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lm_core::{OutputKind, synthesize};
use lm_gen::{GenerationConfig, GenerationRequest};
use lm_render::{GuideStyle, compose_guide_image};
use manifest::Manifest;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "lumen", version, about = "Inspect scene annotations offline")]
struct Cli {
    /// Generation config JSON (retry and polling settings).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the synthesized prompt for a manifest.
    Prompt(PromptArgs),
    /// Write the guide image (source with light lines burned in).
    Guide(GuideArgs),
    /// Print the full request as JSON: prompt, aspect ratio, reference order.
    Request(RequestArgs),
    /// Print the effective generation config.
    Config,
}

#[derive(Parser, Debug)]
struct PromptArgs {
    /// Scene manifest JSON.
    manifest: PathBuf,

    /// Use the video closing clause.
    #[arg(long)]
    video: bool,
}

#[derive(Parser, Debug)]
struct GuideArgs {
    /// Scene manifest JSON.
    manifest: PathBuf,

    /// Output image path.
    #[arg(short, long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RequestArgs {
    /// Scene manifest JSON.
    manifest: PathBuf,

    #[arg(long)]
    video: bool,

    /// Also write the guide image here.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.cmd {
        Command::Prompt(args) => cmd_prompt(args),
        Command::Guide(args) => cmd_guide(args),
        Command::Request(args) => cmd_request(args),
        Command::Config => cmd_config(cli.config.as_deref()),
    }
}

fn output_kind(video: bool) -> OutputKind {
    if video {
        OutputKind::Video
    } else {
        OutputKind::Image
    }
}

fn cmd_prompt(args: PromptArgs) -> anyhow::Result<()> {
    let loaded = Manifest::load(&args.manifest)?;
    let prompt = synthesize(&loaded.settings.prompt, &loaded.scene, output_kind(args.video));
    println!("{}", prompt.text);
    Ok(())
}

fn cmd_guide(args: GuideArgs) -> anyhow::Result<()> {
    let loaded = Manifest::load(&args.manifest)?;
    let guide = compose_guide_image(&loaded.source, &loaded.scene, &GuideStyle::default())
        .context("composite guide")?;
    if !loaded.scene.has_linear_lights() {
        log::warn!("no linear lights: guide is the unmodified source");
    }
    write_output(&args.out, &guide.bytes)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

#[derive(Serialize)]
struct RequestSummary<'a> {
    kind: OutputKind,
    aspect_ratio: lm_core::AspectRatio,
    prompt: &'a str,
    guide_mime_type: &'a str,
    guide_bytes: usize,
    references: Vec<ReferenceSummary<'a>>,
}

#[derive(Serialize)]
struct ReferenceSummary<'a> {
    ordinal: usize,
    element: &'a str,
    mime_type: &'a str,
    bytes: usize,
}

fn cmd_request(args: RequestArgs) -> anyhow::Result<()> {
    let loaded = Manifest::load(&args.manifest)?;
    let request = GenerationRequest::assemble(
        &loaded.settings,
        &loaded.scene,
        &loaded.source,
        output_kind(args.video),
        &GuideStyle::default(),
    )
    .context("assemble request")?;

    let references = request
        .references
        .iter()
        .zip(&request.reference_owners)
        .enumerate()
        .map(|(i, (image, owner))| ReferenceSummary {
            ordinal: i + 1,
            element: owner.as_str(),
            mime_type: &image.mime_type,
            bytes: image.len(),
        })
        .collect();
    let summary = RequestSummary {
        kind: request.kind,
        aspect_ratio: request.aspect_ratio,
        prompt: &request.prompt,
        guide_mime_type: &request.image.mime_type,
        guide_bytes: request.image.len(),
        references,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(out) = &args.out {
        write_output(out, &request.image.bytes)?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn cmd_config(path: Option<&Path>) -> anyhow::Result<()> {
    let config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            serde_json::from_str::<GenerationConfig>(&json)
                .with_context(|| format!("parse config '{}'", path.display()))?
        }
        None => GenerationConfig::default(),
    };
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}

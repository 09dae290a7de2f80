use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrollytell::{
    AssetLoader, BeatAnimator, ControllerOpts, FsFrameSource, LoaderOpts, PngSequenceSink,
    RecordingView, Renderer, RendererOpts, ScrollScript, StoryConfig, StoryController,
    ViewportMetrics, frame_index, play_script,
};

#[derive(Parser, Debug)]
#[command(name = "scrollytell", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every frame and report the ones that failed.
    Check(CheckArgs),
    /// Render the frame shown at a given scroll progress as a PNG.
    Frame(FrameArgs),
    /// Play a scroll script and write one PNG per tick plus an overlay log.
    Play(PlayArgs),
}

#[derive(clap::Args, Debug)]
struct StoryArgs {
    /// Story config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory frame locators are resolved against.
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Override loader worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    #[command(flatten)]
    story: StoryArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    story: StoryArgs,

    /// Scroll progress in [0, 1].
    #[arg(long)]
    progress: f64,

    /// Surface width in layout pixels.
    #[arg(long)]
    width: f64,

    /// Surface height in layout pixels.
    #[arg(long)]
    height: f64,

    /// Device pixel ratio.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    /// Background color as `#rrggbb` or `#rrggbbaa`.
    #[arg(long, value_parser = parse_hex_rgba)]
    bg: Option<[u8; 4]>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    #[command(flatten)]
    story: StoryArgs,

    /// Scroll script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Background color as `#rrggbb` or `#rrggbbaa`.
    #[arg(long, value_parser = parse_hex_rgba)]
    bg: Option<[u8; 4]>,

    /// Output directory for `tick_NNNNN.png` files and `overlays.json`.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn load_config(args: &StoryArgs) -> anyhow::Result<StoryConfig> {
    let cfg = match &args.config {
        Some(path) => StoryConfig::from_path(path)?,
        None => StoryConfig::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}

fn loader_for(args: &StoryArgs, cfg: &StoryConfig) -> anyhow::Result<AssetLoader> {
    let mut loader = AssetLoader::new(
        cfg.frame_count as usize,
        cfg.frame_path.clone(),
        Arc::new(FsFrameSource::new(&args.assets)),
        LoaderOpts {
            threads: args.threads,
        },
    )?;
    let step = (cfg.frame_count / 10).max(1) as usize;
    let total = cfg.frame_count as usize;
    let mut seen = 0usize;
    loader.on_progress(move |p| {
        seen += 1;
        if seen % step == 0 || seen == total {
            tracing::info!(percent = (p * 100.0).round(), "loading frames");
        }
    });
    Ok(loader)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.story)?;
    let mut loader = loader_for(&args.story, &cfg)?;
    let seq = loader.wait_until_complete()?;

    let failed = seq.failed_locators();
    println!("frames: {}", seq.len());
    println!("failed: {}", failed.len());
    for locator in &failed {
        println!("  {locator}");
    }
    if !failed.is_empty() {
        anyhow::bail!("{} of {} frames failed to load", failed.len(), seq.len());
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&args.progress) {
        anyhow::bail!("--progress must be within [0, 1]");
    }
    let cfg = load_config(&args.story)?;
    let mut loader = loader_for(&args.story, &cfg)?;
    let seq = loader.wait_until_complete()?;

    let metrics = ViewportMetrics::fullscreen(args.width, args.height, cfg.scroll_height)
        .with_dpr(args.dpr);
    let mut renderer = Renderer::new(&metrics, RendererOpts { clear_rgba: args.bg })?;
    let index = frame_index(args.progress, seq.len());
    if !renderer.draw(seq.get(index))? {
        tracing::warn!(index, "frame not drawn; output shows the cleared surface");
    }

    let frame = renderer.snapshot();
    if frame.width == 0 || frame.height == 0 {
        anyhow::bail!("surface has no area at {}x{}", args.width, args.height);
    }
    create_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    let beats = BeatAnimator::from_config(&cfg).styles(args.progress);
    println!("{}", serde_json::to_string_pretty(&beats)?);
    eprintln!("wrote {} (frame {index})", args.out.display());
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.story)?;
    let script = ScrollScript::from_path(&args.script)?;

    let opts = ControllerOpts {
        loader: LoaderOpts {
            threads: args.story.threads,
        },
        renderer: RendererOpts { clear_rgba: args.bg },
    };
    let mut controller = StoryController::new(
        &cfg,
        Arc::new(FsFrameSource::new(&args.story.assets)),
        &script.viewport,
        RecordingView::new(),
        opts,
    )?;

    let mut sink = PngSequenceSink::new(&args.out_dir);
    let stats = play_script(&mut controller, &script, &mut sink)?;

    eprintln!(
        "wrote {} frames ({} ticks, {} frame changes) to {}",
        sink.written(),
        stats.ticks,
        stats.frame_changes,
        args.out_dir.display()
    );
    Ok(())
}

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn parse_hex_rgba(s: &str) -> Result<[u8; 4], String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(format!("expected #rrggbb or #rrggbbaa, got '{s}'"));
    }
    let byte = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad hex in '{s}': {e}"))
    };
    let a = if hex.len() == 8 { byte(6)? } else { 255 };
    Ok([byte(0)?, byte(2)?, byte(4)?, a])
}

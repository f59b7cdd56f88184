use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use fanframe::{
    CaptionService, CommandSegmenter, CpuCompositor, CurlCaptionService, Cutout, FontSource,
    FrameSource, OverlayEdit, SegmentationOptions, StillSource, StudioConfig, StudioSession,
    TemplateId, TemplateLibrary, VideoSource, build_caption_prompt, suggest_captions,
};

#[derive(Parser, Debug)]
#[command(name = "fanframe", version)]
struct Cli {
    /// Studio configuration JSON (defaults apply when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture a frame, cut out the subject and export the composition as PNG.
    Compose(ComposeArgs),
    /// Print caption suggestions for a frame.
    Captions(SourceArgs),
    /// List the background templates.
    Templates,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Still image to use as the captured frame.
    #[arg(long, conflicts_with = "video", required_unless_present = "video")]
    frame: Option<PathBuf>,

    /// Video to capture from (requires the `media-ffmpeg` feature).
    #[arg(long)]
    video: Option<PathBuf>,

    /// Playback position in seconds for `--video`.
    #[arg(long, default_value_t = 0.0)]
    at: f64,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Use this PNG as the cutout instead of running the segmentation command.
    #[arg(long)]
    cutout: Option<PathBuf>,

    /// Ask the caption service for suggestions; the first one becomes the caption.
    #[arg(long, default_value_t = false)]
    suggest: bool,

    /// Template index.
    #[arg(long, default_value_t = 0)]
    template: usize,

    /// Caption text.
    #[arg(long)]
    text: Option<String>,

    /// Caption color (#RRGGBB or #RRGGBBAA).
    #[arg(long)]
    color: Option<String>,

    /// Caption size in pixels.
    #[arg(long)]
    size: Option<String>,

    /// left, center or right.
    #[arg(long)]
    align: Option<String>,

    /// Vertical offset from the canvas center in pixels.
    #[arg(long, allow_hyphen_values = true)]
    v_offset: Option<String>,

    /// Horizontal offset in pixels.
    #[arg(long, allow_hyphen_values = true)]
    h_offset: Option<String>,

    /// above-cutout or below-cutout.
    #[arg(long)]
    stack: Option<String>,

    /// Font file overriding the configured font.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Directory for the exported file.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    fanframe::init_logging(&cfg.logging);
    match cli.cmd {
        Command::Compose(args) => cmd_compose(&cfg, args),
        Command::Captions(args) => cmd_captions(&cfg, args),
        Command::Templates => cmd_templates(&cfg),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<StudioConfig> {
    let cfg = match path {
        Some(p) => StudioConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => StudioConfig::default(),
    };
    Ok(cfg.with_env_overrides())
}

fn open_source(args: &SourceArgs) -> anyhow::Result<Box<dyn FrameSource>> {
    if let Some(path) = &args.video {
        let mut video = VideoSource::open(path)?;
        video.cursor_mut().seek(args.at);
        return Ok(Box::new(video));
    }
    let path = args
        .frame
        .as_ref()
        .context("either --frame or --video is required")?;
    Ok(Box::new(StillSource::from_path(path)?))
}

fn cmd_compose(cfg: &StudioConfig, args: ComposeArgs) -> anyhow::Result<()> {
    let mut session = StudioSession::from_config(cfg)?;
    let source = open_source(&args.source)?;
    session.capture(source.as_ref())?;

    let captioner = args
        .suggest
        .then(|| CurlCaptionService::from_config(&cfg.caption));
    let captioner = captioner.as_ref().map(|c| c as &dyn CaptionService);

    if let Some(path) = &args.cutout {
        let ticket = session.begin_processing()?;
        let cutout = std::fs::read(path)
            .with_context(|| format!("read cutout '{}'", path.display()))
            .map_err(fanframe::FanframeError::from)
            .and_then(|bytes| Cutout::from_png(&bytes));
        session.apply_cutout(&ticket, cutout);
        if let Some(service) = captioner {
            let prompt = build_caption_prompt(&ticket.frame)?;
            session.apply_captions(&ticket, suggest_captions(service, &prompt));
        }
    } else {
        let segmenter = CommandSegmenter::from_config(&cfg.segmentation);
        session.process(&segmenter, &SegmentationOptions::default(), captioner)?;
    }

    if let Some(captions) = session.captions() {
        for (i, c) in captions.items.iter().enumerate() {
            eprintln!("suggestion {i}: {c}");
        }
    }
    if session.cutout().is_none() {
        anyhow::bail!(
            "background removal failed: {}",
            session.last_error().unwrap_or("no cutout produced")
        );
    }

    let edits = [
        args.text.map(OverlayEdit::Content),
        args.color.map(OverlayEdit::Color),
        args.size.map(OverlayEdit::SizePx),
        args.align.map(OverlayEdit::Alignment),
        args.v_offset.map(OverlayEdit::VerticalOffsetPx),
        args.h_offset.map(OverlayEdit::HorizontalOffsetPx),
        args.stack.map(OverlayEdit::StackOrder),
    ];
    for edit in edits.iter().flatten() {
        session.apply_edit(edit);
    }
    session.select_template(TemplateId(args.template))?;

    let font = args.font.map(FontSource::File).unwrap_or_else(|| cfg.font.clone());
    let mut compositor = if session.overlay().content.is_empty() {
        CpuCompositor::new()
    } else {
        CpuCompositor::from_font_source(&font)?
    };

    let encoded = session.export(&mut compositor)?;
    let path = encoded.write_to_dir(&args.out_dir)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_captions(cfg: &StudioConfig, args: SourceArgs) -> anyhow::Result<()> {
    let source = open_source(&args)?;
    let frame = fanframe::capture(source.as_ref())?;
    let prompt = build_caption_prompt(&frame)?;
    let service = CurlCaptionService::from_config(&cfg.caption);
    for caption in suggest_captions(&service, &prompt).items {
        println!("{caption}");
    }
    Ok(())
}

fn cmd_templates(cfg: &StudioConfig) -> anyhow::Result<()> {
    let lib = TemplateLibrary::from_config(&cfg.templates, cfg.canvas)?;
    for (id, entry) in lib.entries() {
        println!(
            "{}\t{}\t{}",
            id.0,
            entry.name,
            lib.path_for(id)?.display()
        );
    }
    Ok(())
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use maskview::tiny_skia::Pixmap;
use maskview::{
    BitmapMask, BlendOperator, MaskConfig, MaskSource, MaskedView, Rect, ResourceLoader,
    demultiply_to_rgba8,
};

#[derive(Parser, Debug)]
#[command(name = "maskview", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a mask over a content image and write the result as a PNG.
    Frame(FrameArgs),
    /// List the blend operators with their configuration indices.
    Modes,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Content image drawn as the view's children.
    #[arg(long)]
    content: PathBuf,

    /// Mask configuration JSON. Mask paths are relative to this file.
    #[arg(long)]
    config: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Override the configured blend operator by name, e.g. `src-in`.
    #[arg(long)]
    mode: Option<String>,

    /// Output size as WIDTHxHEIGHT; defaults to the content image size.
    #[arg(long, value_parser = parse_size)]
    size: Option<FrameSize>,
}

#[derive(Clone, Copy, Debug)]
struct FrameSize {
    width: u32,
    height: u32,
}

fn parse_size(s: &str) -> Result<FrameSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let height = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
    if width == 0 || height == 0 {
        return Err("size must be non-zero".to_string());
    }
    Ok(FrameSize { width, height })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Modes => {
            for op in BlendOperator::ALL {
                println!("{:>2}  {}", op.index(), op.name());
            }
            Ok(())
        }
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let config = MaskConfig::from_path(&args.config)?;
    let assets_root = args.config.parent().unwrap_or_else(|| Path::new("."));
    let loader = ResourceLoader::new(assets_root);

    let view = MaskedView::new(&config, &loader, Arc::new(|| {}))?;
    if let Some(mode) = &args.mode {
        view.set_blend_operator_name(mode)?;
    }

    let content_bytes = std::fs::read(&args.content)
        .with_context(|| format!("open content '{}'", args.content.display()))?;
    let content = BitmapMask::from_bytes(&content_bytes)?;

    let FrameSize { width, height } = match args.size {
        Some(size) => size,
        None => {
            let (width, height) = content
                .intrinsic_size()
                .context("content image has no size")?;
            FrameSize { width, height }
        }
    };

    let mut frame = Pixmap::new(width, height).context("allocate output frame")?;
    content.draw(
        &mut frame.as_mut(),
        Rect::new(0.0, 0.0, f64::from(width), f64::from(height)),
    );

    let view_w = i32::try_from(width).context("width exceeds i32")?;
    let view_h = i32::try_from(height).context("height exceeds i32")?;
    view.on_size_changed(view_w, view_h);
    if !view.draw(&mut frame.as_mut())
        && let Some(degraded) = view.last_degraded()
    {
        eprintln!("warning: {degraded}");
    }

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &demultiply_to_rgba8(&frame),
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({})",
        args.out.display(),
        view.blend_operator().name()
    );
    Ok(())
}

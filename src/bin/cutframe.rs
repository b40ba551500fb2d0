use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cutframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite an edit document and write the result as a PNG.
    Render(RenderArgs),
    /// Report the alpha boundary of an image.
    Trace(TraceArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input edit document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path. Defaults to a timestamped `edited-image-*.png` in the current directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Program that reads a PNG on stdin and writes the cut-out to stdout.
    #[arg(long)]
    remove_with: Option<PathBuf>,

    /// Extra argument passed to `--remove-with` (repeatable).
    #[arg(long = "remove-arg", requires = "remove_with")]
    remove_args: Vec<String>,
}

#[derive(Parser, Debug)]
struct TraceArgs {
    /// Input image (PNG, JPEG, GIF or WebP).
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Trace(args) => cmd_trace(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let doc = cutframe::EditDocument::from_path(&args.in_path)?;
    let mut session = doc.build_session(Instant::now())?;

    if let Some(program) = &args.remove_with {
        let mut remover = cutframe::CommandRemover::new(program).args(args.remove_args.clone());
        session
            .remove_background(&mut remover, Instant::now())
            .with_context(|| format!("remove background with '{}'", program.display()))?;
    }

    let exported = session.export(chrono::Utc::now(), Instant::now())?;
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(&exported.file_name));

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, &exported.png)
        .with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_trace(args: TraceArgs) -> anyhow::Result<()> {
    let bitmap = read_bitmap(&args.in_path)?;
    let mask = cutframe::trace_boundary(&bitmap);

    let opaque = bitmap.alphas().filter(|&a| a > 0).count();
    println!("size:     {}x{}", bitmap.width(), bitmap.height());
    println!("opaque:   {opaque}");
    println!("boundary: {}", mask.len());

    let bounds = mask.iter().fold(None, |acc: Option<(u32, u32, u32, u32)>, (x, y)| {
        Some(match acc {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        })
    });
    match bounds {
        Some((x0, y0, x1, y1)) => println!("bounds:   ({x0},{y0})..=({x1},{y1})"),
        None => println!("bounds:   none"),
    }
    Ok(())
}

fn read_bitmap(path: &Path) -> anyhow::Result<cutframe::AlphaBitmap> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    cutframe::validate_input(&bytes, None)?;
    Ok(cutframe::decode_image(&bytes)?)
}

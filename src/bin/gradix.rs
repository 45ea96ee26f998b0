use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

/// Longest side an uploaded image is reduced to before analysis.
const EXTRACT_MAX_DIM: u32 = 200;

#[derive(Parser, Debug)]
#[command(name = "gradix", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a configuration to a PNG at preview or explicit dimensions.
    Render(RenderArgs),
    /// Render a high-resolution JPEG at one of the fixed presets.
    Export(ExportArgs),
    /// Extract a palette and blobs from an image, as config-ready JSON.
    Extract(ExtractArgs),
    /// Suggest style/intensity/density for an image.
    Analyze(AnalyzeArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input render configuration JSON.
    #[arg(long = "config")]
    config_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Override width (requires --height).
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Override height (requires --width).
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Render time for animated configurations (seconds).
    #[arg(long, default_value_t = 0.0)]
    time: f64,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input render configuration JSON.
    #[arg(long = "config")]
    config_path: PathBuf,

    /// Resolution preset.
    #[arg(long, value_enum, default_value_t = PresetChoice::M)]
    preset: PresetChoice,

    /// Output directory for the timestamped file.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Source image (any format the `image` crate decodes).
    #[arg(long)]
    image: PathBuf,

    /// Seed for radius jitter and the fallback palette; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Source image.
    #[arg(long)]
    image: PathBuf,

    /// Seed for the high-complexity tie-break; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetChoice {
    S,
    M,
    L,
    Xl,
}

impl From<PresetChoice> for gradix::ExportPreset {
    fn from(p: PresetChoice) -> Self {
        match p {
            PresetChoice::S => gradix::ExportPreset::S,
            PresetChoice::M => gradix::ExportPreset::M,
            PresetChoice::L => gradix::ExportPreset::L,
            PresetChoice::Xl => gradix::ExportPreset::Xl,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Export(args) => cmd_export(args),
        Command::Extract(args) => cmd_extract(args),
        Command::Analyze(args) => cmd_analyze(args),
    }
}

fn read_config(path: &Path) -> anyhow::Result<gradix::RenderConfig> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let r = BufReader::new(f);
    let cfg: gradix::RenderConfig =
        serde_json::from_reader(r).with_context(|| "parse render config JSON")?;
    Ok(cfg)
}

fn entropy_seed(explicit: Option<u64>) -> u64 {
    explicit.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    })
}

/// Decode and downscale an image into the analysis buffer.
fn load_analysis_buffer(path: &Path) -> anyhow::Result<gradix::PixelBuffer> {
    let img = image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
    let img = img.thumbnail(EXTRACT_MAX_DIM, EXTRACT_MAX_DIM).to_rgba8();
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        anyhow::bail!("image '{}' decoded to zero pixels", path.display());
    }
    Ok(gradix::PixelBuffer::from_rgba8(w, h, img.into_raw())?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.config_path)?;
    cfg.validate()?;

    let mut surface = gradix::Surface::new(cfg.aspect, entropy_seed(None));
    let buf = match (args.width, args.height) {
        (Some(w), Some(h)) => surface.render_at(&cfg, w, h)?,
        _ => surface.render(&cfg, args.time).clone(),
    };

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &buf.data,
        buf.width,
        buf.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.config_path)?;
    cfg.validate()?;

    let mut surface = gradix::Surface::new(cfg.aspect, entropy_seed(None));
    surface.render(&cfg, 0.0);

    let path = gradix::export_to_dir(&surface, &cfg, args.preset.into(), &args.out_dir)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let buf = load_analysis_buffer(&args.image)?;
    let mut rng = gradix::Rng64::new(entropy_seed(args.seed));
    let extraction = gradix::extract_palette(&buf, &mut rng);

    println!("{}", serde_json::to_string_pretty(&extraction)?);
    Ok(())
}

fn cmd_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let buf = load_analysis_buffer(&args.image)?;
    let mut rng = gradix::Rng64::new(entropy_seed(args.seed));
    let suggestion = gradix::analyze_composition(&buf, &mut rng);

    println!("{}", serde_json::to_string_pretty(&suggestion)?);
    Ok(())
}

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mekko_rs::font::{SystemFontResolver, find_cjk_fonts};
use mekko_rs::config::MAX_DPI;
use mekko_rs::{CategoryColorMap, ChartConfig, input, layout};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "mekko",
    version,
    about = "Lay out and render Mekko (Marimekko) charts from group,category,value CSV files"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a chart image.
    Draw(DrawArgs),
    /// Print the default category palette for an input file as JSON.
    Palette(InputArgs),
    /// Print the computed layout as JSON.
    Layout(LayoutArgs),
    /// List detected Japanese-capable font families.
    Fonts,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Toggle {
    On,
    Off,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Headerless CSV with rows `group,category,value`
    #[arg(short, long)]
    input: PathBuf,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    #[command(flatten)]
    input: InputArgs,
    /// JSON object mapping category to color (e.g. {"A": "#1f77b4"})
    #[arg(long)]
    colors: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DrawArgs {
    #[command(flatten)]
    input: InputArgs,
    /// JSON config file; command line options override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON object mapping category to color; merged over the config's colors.
    #[arg(long)]
    colors: Option<PathBuf>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    xlabel: Option<String>,
    #[arg(long)]
    ylabel: Option<String>,
    #[arg(long)]
    legend_title: Option<String>,
    /// Show the frame around the plot area.
    #[arg(long, value_enum)]
    axis: Option<Toggle>,
    /// `auto` (detect a Japanese-capable font), `default`, or a family name.
    #[arg(long)]
    font: Option<String>,
    /// Output directory (created if missing).
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Output file name; the extension picks the format (png, jpg, bmp, svg).
    #[arg(long)]
    file_name: Option<String>,
    /// Raster resolution.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_DPI as i64))]
    dpi: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Draw(args) => cmd_draw(args),
        Command::Palette(args) => cmd_palette(args),
        Command::Layout(args) => cmd_layout(args),
        Command::Fonts => cmd_fonts(),
    }
}

fn read_color_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn build_config(args: &DrawArgs) -> Result<ChartConfig> {
    let mut cfg = match &args.config {
        Some(p) => ChartConfig::from_json_file(p)
            .with_context(|| format!("loading config {}", p.display()))?,
        None => ChartConfig::default(),
    };
    if let Some(p) = &args.colors {
        cfg.colors.extend(read_color_file(p)?);
    }
    let text_overrides = [
        (&args.title, &mut cfg.title),
        (&args.xlabel, &mut cfg.xlabel),
        (&args.ylabel, &mut cfg.ylabel),
        (&args.legend_title, &mut cfg.legend_title),
    ];
    for (arg, field) in text_overrides {
        if let Some(v) = arg {
            *field = v.clone();
        }
    }
    if let Some(t) = args.axis {
        cfg.axis_visible = matches!(t, Toggle::On);
    }
    if let Some(f) = &args.font {
        cfg.font = f.clone();
    }
    if let Some(d) = &args.out_dir {
        cfg.output_directory = d.clone();
    }
    if let Some(n) = &args.file_name {
        cfg.output_filename = n.clone();
    }
    if let Some(d) = args.dpi {
        cfg.dpi = d;
    }
    anyhow::ensure!(
        (1..=MAX_DPI).contains(&cfg.dpi),
        "dpi must be between 1 and {MAX_DPI}, got {}",
        cfg.dpi
    );
    anyhow::ensure!(
        !cfg.output_filename.trim().is_empty(),
        "output file name must not be empty"
    );
    Ok(cfg)
}

fn cmd_draw(args: DrawArgs) -> Result<()> {
    let cfg = build_config(&args)?;
    fs::create_dir_all(&cfg.output_directory).with_context(|| {
        format!(
            "creating output directory {}",
            cfg.output_directory.display()
        )
    })?;
    let report = mekko_rs::draw_chart(&args.input.input, &cfg)?;
    eprintln!(
        "Saved chart to {} ({}x{} px)",
        report.path.display(),
        report.width,
        report.height
    );
    Ok(())
}

fn cmd_palette(args: InputArgs) -> Result<()> {
    let records = input::read_records(&args.input)?;
    let palette = CategoryColorMap::default_for(input::distinct_categories(&records));
    println!("{}", serde_json::to_string_pretty(&palette)?);
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> Result<()> {
    let records = input::read_records(&args.input.input)?;
    let mut colors = CategoryColorMap::default_for(input::distinct_categories(&records));
    if let Some(p) = &args.colors {
        colors.merge(&CategoryColorMap::from_hex_table(&read_color_file(p)?)?);
    }
    let chart = layout::layout(&records, &colors)?;
    println!("{}", serde_json::to_string_pretty(&chart)?);
    Ok(())
}

fn cmd_fonts() -> Result<()> {
    let resolver = SystemFontResolver::new();
    let fonts = find_cjk_fonts(&resolver);
    if fonts.is_empty() {
        eprintln!("no Japanese-capable fonts detected");
    }
    for f in fonts {
        println!("{f}");
    }
    Ok(())
}


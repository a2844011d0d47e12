mod config;
mod feedback;

use anyhow::{Context, Result, bail};
use art_effect::{ParamValue, RangePolicy, RenderOptions, Style, StyleParams, codec, render_with};
use clap::{Parser, Subcommand};
use config::{Config, DEFAULT_CONFIG_FILE};
use log::{debug, info};
use std::{fs, path::PathBuf};

#[derive(Parser, Debug)]
#[command(version, about = "Turn photos into watercolor, pencil, gothic or modern art")]
struct Cli {
    /// Config file, created with defaults when missing
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an image in one style
    Render(RenderArgs),

    /// List styles with their steps and parameters
    Styles,

    /// Append a line of feedback to the feedback log
    Feedback {
        text: String,

        #[arg(long)]
        log: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// PNG or JPEG input
    #[arg(short, long)]
    input: PathBuf,

    /// Watercolor, Pencil-Sketch, Gothic or Modern-Art
    #[arg(short, long)]
    style: String,

    /// Style parameter as key=value, repeatable
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, ParamValue)>,

    #[arg(long)]
    seed: Option<u64>,

    /// Clamp out-of-range numbers instead of failing
    #[arg(long)]
    clamp: bool,

    #[arg(short, long, conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    preview_quality: Option<u8>,
}

fn parse_param(text: &str) -> std::result::Result<(String, ParamValue), String> {
    match text.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), ParamValue::parse(value)))
        }
        _ => Err(format!("expect key=value, got `{text}`")),
    }
}

fn init_logger() {
    use std::io::Write;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = buf.timestamp_seconds();

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse();
    let config = Config::load_or_init(&cli.config)?;
    if config.is_first_run {
        info!("write default config to {}", cli.config.display());
    }

    match cli.command {
        Command::Render(args) => render_image(&config, args),
        Command::Styles => {
            print_styles();
            Ok(())
        }
        Command::Feedback { text, log } => {
            let path = log.unwrap_or_else(|| config.feedback_log.clone());
            if feedback::append(&path, &text)? {
                println!("Thank you for your feedback!");
            }
            Ok(())
        }
    }
}

fn render_image(config: &Config, args: RenderArgs) -> Result<()> {
    let style = args.style.parse::<Style>()?;

    let mut params: StyleParams = config.style_params(style)?;
    params.extend(args.params);
    debug!("{} params: {params:?}", style.name());

    let bytes = fs::read(&args.input)
        .with_context(|| format!("read {} failed", args.input.display()))?;
    let source = codec::decode(&bytes)?;

    let preview_quality = args.preview_quality.unwrap_or(config.preview_quality);
    let preview = codec::compress_for_preview(&source, preview_quality)?;

    let mut options = RenderOptions::new();
    if args.clamp {
        options = options.with_policy(RangePolicy::Clamp);
    }
    if let Some(seed) = args.seed.or(config.seed) {
        options = options.with_seed(seed);
    }

    let output = render_with(preview, &args.style, &params, &options)?;

    let quality = args.quality.unwrap_or(config.output_quality);
    if !(1..=100).contains(&quality) {
        bail!("output quality must be in 1..=100, got {quality}");
    }
    let jpeg = codec::encode_jpeg(&output, quality)?;

    let path = match args.output {
        Some(path) => path,
        None => {
            let dir = args.out_dir.unwrap_or_else(|| config.output_dir.clone());
            fs::create_dir_all(&dir)
                .with_context(|| format!("create {} failed", dir.display()))?;
            dir.join(codec::suggested_file_name(style))
        }
    };

    fs::write(&path, jpeg).with_context(|| format!("write {} failed", path.display()))?;
    println!("{} ({}) -> {}", style.name(), codec::JPEG_MIME, path.display());

    Ok(())
}

fn print_styles() {
    for style in Style::all_styles() {
        let descriptor = style.descriptor();
        let mode = if style.is_deterministic() { "deterministic" } else { "randomized" };

        println!("{} [{mode}] -> {}", style.name(), codec::suggested_file_name(*style));
        println!("  steps: {}", descriptor.steps.join(" > "));
        for spec in descriptor.schema {
            println!("  {spec}");
        }
        println!();
    }
}

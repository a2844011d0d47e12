/// Renders every style for one image
/// Usage: cargo run -p art-effect --example all_styles_demo -- [image] [seed]
use art_effect::{RenderOptions, Style, StyleParams, codec, render_with};
use std::{fs, path::Path, time::Instant};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let img_path = args.next().unwrap_or_else(|| "data/test.png".to_string());
    let seed = args.next().and_then(|s| s.parse::<u64>().ok()).unwrap_or(42);

    let output_dir = Path::new("tmp/styles");
    fs::create_dir_all(output_dir)?;

    let source = codec::decode(&fs::read(&img_path)?)?;
    let preview = codec::compress_for_preview(&source, codec::DEFAULT_PREVIEW_QUALITY)?;
    println!("Source: {} ({}x{})", img_path, preview.width(), preview.height());
    println!("{}", "-".repeat(60));

    let options = RenderOptions::new().with_seed(seed);
    for style in Style::all_styles() {
        let start = Instant::now();
        let output = render_with(preview.clone(), style.name(), &StyleParams::new(), &options)?;
        let elapsed = start.elapsed();

        let file_name = codec::suggested_file_name(*style);
        fs::write(output_dir.join(&file_name), codec::encode_jpeg(&output, codec::DEFAULT_PREVIEW_QUALITY)?)?;

        println!(
            "{:<16} {:>10.2} ms   tmp/styles/{}",
            style.name(),
            elapsed.as_secs_f64() * 1000.0,
            file_name
        );
    }

    Ok(())
}

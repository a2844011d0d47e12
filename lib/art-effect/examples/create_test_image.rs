/// Writes data/test.png for the other demos
/// Usage: cargo run -p art-effect --example create_test_image
use art_effect::Raster;
use image::Rgb;

fn main() -> anyhow::Result<()> {
    let (width, height) = (640, 480);

    // Gradients with a checker overlay give the edge filters something to find.
    let img = Raster::from_fn(width, height, |x, y| {
        let r = (x * 255 / width) as u8;
        let g = (y * 255 / height) as u8;
        let b = ((x + y) * 255 / (width + height)) as u8;
        if (x / 40 + y / 40) % 2 == 0 { Rgb([r, g, b]) } else { Rgb([b, r, g]) }
    });

    std::fs::create_dir_all("data")?;
    img.save("data/test.png")?;
    println!("Created data/test.png");
    Ok(())
}

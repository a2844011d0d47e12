// cargo test -p art-effect --test render_test

use art_effect::{
    ArtEffectError, Effect, ParamValue, Raster, RangePolicy, RenderOptions, Style, StyleParams,
    base_effect, monochrome_effect::GradientMapConfig, render, render_with, render_with_rng,
    stylized_effect::{EdgeDetectionConfig, EdgeEnhanceConfig, EmbossConfig},
};
use image::Rgb;
use rand::{SeedableRng, rngs::StdRng};

fn photo(width: u32, height: u32) -> Raster {
    Raster::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let b = ((x + y) * 255 / (width + height).max(1)) as u8;
        if (x / 8 + y / 8) % 2 == 0 { Rgb([r, g, b]) } else { Rgb([b, r, g]) }
    })
}

fn params(pairs: &[(&str, ParamValue)]) -> StyleParams {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn mean(image: &Raster) -> f64 {
    let sum: u64 = image.as_raw().iter().map(|&v| v as u64).sum();
    sum as f64 / image.as_raw().len() as f64
}

#[test]
fn test_every_style_keeps_dimensions() {
    for (w, h) in [(37, 23), (1, 1), (2, 9), (64, 64)] {
        for style in Style::all_styles() {
            let out = render(photo(w, h), style.name(), &StyleParams::new()).unwrap();
            assert_eq!(out.dimensions(), (w, h), "{} changed the size", style.name());
        }
    }
}

#[test]
fn test_deterministic_styles_are_byte_identical() {
    let image = photo(40, 30);
    for style in [Style::Watercolor, Style::ModernArt] {
        assert!(style.is_deterministic());
        let a = render(image.clone(), style.name(), &StyleParams::new()).unwrap();
        let b = render(image.clone(), style.name(), &StyleParams::new()).unwrap();
        assert_eq!(a, b, "{} is not deterministic", style.name());
    }
}

#[test]
fn test_randomized_styles_repeat_with_a_seed() {
    let image = photo(40, 30);
    let options = RenderOptions::new().with_seed(1234);

    for style in [Style::PencilSketch, Style::Gothic] {
        assert!(!style.is_deterministic());
        let a = render_with(image.clone(), style.name(), &StyleParams::new(), &options).unwrap();
        let b = render_with(image.clone(), style.name(), &StyleParams::new(), &options).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_randomized_styles_vary_between_seeds() {
    let image = photo(40, 30);
    let a = render_with(image.clone(), "gothic", &StyleParams::new(), &RenderOptions::new().with_seed(1)).unwrap();
    let b = render_with(image, "gothic", &StyleParams::new(), &RenderOptions::new().with_seed(2)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_gothic_noise_keeps_mean() {
    let image = Raster::from_pixel(64, 64, Rgb([128, 128, 128]));
    let quiet = params(&[("creepiness_level", ParamValue::Int(0))]);
    let noisy = params(&[("creepiness_level", ParamValue::Int(20))]);

    let mut rng = StdRng::seed_from_u64(77);
    let base = render_with_rng(image.clone(), Style::Gothic, &quiet, RangePolicy::Reject, &mut rng).unwrap();
    let grainy = render_with_rng(image, Style::Gothic, &noisy, RangePolicy::Reject, &mut rng).unwrap();

    assert_ne!(base, grainy);
    assert!((mean(&base) - mean(&grainy)).abs() < 3.0);
}

#[test]
fn test_unknown_style() {
    for name in ["", "cubism", "water color sketchy", "pencil2", "pencil", "g_o t-h_i_c", "Modern Art"] {
        let err = render(photo(4, 4), name, &StyleParams::new()).err().unwrap();
        assert!(matches!(err, ArtEffectError::UnknownStyle(_)), "{name:?}");
    }
}

#[test]
fn test_out_of_range_parameters() {
    let err = render(photo(8, 8), "Watercolor", &params(&[("sigma_r", ParamValue::Float(1.5))]))
        .err()
        .unwrap();
    match err {
        ArtEffectError::InvalidParameter { style, name, value, .. } => {
            assert_eq!(style, "Watercolor");
            assert_eq!(name, "sigma_r");
            assert_eq!(value, "1.5");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = render(photo(8, 8), "Gothic", &params(&[("contrast_factor", ParamValue::Float(0.5))]))
        .err()
        .unwrap();
    assert!(matches!(err, ArtEffectError::InvalidParameter { ref name, .. } if name == "contrast_factor"));
}

#[test]
fn test_wrong_type_and_unknown_name() {
    let wrong = params(&[("emboss_strength", ParamValue::Text("lots".to_string()))]);
    assert!(matches!(
        render(photo(8, 8), "modern-art", &wrong),
        Err(ArtEffectError::InvalidParameter { .. })
    ));

    let unknown = params(&[("sigma_s", ParamValue::Int(10))]);
    assert!(matches!(
        render(photo(8, 8), "gothic", &unknown),
        Err(ArtEffectError::InvalidParameter { .. })
    ));
}

#[test]
fn test_modern_art_gray_stays_on_the_gradient() {
    let image = Raster::from_pixel(100, 100, Rgb([128, 128, 128]));
    let p = params(&[
        ("color1", ParamValue::Color([255, 0, 0])),
        ("color2", ParamValue::Text("#00FF00".to_string())),
    ]);
    let out = render(image, "Modern-Art", &p).unwrap();

    for pixel in out.pixels() {
        assert_eq!(pixel[2], 0);
        assert_eq!(pixel[0] as u16 + pixel[1] as u16, 255);
    }
}

#[test]
fn test_pencil_white_stays_white() {
    let image = Raster::from_pixel(50, 50, Rgb([255, 255, 255]));
    let out = render(image, "Pencil-Sketch", &StyleParams::new()).unwrap();

    let off_white = out
        .pixels()
        .filter(|p| p.0.iter().any(|&v| v < 250))
        .count();
    assert!(off_white <= 25, "{off_white} pixels moved away from white");
}

#[test]
fn test_styles_are_not_idempotent() {
    // Applying a style to its own output is not expected to be a fixed point.
    let image = photo(32, 32);
    let once = render(image, "modern-art", &StyleParams::new()).unwrap();
    let twice = render(once.clone(), "modern-art", &StyleParams::new()).unwrap();
    assert_ne!(once, twice);
}

#[test]
fn test_concurrent_renders_are_independent() {
    let image = photo(24, 24);
    let expected = render(image.clone(), "watercolor", &StyleParams::new()).unwrap();

    let results: Vec<Raster> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let image = image.clone();
                scope.spawn(move || render(image, "watercolor", &StyleParams::new()).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|r| *r == expected));
}

#[test]
fn test_modern_art_defaults_use_unit_kernels() {
    let image = photo(30, 20);
    let out = render(image.clone(), "Modern-Art", &StyleParams::new()).unwrap();

    let relief = EmbossConfig::new().apply(image).unwrap();
    let edges = EdgeDetectionConfig::new().apply(relief).unwrap();
    let enhanced = EdgeEnhanceConfig::new().apply(edges).unwrap();
    let expected = GradientMapConfig::new()
        .with_from_rgb(255, 0, 0)
        .with_to_rgb(0, 255, 0)
        .apply_gray(&base_effect::to_gray(&enhanced));

    assert_eq!(out, expected);

    let stronger = render(photo(30, 20), "Modern-Art", &params(&[("emboss_strength", ParamValue::Int(4))])).unwrap();
    assert_ne!(out, stronger);
}

fn seeded_pencil(image: &Raster, p: &StyleParams) -> Raster {
    render_with(image.clone(), "Pencil-Sketch", p, &RenderOptions::new().with_seed(99)).unwrap()
}

#[test]
fn test_pencil_divide_source_by_name() {
    let image = photo(32, 24);
    let plain = seeded_pencil(&image, &params(&[("divide_source", ParamValue::Text("self".to_string()))]));
    let inverted = seeded_pencil(&image, &params(&[("divide_source", ParamValue::Text("Inverted".to_string()))]));

    assert_eq!(plain, seeded_pencil(&image, &StyleParams::new()));
    assert_ne!(plain, inverted);

    let bad = params(&[("divide_source", ParamValue::Text("sideways".to_string()))]);
    assert!(matches!(
        render(image, "Pencil-Sketch", &bad),
        Err(ArtEffectError::InvalidParameter { ref name, .. }) if name == "divide_source"
    ));
}

#[test]
fn test_pencil_round_trip_toggle_by_name() {
    let image = photo(32, 24);
    let toggled = seeded_pencil(&image, &params(&[("invert_round_trip", ParamValue::Bool(true))]));
    assert_eq!(toggled, seeded_pencil(&image, &StyleParams::new()));
}

#[test]
fn test_pencil_shade_factor_changes_output() {
    let image = photo(32, 24);
    let soft = seeded_pencil(&image, &params(&[("shade_factor", ParamValue::Float(0.0))]));
    let hard = seeded_pencil(&image, &params(&[("shade_factor", ParamValue::Float(1.0))]));

    assert_ne!(soft, hard);
    assert_ne!(hard, seeded_pencil(&image, &StyleParams::new()));
}

use crate::{
    ArtEffectError, Effect, Raster, Result,
    base_effect::{self, BrightnessConfig, ContrastConfig},
    blur_effect::{GaussianBlurConfig, GlowConfig},
    channel_effect::{self, DivideSource, GreenBoostConfig},
    monochrome_effect::GradientMapConfig,
    noise_effect::{GaussianNoiseConfig, SparseGrainConfig},
    params::{ParamDefault, ParamKind, ParamReader, ParamSpec, RangePolicy, StyleParams},
    stylized_effect::{
        EdgeDetectionConfig, EdgeEnhanceConfig, EdgePreservingConfig, EmbossConfig, SharpenConfig,
        StylizationConfig,
    },
};
use derivative::Derivative;
use derive_setters::Setters;
use log::debug;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use rand::Rng;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Style {
    Watercolor = 0,
    PencilSketch,
    Gothic,
    ModernArt,
}

/// Name, step list and parameter schema of one style. Built at compile time.
#[derive(Debug, Clone, Copy)]
pub struct StyleDescriptor {
    pub style: Style,
    pub steps: &'static [&'static str],
    pub schema: &'static [ParamSpec],
}

static WATERCOLOR: StyleDescriptor = StyleDescriptor {
    style: Style::Watercolor,
    steps: &["edge-preserving smoothing", "stylization"],
    schema: &[
        ParamSpec::new("sigma_s", ParamKind::Int { min: 1, max: 100 }, ParamDefault::Int(50)),
        ParamSpec::new("sigma_r", ParamKind::Float { min: 0.0, max: 1.0 }, ParamDefault::Float(0.5)),
        ParamSpec::new("stylize_sigma_s", ParamKind::Int { min: 1, max: 200 }, ParamDefault::Int(100)),
        ParamSpec::new("stylize_sigma_r", ParamKind::Float { min: 0.0, max: 1.0 }, ParamDefault::Float(0.5)),
    ],
};

static PENCIL_SKETCH: StyleDescriptor = StyleDescriptor {
    style: Style::PencilSketch,
    steps: &[
        "grayscale",
        "gaussian blur",
        "divide-blend",
        "sharpen",
        "double-inversion round trip (optional)",
        "sparse pixel randomization",
    ],
    schema: &[
        ParamSpec::new("shade_factor", ParamKind::Float { min: 0.0, max: 1.0 }, ParamDefault::Float(0.5)),
        ParamSpec::new("divide_source", ParamKind::Choice(DivideSource::NAMES), ParamDefault::Choice("self")),
        ParamSpec::new("blur_kernel", ParamKind::Int { min: 3, max: 51 }, ParamDefault::Int(21)),
        ParamSpec::new("divide_scale", ParamKind::Float { min: 1.0, max: 512.0 }, ParamDefault::Float(256.0)),
        ParamSpec::new("invert_round_trip", ParamKind::Bool, ParamDefault::Bool(false)),
        ParamSpec::new("grain_divisor", ParamKind::Int { min: 1, max: 10000 }, ParamDefault::Int(100)),
    ],
};

static GOTHIC: StyleDescriptor = StyleDescriptor {
    style: Style::Gothic,
    steps: &[
        "brightness",
        "contrast",
        "green multiply-boost",
        "glow blend",
        "additive gaussian noise",
    ],
    schema: &[
        ParamSpec::new("brightness_factor", ParamKind::Float { min: 0.1, max: 1.0 }, ParamDefault::Float(0.5)),
        ParamSpec::new("contrast_factor", ParamKind::Float { min: 1.0, max: 3.0 }, ParamDefault::Float(1.5)),
        ParamSpec::new("glow_strength", ParamKind::Int { min: 0, max: 20 }, ParamDefault::Int(10)),
        ParamSpec::new("creepiness_level", ParamKind::Int { min: 0, max: 100 }, ParamDefault::Int(30)),
        ParamSpec::new("green_boost", ParamKind::Float { min: 1.0, max: 2.0 }, ParamDefault::Float(1.2)),
        ParamSpec::new("glow_alpha", ParamKind::Float { min: 0.0, max: 1.0 }, ParamDefault::Float(0.3)),
    ],
};

static MODERN_ART: StyleDescriptor = StyleDescriptor {
    style: Style::ModernArt,
    steps: &["emboss", "find edges", "edge enhance", "grayscale", "two-color gradient map"],
    schema: &[
        ParamSpec::new("emboss_strength", ParamKind::Int { min: 1, max: 5 }, ParamDefault::Int(2)),
        ParamSpec::new("edge_strength", ParamKind::Int { min: 1, max: 5 }, ParamDefault::Int(1)),
        ParamSpec::new("color1", ParamKind::Color, ParamDefault::Color([255, 0, 0])),
        ParamSpec::new("color2", ParamKind::Color, ParamDefault::Color([0, 255, 0])),
    ],
};

impl Style {
    pub fn name(&self) -> &'static str {
        match self {
            Style::Watercolor => "Watercolor",
            Style::PencilSketch => "Pencil-Sketch",
            Style::Gothic => "Gothic",
            Style::ModernArt => "Modern-Art",
        }
    }

    /// Download name without extension.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Style::Watercolor => "watercolorsketch",
            Style::PencilSketch => "pencilsketch",
            Style::Gothic => "gothic",
            Style::ModernArt => "modernart",
        }
    }

    pub fn descriptor(&self) -> &'static StyleDescriptor {
        match self {
            Style::Watercolor => &WATERCOLOR,
            Style::PencilSketch => &PENCIL_SKETCH,
            Style::Gothic => &GOTHIC,
            Style::ModernArt => &MODERN_ART,
        }
    }

    /// Watercolor and Modern-Art never draw from the random source.
    pub fn is_deterministic(&self) -> bool {
        matches!(self, Style::Watercolor | Style::ModernArt)
    }

    pub fn all_styles() -> &'static [Style] {
        &[Style::Watercolor, Style::PencilSketch, Style::Gothic, Style::ModernArt]
    }
}

impl FromStr for Style {
    type Err = ArtEffectError;

    fn from_str(s: &str) -> Result<Self> {
        Style::all_styles()
            .iter()
            .copied()
            .find(|style| s.eq_ignore_ascii_case(style.name()) || s.eq_ignore_ascii_case(style.file_stem()))
            .ok_or_else(|| ArtEffectError::UnknownStyle(s.to_string()))
    }
}

/// Edge-preserving smoothing followed by stylization.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct WatercolorConfig {
    #[derivative(Default(value = "50.0"))]
    sigma_s: f32,

    #[derivative(Default(value = "0.5"))]
    sigma_r: f32,

    #[derivative(Default(value = "100.0"))]
    stylize_sigma_s: f32,

    #[derivative(Default(value = "0.5"))]
    stylize_sigma_r: f32,
}

impl WatercolorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_reader(reader: &ParamReader) -> Result<Self> {
        Ok(Self {
            sigma_s: reader.int("sigma_s")? as f32,
            sigma_r: reader.float("sigma_r")? as f32,
            stylize_sigma_s: reader.int("stylize_sigma_s")? as f32,
            stylize_sigma_r: reader.float("stylize_sigma_r")? as f32,
        })
    }
}

impl Effect for WatercolorConfig {
    fn apply(&self, image: Raster) -> Result<Raster> {
        debug!("watercolor: smoothing sigma_s={} sigma_r={}", self.sigma_s, self.sigma_r);
        let smoothed = EdgePreservingConfig::new()
            .with_sigma_s(self.sigma_s)
            .with_sigma_r(self.sigma_r)
            .apply(image)?;

        debug!("watercolor: stylization sigma_s={}", self.stylize_sigma_s);
        StylizationConfig::new()
            .with_sigma_s(self.stylize_sigma_s)
            .with_sigma_r(self.stylize_sigma_r)
            .apply(smoothed)
    }
}

/// Grayscale dodge sketch with sharpened shading and sparse grain.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct PencilSketchConfig {
    #[derivative(Default(value = "0.5"))]
    shade_factor: f32,

    divide_source: DivideSource,

    #[derivative(Default(value = "21"))]
    blur_kernel: u32,

    #[derivative(Default(value = "256.0"))]
    divide_scale: f32,

    invert_round_trip: bool,

    #[derivative(Default(value = "100"))]
    grain_divisor: u32,
}

impl PencilSketchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_reader(reader: &ParamReader) -> Result<Self> {
        let blur_kernel = reader.int("blur_kernel")? as u32;
        if blur_kernel % 2 == 0 {
            return Err(reader.reject("blur_kernel", "kernel size must be odd"));
        }

        let divide_source = reader
            .choice("divide_source")?
            .parse::<DivideSource>()
            .map_err(|e| reader.reject("divide_source", &e))?;

        Ok(Self {
            shade_factor: reader.float("shade_factor")? as f32,
            divide_source,
            blur_kernel,
            divide_scale: reader.float("divide_scale")? as f32,
            invert_round_trip: reader.flag("invert_round_trip")?,
            grain_divisor: reader.int("grain_divisor")? as u32,
        })
    }

    pub fn apply_with_rng<R: Rng + ?Sized>(&self, image: Raster, rng: &mut R) -> Result<Raster> {
        let gray = base_effect::to_gray(&image);
        drop(image);

        let blur_source = match self.divide_source {
            DivideSource::Gray => gray.clone(),
            DivideSource::Inverted => base_effect::invert_gray(gray.clone()),
        };

        debug!("pencil: blur {}x{} kernel, source {}", self.blur_kernel, self.blur_kernel, self.divide_source);
        let blurred = GaussianBlurConfig::new()
            .with_kernel_size(self.blur_kernel)
            .apply_gray(&blur_source)?;
        let blend = channel_effect::divide(&gray, &blurred, self.divide_scale)?;

        // shade_factor 0.5 is the classic unit sharpen kernel
        let shaded = SharpenConfig::new()
            .with_amount(2.0 * self.shade_factor)
            .apply_gray(&blend)?;
        let mut sketch = base_effect::gray_to_rgb(&shaded);

        if self.invert_round_trip {
            debug!("pencil: double-inversion round trip");
            let inverted = base_effect::invert(sketch);
            let gray = base_effect::invert_gray(base_effect::to_gray(&inverted));
            sketch = base_effect::gray_to_rgb(&gray);
        }

        debug!("pencil: sparse grain, divisor {}", self.grain_divisor);
        SparseGrainConfig::new()
            .with_divisor(self.grain_divisor)
            .apply_with_rng(sketch, rng)
    }
}

/// Relief-and-edges structure recolored along a two-color gradient.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ModernArtConfig {
    #[derivative(Default(value = "2.0"))]
    emboss_strength: f32,

    #[derivative(Default(value = "1.0"))]
    edge_strength: f32,

    #[derivative(Default(value = "[255, 0, 0]"))]
    color1: [u8; 3],

    #[derivative(Default(value = "[0, 255, 0]"))]
    color2: [u8; 3],
}

impl ModernArtConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_reader(reader: &ParamReader) -> Result<Self> {
        Ok(Self {
            emboss_strength: reader.int("emboss_strength")? as f32,
            edge_strength: reader.int("edge_strength")? as f32,
            color1: reader.color("color1")?,
            color2: reader.color("color2")?,
        })
    }
}

impl Effect for ModernArtConfig {
    fn apply(&self, image: Raster) -> Result<Raster> {
        debug!("modern art: emboss x{}, edges x{}", self.emboss_strength, self.edge_strength);
        // emboss_strength 2 is the unit emboss kernel
        let relief = EmbossConfig::new()
            .with_strength(self.emboss_strength / 2.0)
            .apply(image)?;
        let edges = EdgeDetectionConfig::new()
            .with_strength(self.edge_strength)
            .apply(relief)?;
        let enhanced = EdgeEnhanceConfig::new().apply(edges)?;

        let [r1, g1, b1] = self.color1;
        let [r2, g2, b2] = self.color2;
        Ok(GradientMapConfig::new()
            .with_from_rgb(r1, g1, b1)
            .with_to_rgb(r2, g2, b2)
            .apply_gray(&base_effect::to_gray(&enhanced)))
    }
}

/// Dark, green-cast, glowing and grainy.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GothicConfig {
    #[derivative(Default(value = "0.5"))]
    brightness_factor: f32,

    #[derivative(Default(value = "1.5"))]
    contrast_factor: f32,

    #[derivative(Default(value = "1.2"))]
    green_boost: f32,

    #[derivative(Default(value = "10.0"))]
    glow_strength: f32,

    #[derivative(Default(value = "0.3"))]
    glow_alpha: f32,

    #[derivative(Default(value = "30.0"))]
    creepiness_level: f64,
}

impl GothicConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_reader(reader: &ParamReader) -> Result<Self> {
        Ok(Self {
            brightness_factor: reader.float("brightness_factor")? as f32,
            contrast_factor: reader.float("contrast_factor")? as f32,
            green_boost: reader.float("green_boost")? as f32,
            glow_strength: reader.int("glow_strength")? as f32,
            glow_alpha: reader.float("glow_alpha")? as f32,
            creepiness_level: reader.int("creepiness_level")? as f64,
        })
    }

    pub fn apply_with_rng<R: Rng + ?Sized>(&self, image: Raster, rng: &mut R) -> Result<Raster> {
        debug!(
            "gothic: brightness {} contrast {}",
            self.brightness_factor, self.contrast_factor
        );
        let dark = BrightnessConfig::new()
            .with_factor(self.brightness_factor)
            .apply(image)?;
        let contrasted = ContrastConfig::new()
            .with_factor(self.contrast_factor)
            .apply(dark)?;
        let tinted = GreenBoostConfig::new()
            .with_factor(self.green_boost)
            .apply(contrasted)?;

        debug!("gothic: glow {} alpha {}", self.glow_strength, self.glow_alpha);
        let glowing = GlowConfig::new()
            .with_strength(self.glow_strength)
            .with_alpha(self.glow_alpha)
            .apply(tinted)?;

        debug!("gothic: noise std {}", self.creepiness_level);
        GaussianNoiseConfig::new()
            .with_std_dev(self.creepiness_level)
            .apply_with_rng(glowing, rng)
    }
}

/// A style with its parameters resolved.
#[derive(Debug, Clone)]
pub enum StylePipeline {
    Watercolor(WatercolorConfig),
    PencilSketch(PencilSketchConfig),
    Gothic(GothicConfig),
    ModernArt(ModernArtConfig),
}

impl StylePipeline {
    pub fn from_params(style: Style, params: &StyleParams, policy: RangePolicy) -> Result<Self> {
        let reader = ParamReader::new(style.name(), style.descriptor().schema, params, policy)?;

        Ok(match style {
            Style::Watercolor => StylePipeline::Watercolor(WatercolorConfig::from_reader(&reader)?),
            Style::PencilSketch => StylePipeline::PencilSketch(PencilSketchConfig::from_reader(&reader)?),
            Style::Gothic => StylePipeline::Gothic(GothicConfig::from_reader(&reader)?),
            Style::ModernArt => StylePipeline::ModernArt(ModernArtConfig::from_reader(&reader)?),
        })
    }

    pub fn style(&self) -> Style {
        match self {
            StylePipeline::Watercolor(_) => Style::Watercolor,
            StylePipeline::PencilSketch(_) => Style::PencilSketch,
            StylePipeline::Gothic(_) => Style::Gothic,
            StylePipeline::ModernArt(_) => Style::ModernArt,
        }
    }

    pub fn apply_with_rng<R: Rng + ?Sized>(&self, image: Raster, rng: &mut R) -> Result<Raster> {
        match self {
            StylePipeline::Watercolor(config) => config.apply(image),
            StylePipeline::PencilSketch(config) => config.apply_with_rng(image, rng),
            StylePipeline::Gothic(config) => config.apply_with_rng(image, rng),
            StylePipeline::ModernArt(config) => config.apply(image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;
    use image::Rgb;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_style_names_parse() {
        assert_eq!("Watercolor".parse::<Style>().unwrap(), Style::Watercolor);
        assert_eq!("WATERCOLORSKETCH".parse::<Style>().unwrap(), Style::Watercolor);
        assert_eq!("Pencil-Sketch".parse::<Style>().unwrap(), Style::PencilSketch);
        assert_eq!("pencilsketch".parse::<Style>().unwrap(), Style::PencilSketch);
        assert_eq!("GOTHIC".parse::<Style>().unwrap(), Style::Gothic);
        assert_eq!("modern-art".parse::<Style>().unwrap(), Style::ModernArt);
        assert_eq!("ModernArt".parse::<Style>().unwrap(), Style::ModernArt);

        for name in ["cubism", "pencil", "g_o t-h_i_c", "WATERCOLOR SKETCH", "Modern Art", " gothic"] {
            assert!(
                matches!(name.parse::<Style>(), Err(ArtEffectError::UnknownStyle(_))),
                "{name:?} should not parse"
            );
        }
    }

    #[test]
    fn test_style_round_trips_through_u8() {
        for style in Style::all_styles() {
            let raw: u8 = (*style).into();
            assert_eq!(Style::try_from(raw).unwrap(), *style);
            assert_eq!(style.name().parse::<Style>().unwrap(), *style);
            assert_eq!(style.file_stem().parse::<Style>().unwrap(), *style);
        }
        assert!(Style::try_from(4u8).is_err());
    }

    #[test]
    fn test_schema_defaults_fit_their_ranges() {
        for style in Style::all_styles() {
            let empty = StyleParams::new();
            assert!(StylePipeline::from_params(*style, &empty, RangePolicy::Reject).is_ok());

            for spec in style.descriptor().schema {
                let p: StyleParams = [(spec.name.to_string(), spec.default.to_value())].into();
                assert!(
                    StylePipeline::from_params(*style, &p, RangePolicy::Reject).is_ok(),
                    "{} default for {} rejected",
                    style.name(),
                    spec.name
                );
            }
        }
    }

    #[test]
    fn test_even_blur_kernel_rejected() {
        let p: StyleParams = [("blur_kernel".to_string(), ParamValue::Int(20))].into();
        let err = StylePipeline::from_params(Style::PencilSketch, &p, RangePolicy::Reject).err().unwrap();
        assert!(matches!(err, ArtEffectError::InvalidParameter { ref name, .. } if name == "blur_kernel"));
    }

    #[test]
    fn test_pipeline_configs_follow_params() {
        let p: StyleParams = [
            ("sigma_s".to_string(), ParamValue::Int(10)),
            ("sigma_r".to_string(), ParamValue::Float(0.2)),
        ]
        .into();

        match StylePipeline::from_params(Style::Watercolor, &p, RangePolicy::Reject).unwrap() {
            StylePipeline::Watercolor(config) => {
                assert_eq!(config.sigma_s, 10.0);
                assert!((config.sigma_r - 0.2).abs() < 1e-6);
                assert_eq!(config.stylize_sigma_s, 100.0);
            }
            other => panic!("unexpected pipeline {:?}", other.style()),
        }
    }

    #[test]
    fn test_inverted_divide_source_differs() {
        let image = Raster::from_fn(24, 24, |x, y| Rgb([(x * 10) as u8, (y * 10) as u8, 90]));
        let plain = PencilSketchConfig::new()
            .with_grain_divisor(u32::MAX)
            .apply_with_rng(image.clone(), &mut StdRng::seed_from_u64(0))
            .unwrap();
        let inverted = PencilSketchConfig::new()
            .with_grain_divisor(u32::MAX)
            .with_divide_source(DivideSource::Inverted)
            .apply_with_rng(image, &mut StdRng::seed_from_u64(0))
            .unwrap();

        assert_ne!(plain, inverted);
    }

    #[test]
    fn test_round_trip_toggle_is_a_no_op() {
        let image = Raster::from_fn(20, 12, |x, y| Rgb([(x * 12) as u8, (y * 20) as u8, 40]));
        let plain = PencilSketchConfig::new()
            .apply_with_rng(image.clone(), &mut StdRng::seed_from_u64(5))
            .unwrap();
        let round_trip = PencilSketchConfig::new()
            .with_invert_round_trip(true)
            .apply_with_rng(image, &mut StdRng::seed_from_u64(5))
            .unwrap();

        assert_eq!(plain, round_trip);
    }

    #[test]
    fn test_gothic_without_noise_or_glow_is_darker() {
        let image = Raster::from_fn(16, 16, |x, y| Rgb([(x * 15) as u8, (y * 15) as u8, 200]));
        let out = GothicConfig::new()
            .with_glow_strength(0.0)
            .with_creepiness_level(0.0)
            .apply_with_rng(image.clone(), &mut StdRng::seed_from_u64(1))
            .unwrap();

        let sum = |img: &Raster| img.as_raw().iter().map(|&v| v as u64).sum::<u64>();
        assert!(sum(&out) < sum(&image));
    }
}

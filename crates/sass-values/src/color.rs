use crate::fuzzy;

/// The color spaces the protocol can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Rgb,
    Hsl,
    Hwb,
    Srgb,
    SrgbLinear,
    DisplayP3,
    A98Rgb,
    ProphotoRgb,
    Rec2020,
    XyzD65,
    XyzD50,
    Lab,
    Lch,
    Oklab,
    Oklch,
}

impl ColorSpace {
    pub fn name(&self) -> &'static str {
        match self {
            ColorSpace::Rgb => "rgb",
            ColorSpace::Hsl => "hsl",
            ColorSpace::Hwb => "hwb",
            ColorSpace::Srgb => "srgb",
            ColorSpace::SrgbLinear => "srgb-linear",
            ColorSpace::DisplayP3 => "display-p3",
            ColorSpace::A98Rgb => "a98-rgb",
            ColorSpace::ProphotoRgb => "prophoto-rgb",
            ColorSpace::Rec2020 => "rec2020",
            ColorSpace::XyzD65 => "xyz-d65",
            ColorSpace::XyzD50 => "xyz-d50",
            ColorSpace::Lab => "lab",
            ColorSpace::Lch => "lch",
            ColorSpace::Oklab => "oklab",
            ColorSpace::Oklch => "oklch",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "rgb" => ColorSpace::Rgb,
            "hsl" => ColorSpace::Hsl,
            "hwb" => ColorSpace::Hwb,
            "srgb" => ColorSpace::Srgb,
            "srgb-linear" => ColorSpace::SrgbLinear,
            "display-p3" => ColorSpace::DisplayP3,
            "a98-rgb" => ColorSpace::A98Rgb,
            "prophoto-rgb" => ColorSpace::ProphotoRgb,
            "rec2020" => ColorSpace::Rec2020,
            "xyz-d65" => ColorSpace::XyzD65,
            "xyz-d50" => ColorSpace::XyzD50,
            "lab" => ColorSpace::Lab,
            "lch" => ColorSpace::Lch,
            "oklab" => ColorSpace::Oklab,
            "oklch" => ColorSpace::Oklch,
            _ => return None,
        })
    }

    /// The spaces CSS treats as legacy. Host-side equality does not
    /// convert between them; `rgb(…)` never equals `hsl(…)` here even
    /// when they denote the same color.
    pub fn is_legacy(&self) -> bool {
        matches!(self, ColorSpace::Rgb | ColorSpace::Hsl | ColorSpace::Hwb)
    }
}

/// A color in one of the supported spaces. Any channel, and the alpha,
/// may be *missing* (CSS `none`), which is distinct from zero.
#[derive(Debug, Clone)]
pub struct SassColor {
    space: ColorSpace,
    channel1: Option<f64>,
    channel2: Option<f64>,
    channel3: Option<f64>,
    alpha: Option<f64>,
}

impl SassColor {
    pub fn new(
        space: ColorSpace,
        channel1: Option<f64>,
        channel2: Option<f64>,
        channel3: Option<f64>,
        alpha: Option<f64>,
    ) -> Self {
        SassColor {
            space,
            channel1,
            channel2,
            channel3,
            alpha,
        }
    }

    /// An opaque rgb color.
    pub fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::new(ColorSpace::Rgb, Some(red), Some(green), Some(blue), Some(1.0))
    }

    /// An opaque hsl color.
    pub fn hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        Self::new(
            ColorSpace::Hsl,
            Some(hue),
            Some(saturation),
            Some(lightness),
            Some(1.0),
        )
    }

    pub fn space(&self) -> ColorSpace {
        self.space
    }

    pub fn channel1(&self) -> Option<f64> {
        self.channel1
    }

    pub fn channel2(&self) -> Option<f64> {
        self.channel2
    }

    pub fn channel3(&self) -> Option<f64> {
        self.channel3
    }

    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    pub fn with_alpha(mut self, alpha: Option<f64>) -> Self {
        self.alpha = alpha;
        self
    }
}

fn channel_equals(left: Option<f64>, right: Option<f64>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(left), Some(right)) => fuzzy::equals(left, right),
        _ => false,
    }
}

impl PartialEq for SassColor {
    fn eq(&self, other: &Self) -> bool {
        self.space == other.space
            && channel_equals(self.channel1, other.channel1)
            && channel_equals(self.channel2, other.channel2)
            && channel_equals(self.channel3, other.channel3)
            && channel_equals(self.alpha, other.alpha)
    }
}

impl Eq for SassColor {}

impl std::hash::Hash for SassColor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        use std::hash::Hash;

        self.space.hash(state);
        for channel in [self.channel1, self.channel2, self.channel3, self.alpha] {
            channel.map(fuzzy::hash_code).hash(state);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_channel_tolerance() {
        assert_eq!(SassColor::rgb(1.0, 2.0, 3.0), SassColor::rgb(1.0 + 4e-11, 2.0, 3.0));
        assert_ne!(SassColor::rgb(1.0, 2.0, 3.0), SassColor::rgb(1.1, 2.0, 3.0));
    }

    #[test]
    fn test_missing_is_not_zero() {
        let missing = SassColor::new(ColorSpace::Oklch, Some(0.5), Some(0.1), None, Some(1.0));
        let zero = SassColor::new(ColorSpace::Oklch, Some(0.5), Some(0.1), Some(0.0), Some(1.0));
        assert_ne!(missing, zero);
        assert_eq!(missing, missing.clone());
    }

    #[test]
    fn test_no_cross_space_equality() {
        // The same pixel color, but host-side equality is structural.
        assert_ne!(
            SassColor::rgb(255.0, 0.0, 0.0),
            SassColor::hsl(0.0, 100.0, 50.0)
        );
    }

    #[test]
    fn test_space_names_round_trip() {
        for space in [
            ColorSpace::Rgb,
            ColorSpace::Hsl,
            ColorSpace::Hwb,
            ColorSpace::Srgb,
            ColorSpace::SrgbLinear,
            ColorSpace::DisplayP3,
            ColorSpace::A98Rgb,
            ColorSpace::ProphotoRgb,
            ColorSpace::Rec2020,
            ColorSpace::XyzD65,
            ColorSpace::XyzD50,
            ColorSpace::Lab,
            ColorSpace::Lch,
            ColorSpace::Oklab,
            ColorSpace::Oklch,
        ] {
            assert_eq!(ColorSpace::from_name(space.name()), Some(space));
        }
        assert_eq!(ColorSpace::from_name("cmyk"), None);
    }
}

//! Defines the [KioskColor] struct and the [ColorFormat] enum, used to describe and parse
//! the colors of ink, placeholder labels and captured document nodes.

use crate::error::KioskError;

/// A 32-bit RGBA color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct KioskColor {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl KioskColor {
    pub const WHITE: KioskColor = KioskColor::new(255, 255, 255, 255);
    pub const BLACK: KioskColor = KioskColor::new(0, 0, 0, 255);
    pub const TRANSPARENT: KioskColor = KioskColor::new(0, 0, 0, 0);

    /// The dark ink color used for every signature stroke.
    pub const INK: KioskColor = KioskColor::new(0x1a, 0x1a, 0x1a, 255);

    /// The light gray used for placeholder labels and name watermarks.
    pub const PLACEHOLDER: KioskColor = KioskColor::new(0xd1, 0xd5, 0xdb, 255);

    /// Substituted for text colors the rasterizer cannot interpret.
    pub const FALLBACK_TEXT: KioskColor = KioskColor::new(0x33, 0x33, 0x33, 255);

    /// Substituted for border colors the rasterizer cannot interpret.
    pub const FALLBACK_BORDER: KioskColor = KioskColor::new(0xe5, 0xe7, 0xeb, 255);

    /// Constructs a new [KioskColor] object from the given arguments.
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            r: red,
            g: green,
            b: blue,
            a: alpha,
        }
    }

    /// Returns the red component of this [KioskColor].
    #[inline]
    pub fn red(&self) -> u8 {
        self.r
    }

    /// Returns the green component of this [KioskColor].
    #[inline]
    pub fn green(&self) -> u8 {
        self.g
    }

    /// Returns the blue component of this [KioskColor].
    #[inline]
    pub fn blue(&self) -> u8 {
        self.b
    }

    /// Returns the alpha (transparency) component of this [KioskColor].
    #[inline]
    pub fn alpha(&self) -> u8 {
        self.a
    }

    #[inline]
    pub(crate) fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns this color as a `#rrggbb` string, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parses a CSS color value in one of the formats the rasterizer understands:
    /// hex notation, `rgb()`/`rgba()`, `hsl()`/`hsla()`, or a small set of named colors.
    ///
    /// Perceptual and cylindrical color spaces (`oklch()`, `lab()` and friends) are rejected
    /// with [KioskError::UnsupportedColor].
    pub fn parse_css(value: &str) -> Result<Self, KioskError> {
        let trimmed = value.trim();

        let unsupported = || KioskError::UnsupportedColor(trimmed.to_string());

        match ColorFormat::detect(trimmed) {
            ColorFormat::Hex => parse_hex(&trimmed[1..]).ok_or_else(unsupported),
            ColorFormat::Rgb => function_arguments(trimmed)
                .and_then(|args| parse_rgb(&args))
                .ok_or_else(unsupported),
            ColorFormat::Hsl => function_arguments(trimmed)
                .and_then(|args| parse_hsl(&args))
                .ok_or_else(unsupported),
            ColorFormat::Named => parse_named(trimmed).ok_or_else(unsupported),
            _ => Err(unsupported()),
        }
    }
}

impl Default for KioskColor {
    #[inline]
    fn default() -> Self {
        KioskColor::BLACK
    }
}

/// The notation a CSS color value is written in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ColorFormat {
    Hex,
    Rgb,
    Hsl,
    Named,
    Oklch,
    Oklab,
    Lab,
    Lch,

    /// The generic `color(<space> ...)` function.
    ColorFunction,

    /// Anything else, including `color-mix()`, `var()` and malformed input.
    Unrecognized,
}

impl ColorFormat {
    /// Determines the notation of the given CSS color value without parsing its components.
    pub fn detect(value: &str) -> Self {
        let value = value.trim().to_ascii_lowercase();

        if value.starts_with('#') {
            ColorFormat::Hex
        } else if value.starts_with("rgb(") || value.starts_with("rgba(") {
            ColorFormat::Rgb
        } else if value.starts_with("hsl(") || value.starts_with("hsla(") {
            ColorFormat::Hsl
        } else if value.starts_with("oklch(") {
            ColorFormat::Oklch
        } else if value.starts_with("oklab(") {
            ColorFormat::Oklab
        } else if value.starts_with("lab(") {
            ColorFormat::Lab
        } else if value.starts_with("lch(") {
            ColorFormat::Lch
        } else if value.starts_with("color(") {
            ColorFormat::ColorFunction
        } else if !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic()) {
            ColorFormat::Named
        } else {
            ColorFormat::Unrecognized
        }
    }

    /// Returns `true` if the built-in rasterizer can interpret values in this notation.
    #[inline]
    pub fn is_rasterizable(&self) -> bool {
        matches!(
            self,
            ColorFormat::Hex | ColorFormat::Rgb | ColorFormat::Hsl | ColorFormat::Named
        )
    }
}

fn parse_hex(digits: &str) -> Option<KioskColor> {
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let short = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok().map(|v| v * 17);
    let long = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

    match digits.len() {
        3 => Some(KioskColor::new(short(0)?, short(1)?, short(2)?, 255)),
        4 => Some(KioskColor::new(short(0)?, short(1)?, short(2)?, short(3)?)),
        6 => Some(KioskColor::new(long(0)?, long(2)?, long(4)?, 255)),
        8 => Some(KioskColor::new(long(0)?, long(2)?, long(4)?, long(6)?)),
        _ => None,
    }
}

/// Splits `name(a, b, c / d)` into its argument tokens, accepting both the legacy
/// comma-separated and the modern space-separated syntax.
fn function_arguments(value: &str) -> Option<Vec<String>> {
    let open = value.find('(')?;
    let inner = value[open + 1..].strip_suffix(')')?;

    let args: Vec<String> = inner
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
        .collect();

    if args.is_empty() {
        None
    } else {
        Some(args)
    }
}

fn parse_channel(token: &str) -> Option<u8> {
    let value = if let Some(percent) = token.strip_suffix('%') {
        percent.parse::<f32>().ok()? * 2.55
    } else {
        token.parse::<f32>().ok()?
    };

    Some(value.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(token: Option<&String>) -> Option<u8> {
    match token {
        None => Some(255),
        Some(token) => {
            let value = if let Some(percent) = token.strip_suffix('%') {
                percent.parse::<f32>().ok()? / 100.0
            } else {
                token.parse::<f32>().ok()?
            };

            Some((value.clamp(0.0, 1.0) * 255.0).round() as u8)
        }
    }
}

fn parse_rgb(args: &[String]) -> Option<KioskColor> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }

    Some(KioskColor::new(
        parse_channel(&args[0])?,
        parse_channel(&args[1])?,
        parse_channel(&args[2])?,
        parse_alpha(args.get(3))?,
    ))
}

fn parse_hsl(args: &[String]) -> Option<KioskColor> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }

    let hue = args[0].trim_end_matches("deg").parse::<f32>().ok()?.rem_euclid(360.0);
    let saturation = args[1].strip_suffix('%')?.parse::<f32>().ok()?.clamp(0.0, 100.0) / 100.0;
    let lightness = args[2].strip_suffix('%')?.parse::<f32>().ok()?.clamp(0.0, 100.0) / 100.0;

    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let m = lightness - chroma / 2.0;
    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;

    Some(KioskColor::new(
        to_u8(r),
        to_u8(g),
        to_u8(b),
        parse_alpha(args.get(3))?,
    ))
}

fn parse_named(value: &str) -> Option<KioskColor> {
    let color = match value.to_ascii_lowercase().as_str() {
        "black" => KioskColor::BLACK,
        "white" => KioskColor::WHITE,
        "transparent" => KioskColor::TRANSPARENT,
        "red" => KioskColor::new(255, 0, 0, 255),
        "green" => KioskColor::new(0, 128, 0, 255),
        "blue" => KioskColor::new(0, 0, 255, 255),
        "gray" | "grey" => KioskColor::new(128, 128, 128, 255),
        "lightgray" | "lightgrey" => KioskColor::new(211, 211, 211, 255),
        "darkgray" | "darkgrey" => KioskColor::new(169, 169, 169, 255),
        _ => return None,
    };

    Some(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_variants() {
        assert_eq!(
            KioskColor::parse_css("#1a1a1a").unwrap(),
            KioskColor::INK
        );
        assert_eq!(
            KioskColor::parse_css("#fff").unwrap(),
            KioskColor::WHITE
        );
        assert_eq!(
            KioskColor::parse_css("#00000080").unwrap(),
            KioskColor::new(0, 0, 0, 128)
        );
        assert!(KioskColor::parse_css("#12345").is_err());
        assert!(KioskColor::parse_css("#gggggg").is_err());
    }

    #[test]
    fn test_parse_rgb_legacy_and_modern_syntax() {
        assert_eq!(
            KioskColor::parse_css("rgb(209, 213, 219)").unwrap(),
            KioskColor::PLACEHOLDER
        );
        assert_eq!(
            KioskColor::parse_css("rgba(0, 0, 0, 0.5)").unwrap(),
            KioskColor::new(0, 0, 0, 128)
        );
        assert_eq!(
            KioskColor::parse_css("rgb(255 0 0 / 100%)").unwrap(),
            KioskColor::new(255, 0, 0, 255)
        );
    }

    #[test]
    fn test_parse_hsl() {
        assert_eq!(
            KioskColor::parse_css("hsl(0, 100%, 50%)").unwrap(),
            KioskColor::new(255, 0, 0, 255)
        );
        assert_eq!(
            KioskColor::parse_css("hsl(120deg 100% 25%)").unwrap(),
            KioskColor::new(0, 128, 0, 255)
        );
    }

    #[test]
    fn test_perceptual_formats_are_detected_and_rejected() {
        for (value, format) in [
            ("oklch(0.21 0.034 264.665)", ColorFormat::Oklch),
            ("oklab(0.5 0.1 0.1)", ColorFormat::Oklab),
            ("lab(29.2345% 39.3825 20.0664)", ColorFormat::Lab),
            ("lch(52.2% 72.2 56.2)", ColorFormat::Lch),
            ("color(display-p3 1 0 0)", ColorFormat::ColorFunction),
        ] {
            assert_eq!(ColorFormat::detect(value), format);
            assert!(!format.is_rasterizable());
            assert!(matches!(
                KioskColor::parse_css(value),
                Err(KioskError::UnsupportedColor(_))
            ));
        }
    }

    #[test]
    fn test_unrecognized_values() {
        assert_eq!(
            ColorFormat::detect("color-mix(in srgb, red, blue)"),
            ColorFormat::Unrecognized
        );
        assert_eq!(ColorFormat::detect("var(--ink)"), ColorFormat::Unrecognized);
        assert_eq!(ColorFormat::detect(""), ColorFormat::Unrecognized);
        assert!(KioskColor::parse_css("chartreuse").is_err());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(KioskColor::FALLBACK_TEXT.to_hex(), "#333333");
        assert_eq!(KioskColor::new(1, 2, 3, 4).to_hex(), "#01020304");
    }
}

//! Defines the declarative color-fallback pass that runs over a cloned document tree before
//! it is handed to the rasterizer.
//!
//! Each [ColorFallbackRule] names the style properties it covers, the color notation it
//! replaces, and the rasterizer-safe color to substitute. A color the rasterizer cannot
//! interpret and that no rule covers causes its node to be dropped from the capture.

use crate::color::{ColorFormat, KioskColor};
use crate::error::KioskError;
use crate::export::document::{DocumentNode, NodeStyle};
use bitflags::bitflags;
use log::warn;
use once_cell::sync::Lazy;

bitflags! {
    /// The color-bearing style properties of a node.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ColorProperties: u8 {
        const TEXT = 0b001;
        const BACKGROUND = 0b010;
        const BORDER = 0b100;
    }
}

impl ColorProperties {
    fn slot<'a>(&self, style: &'a mut NodeStyle) -> &'a mut Option<String> {
        if *self == ColorProperties::TEXT {
            &mut style.color
        } else if *self == ColorProperties::BACKGROUND {
            &mut style.background_color
        } else {
            &mut style.border_color
        }
    }
}

/// Substitutes `fallback` for any value written in `format` in one of `properties`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorFallbackRule {
    pub properties: ColorProperties,
    pub format: ColorFormat,
    pub fallback: KioskColor,
}

impl ColorFallbackRule {
    #[inline]
    pub const fn new(properties: ColorProperties, format: ColorFormat, fallback: KioskColor) -> Self {
        Self {
            properties,
            format,
            fallback,
        }
    }
}

/// The perceptual and cylindrical notations the rasterizer cannot interpret.
const UNSUPPORTED_FORMATS: [ColorFormat; 5] = [
    ColorFormat::Oklch,
    ColorFormat::Oklab,
    ColorFormat::Lab,
    ColorFormat::Lch,
    ColorFormat::ColorFunction,
];

/// Dark gray text, white backgrounds and light gray borders for every unsupported notation.
pub static DEFAULT_COLOR_FALLBACK_RULES: Lazy<Vec<ColorFallbackRule>> = Lazy::new(|| {
    UNSUPPORTED_FORMATS
        .iter()
        .flat_map(|format| {
            [
                ColorFallbackRule::new(ColorProperties::TEXT, *format, KioskColor::FALLBACK_TEXT),
                ColorFallbackRule::new(ColorProperties::BACKGROUND, *format, KioskColor::WHITE),
                ColorFallbackRule::new(
                    ColorProperties::BORDER,
                    *format,
                    KioskColor::FALLBACK_BORDER,
                ),
            ]
        })
        .collect()
});

/// What a normalization pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    /// The number of property values replaced by a fallback.
    pub substituted: usize,

    /// The names of the nodes dropped from the capture, together with their subtrees.
    pub excluded: Vec<String>,
}

/// Applies a list of [ColorFallbackRule] objects to a document tree.
#[derive(Debug, Clone)]
pub struct StyleNormalizer<'a> {
    rules: &'a [ColorFallbackRule],
}

impl<'a> StyleNormalizer<'a> {
    #[inline]
    pub fn new(rules: &'a [ColorFallbackRule]) -> Self {
        Self { rules }
    }

    /// Rewrites every unsupported color in the given tree in place.
    ///
    /// Child nodes that cannot be normalized are removed. The root cannot be removed, so
    /// an unnormalizable root color is returned as [KioskError::UnsupportedColor].
    pub fn normalize(&self, root: &mut DocumentNode) -> Result<NormalizationReport, KioskError> {
        let mut report = NormalizationReport::default();

        if let Err(value) = self.normalize_style(root.style_mut(), &mut report) {
            return Err(KioskError::UnsupportedColor(value));
        }

        self.normalize_children(root, &mut report);

        Ok(report)
    }

    fn normalize_children(&self, node: &mut DocumentNode, report: &mut NormalizationReport) {
        node.children_mut().retain_mut(|child| {
            match self.normalize_style(child.style_mut(), report) {
                Ok(()) => {
                    self.normalize_children(child, report);

                    true
                }
                Err(value) => {
                    warn!(
                        "excluding {} from capture: no fallback for color {}",
                        child.name(),
                        value
                    );

                    report.excluded.push(child.name().to_string());

                    false
                }
            }
        });
    }

    /// Normalizes every color property of a single style. Returns the offending value if
    /// any property can be neither interpreted nor substituted.
    fn normalize_style(&self, style: &mut NodeStyle, report: &mut NormalizationReport) -> Result<(), String> {
        let mut substituted = 0;

        for property in [
            ColorProperties::TEXT,
            ColorProperties::BACKGROUND,
            ColorProperties::BORDER,
        ] {
            let slot = property.slot(style);

            let Some(value) = slot.as_deref() else {
                continue;
            };

            let format = ColorFormat::detect(value);

            if format.is_rasterizable() && KioskColor::parse_css(value).is_ok() {
                continue;
            }

            let rule = self
                .rules
                .iter()
                .find(|rule| rule.format == format && rule.properties.contains(property));

            match rule {
                Some(rule) => {
                    *slot = Some(rule.fallback.to_hex());
                    substituted += 1;
                }
                None => return Err(value.to_string()),
            }
        }

        // Excluded nodes contribute no substitutions.
        report.substituted += substituted;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::PixelRect;

    fn node(name: &str) -> DocumentNode {
        DocumentNode::new(name, PixelRect::new(0.0, 0.0, 10.0, 10.0))
    }

    #[test]
    fn test_default_rules_substitute_per_property() -> Result<(), KioskError> {
        let mut root = node("root").with_child(
            node("title")
                .with_color("oklch(0.21 0.034 264.665)")
                .with_background("lab(98% 0 0)")
                .with_border("color(display-p3 0.9 0.9 0.9)", 1.0),
        );

        let report = StyleNormalizer::new(&DEFAULT_COLOR_FALLBACK_RULES).normalize(&mut root)?;

        assert_eq!(report.substituted, 3);
        assert!(report.excluded.is_empty());

        let style = root.children()[0].style();
        assert_eq!(style.color.as_deref(), Some("#333333"));
        assert_eq!(style.background_color.as_deref(), Some("#ffffff"));
        assert_eq!(style.border_color.as_deref(), Some("#e5e7eb"));

        Ok(())
    }

    #[test]
    fn test_supported_values_are_left_alone() -> Result<(), KioskError> {
        let mut root = node("root")
            .with_background("#ffffff")
            .with_child(node("label").with_color("rgb(31, 41, 55)"));
        let original = root.clone();

        let report = StyleNormalizer::new(&DEFAULT_COLOR_FALLBACK_RULES).normalize(&mut root)?;

        assert_eq!(report, NormalizationReport::default());
        assert_eq!(root, original);

        Ok(())
    }

    #[test]
    fn test_uncovered_values_exclude_the_subtree() -> Result<(), KioskError> {
        let mut root = node("root")
            .with_child(
                node("card")
                    .with_background("color-mix(in srgb, red, blue)")
                    .with_child(node("inner")),
            )
            .with_child(node("footer").with_color("#6b7280"));

        let report = StyleNormalizer::new(&DEFAULT_COLOR_FALLBACK_RULES).normalize(&mut root)?;

        assert_eq!(report.excluded, vec!["card".to_string()]);
        assert_eq!(root.node_count(), 2);
        assert!(root.find("inner").is_none());
        assert!(root.find("footer").is_some());

        Ok(())
    }

    #[test]
    fn test_rules_only_cover_their_properties() -> Result<(), KioskError> {
        let rules = [ColorFallbackRule::new(
            ColorProperties::BACKGROUND,
            ColorFormat::Oklch,
            KioskColor::WHITE,
        )];

        let mut root = node("root").with_child(node("text").with_color("oklch(0.5 0.1 200)"));

        let report = StyleNormalizer::new(&rules).normalize(&mut root)?;

        assert_eq!(report.excluded, vec!["text".to_string()]);

        Ok(())
    }

    #[test]
    fn test_excluded_nodes_report_no_substitutions() -> Result<(), KioskError> {
        let mut root = node("root")
            .with_child(
                node("badge")
                    .with_color("oklch(0.21 0.034 264.665)")
                    .with_background("color-mix(in srgb, red, blue)"),
            )
            .with_child(node("caption").with_color("oklab(0.5 0 0)"));

        let report = StyleNormalizer::new(&DEFAULT_COLOR_FALLBACK_RULES).normalize(&mut root)?;

        assert_eq!(report.excluded, vec!["badge".to_string()]);
        assert_eq!(report.substituted, 1);

        Ok(())
    }

    #[test]
    fn test_unnormalizable_root_is_an_error() {
        let mut root = node("root").with_background("var(--background)");

        assert!(matches!(
            StyleNormalizer::new(&DEFAULT_COLOR_FALLBACK_RULES).normalize(&mut root),
            Err(KioskError::UnsupportedColor(value)) if value == "var(--background)"
        ));
    }
}

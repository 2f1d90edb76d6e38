//! Style model and effective-style resolution.
//!
//! Styles are plain values. A geometry's effective style is resolved on every
//! draw from, in priority order, the geometry's own override, its layer's
//! style for that geometry kind, and the built-in default. Selected geometries
//! get a highlight variant synthesized from the resolved style; nothing is
//! mutated when the selection changes.

use crate::geometry::{Geometry, GeometryKind};
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Highlight color used for selected geometries (`#ffc300`).
pub const HIGHLIGHT_COLOR: Rgba = Rgba::new(0xff, 0xc3, 0x00, 0xff);

/// Stroke width applied to the outline of a selected polygon.
pub const HIGHLIGHT_POLYGON_STROKE_WIDTH: f64 = 2.0;

/// RGBA8 color, serialized as a CSS hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a CSS color: `#rgb`, `#rrggbb`, `#rrggbbaa` or a basic named color.
    pub fn parse(color: &str) -> Option<Self> {
        let color = color.trim();
        if let Some(hex) = color.strip_prefix('#') {
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            let digit = |s: &str| u8::from_str_radix(s, 16).ok();
            return match hex.len() {
                3 => Some(Self::new(
                    digit(&hex[0..1])? * 17,
                    digit(&hex[1..2])? * 17,
                    digit(&hex[2..3])? * 17,
                    255,
                )),
                6 => Some(Self::new(
                    digit(&hex[0..2])?,
                    digit(&hex[2..4])?,
                    digit(&hex[4..6])?,
                    255,
                )),
                8 => Some(Self::new(
                    digit(&hex[0..2])?,
                    digit(&hex[2..4])?,
                    digit(&hex[4..6])?,
                    digit(&hex[6..8])?,
                )),
                _ => None,
            };
        }

        match color.to_ascii_lowercase().as_str() {
            "black" => Some(Self::black()),
            "white" => Some(Self::white()),
            "transparent" => Some(Self::transparent()),
            "red" => Some(Self::new(255, 0, 0, 255)),
            "green" => Some(Self::new(0, 128, 0, 255)),
            "blue" => Some(Self::new(0, 0, 255, 255)),
            "gray" | "grey" => Some(Self::new(128, 128, 128, 255)),
            "yellow" => Some(Self::new(255, 255, 0, 255)),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unrecognized color '{value}'"))
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_hex()
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Dash pattern for line strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
    LongDash,
    DoubleDash,
}

impl LineDash {
    /// Dash array in screen pixels (empty = solid).
    pub fn pattern(self) -> &'static [f64] {
        match self {
            LineDash::Solid => &[],
            LineDash::Dashed => &[8.0, 4.0],
            LineDash::Dotted => &[2.0, 3.0],
            LineDash::DashDot => &[8.0, 3.0, 2.0, 3.0],
            LineDash::LongDash => &[16.0, 6.0],
            LineDash::DoubleDash => &[8.0, 3.0, 8.0, 8.0],
        }
    }
}

/// Style for lines and multilines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Rgba,
    /// Stroke width in screen pixels.
    pub width: f64,
    #[serde(default, rename = "type")]
    pub dash: LineDash,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Rgba::black(),
            width: 1.0,
            dash: LineDash::Solid,
        }
    }
}

/// Style for point markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    pub color: Rgba,
    /// Marker radius in screen pixels.
    pub size: f64,
    /// Glyph code for symbol fonts.
    #[serde(rename = "symbolCode")]
    pub symbol_code: u32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            color: Rgba::new(0xfe, 0xfe, 0xfe, 0xff),
            size: 1.0,
            symbol_code: 0x6e,
        }
    }
}

/// Style for polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonStyle {
    #[serde(rename = "fillColor")]
    pub fill_color: Rgba,
    #[serde(rename = "strokeColor")]
    pub stroke_color: Rgba,
    #[serde(rename = "strokeWidth")]
    pub stroke_width: f64,
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            fill_color: Rgba::white(),
            stroke_color: Rgba::black(),
            stroke_width: 1.0,
        }
    }
}

/// Style for text labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontStyle {
    pub color: Rgba,
    /// Font size in pixels.
    pub size: f64,
    #[serde(rename = "fontFamily")]
    pub font_family: String,
    #[serde(rename = "char")]
    pub char_code: u32,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            color: Rgba::black(),
            size: 12.0,
            font_family: "Webdings".to_string(),
            char_code: 0x3d,
        }
    }
}

/// Per-layer style, one entry per geometry kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerStyle {
    #[serde(rename = "lineStyle")]
    pub line: LineStyle,
    #[serde(rename = "polygonStyle")]
    pub polygon: PolygonStyle,
    #[serde(rename = "pointStyle")]
    pub point: PointStyle,
    #[serde(rename = "fontStyle")]
    pub font: FontStyle,
}

impl LayerStyle {
    /// The layer's style for the given geometry kind.
    pub fn for_kind(&self, kind: GeometryKind) -> EffectiveStyle {
        match kind {
            GeometryKind::Point => EffectiveStyle::Point(self.point.clone()),
            GeometryKind::Line | GeometryKind::Multiline => EffectiveStyle::Line(self.line.clone()),
            GeometryKind::Polygon => EffectiveStyle::Polygon(self.polygon.clone()),
            GeometryKind::Text => EffectiveStyle::Font(self.font.clone()),
        }
    }
}

/// The concrete style used to draw or hit-test one geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectiveStyle {
    Point(PointStyle),
    Line(LineStyle),
    Polygon(PolygonStyle),
    Font(FontStyle),
}

impl EffectiveStyle {
    /// Built-in default for a geometry kind.
    pub fn default_for(kind: GeometryKind) -> Self {
        LayerStyle::default().for_kind(kind)
    }

    /// Synthesize the selection highlight variant of this style.
    pub fn highlighted(&self) -> Self {
        match self {
            EffectiveStyle::Point(s) => EffectiveStyle::Point(PointStyle {
                color: HIGHLIGHT_COLOR,
                size: s.size * 1.5,
                symbol_code: s.symbol_code,
            }),
            EffectiveStyle::Line(s) => EffectiveStyle::Line(LineStyle {
                color: HIGHLIGHT_COLOR,
                width: s.width * 2.0,
                dash: s.dash,
            }),
            EffectiveStyle::Polygon(s) => EffectiveStyle::Polygon(PolygonStyle {
                fill_color: HIGHLIGHT_COLOR,
                stroke_color: s.stroke_color,
                stroke_width: HIGHLIGHT_POLYGON_STROKE_WIDTH,
            }),
            EffectiveStyle::Font(s) => EffectiveStyle::Font(FontStyle {
                color: HIGHLIGHT_COLOR,
                ..s.clone()
            }),
        }
    }

    pub fn as_point(&self) -> Option<&PointStyle> {
        match self {
            EffectiveStyle::Point(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineStyle> {
        match self {
            EffectiveStyle::Line(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_polygon(&self) -> Option<&PolygonStyle> {
        match self {
            EffectiveStyle::Polygon(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_font(&self) -> Option<&FontStyle> {
        match self {
            EffectiveStyle::Font(s) => Some(s),
            _ => None,
        }
    }
}

/// Resolve a geometry's style: own override, then layer style, then default.
pub fn resolve(geometry: &Geometry, layer_style: Option<&LayerStyle>) -> EffectiveStyle {
    let kind = geometry.kind();
    geometry
        .style_override()
        .or_else(|| layer_style.map(|style| style.for_kind(kind)))
        .unwrap_or_else(|| EffectiveStyle::default_for(kind))
}

/// Like [`resolve`], but selected geometries get the highlight variant.
pub fn resolve_with_selection(geometry: &Geometry, layer_style: Option<&LayerStyle>) -> EffectiveStyle {
    let style = resolve(geometry, layer_style);
    if geometry.is_selected() {
        style.highlighted()
    } else {
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Line, Point};
    use kurbo::Point as Coordinate;

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(Rgba::parse("#ffc300"), Some(Rgba::new(255, 195, 0, 255)));
        assert_eq!(Rgba::parse("#000"), Some(Rgba::black()));
        assert_eq!(Rgba::parse("#11223344"), Some(Rgba::new(0x11, 0x22, 0x33, 0x44)));
        assert_eq!(Rgba::parse("black"), Some(Rgba::black()));
        assert_eq!(Rgba::parse("#12345"), None);
        assert_eq!(Rgba::parse("not-a-color"), None);
    }

    #[test]
    fn test_parse_rejects_non_hex_digits() {
        assert_eq!(Rgba::parse("#a\u{e9}"), None);
        assert_eq!(Rgba::parse("#\u{e9}\u{e9}\u{e9}"), None);
        assert_eq!(Rgba::parse("#+f+f+f"), None);
        assert_eq!(Rgba::parse("#-1-1-1"), None);
        assert_eq!(Rgba::parse("#ggg"), None);
    }

    #[test]
    fn test_color_serializes_as_hex() {
        let json = serde_json::to_string(&Rgba::new(254, 254, 254, 255)).unwrap();
        assert_eq!(json, "\"#fefefe\"");
        let back: Rgba = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgba::new(254, 254, 254, 255));
    }

    #[test]
    fn test_resolution_prefers_override() {
        let own = PointStyle {
            size: 7.0,
            ..PointStyle::default()
        };
        let point = Geometry::Point(Point::with_style(Coordinate::new(0.0, 0.0), own.clone()));
        let layer = LayerStyle {
            point: PointStyle {
                size: 3.0,
                ..PointStyle::default()
            },
            ..LayerStyle::default()
        };
        assert_eq!(resolve(&point, Some(&layer)), EffectiveStyle::Point(own));
    }

    #[test]
    fn test_resolution_falls_back_to_layer_then_default() {
        let point = Geometry::Point(Point::new(Coordinate::new(0.0, 0.0)));
        let layer = LayerStyle {
            point: PointStyle {
                size: 3.0,
                ..PointStyle::default()
            },
            ..LayerStyle::default()
        };
        let style = resolve(&point, Some(&layer));
        assert!((style.as_point().unwrap().size - 3.0).abs() < f64::EPSILON);

        let style = resolve(&point, None);
        assert_eq!(style, EffectiveStyle::Point(PointStyle::default()));
    }

    #[test]
    fn test_multiline_uses_line_style() {
        let layer = LayerStyle::default();
        assert!(matches!(layer.for_kind(GeometryKind::Multiline), EffectiveStyle::Line(_)));
    }

    #[test]
    fn test_selection_highlight_is_synthesized() {
        let line = Line::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)]).unwrap();
        let mut geometry = Geometry::Line(line);
        let base = resolve_with_selection(&geometry, None);
        assert_eq!(base, EffectiveStyle::Line(LineStyle::default()));

        geometry.set_selected(true);
        let highlighted = resolve_with_selection(&geometry, None);
        let style = highlighted.as_line().unwrap();
        assert_eq!(style.color, HIGHLIGHT_COLOR);
        assert!((style.width - 2.0).abs() < f64::EPSILON);

        // The underlying style is untouched.
        geometry.set_selected(false);
        assert_eq!(resolve_with_selection(&geometry, None), base);
    }

    #[test]
    fn test_polygon_highlight_keeps_stroke_color() {
        let style = EffectiveStyle::Polygon(PolygonStyle {
            fill_color: Rgba::white(),
            stroke_color: Rgba::new(10, 20, 30, 255),
            stroke_width: 5.0,
        });
        let highlighted = style.highlighted();
        let polygon = highlighted.as_polygon().unwrap();
        assert_eq!(polygon.fill_color, HIGHLIGHT_COLOR);
        assert_eq!(polygon.stroke_color, Rgba::new(10, 20, 30, 255));
        assert!((polygon.stroke_width - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_point_highlight_scales_size() {
        let style = EffectiveStyle::Point(PointStyle {
            size: 2.0,
            ..PointStyle::default()
        });
        let highlighted = style.highlighted();
        assert!((highlighted.as_point().unwrap().size - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dash_patterns() {
        assert!(LineDash::Solid.pattern().is_empty());
        assert_eq!(LineDash::Dashed.pattern(), &[8.0, 4.0]);
        let dash: LineDash = serde_json::from_str("\"dashdot\"").unwrap();
        assert_eq!(dash, LineDash::DashDot);
    }

    #[test]
    fn test_layer_style_deserializes_partial() {
        let style: LayerStyle =
            serde_json::from_str(r##"{"lineStyle": {"color": "#ff0000", "width": 3, "type": "dashed"}}"##).unwrap();
        assert_eq!(style.line.color, Rgba::new(255, 0, 0, 255));
        assert_eq!(style.line.dash, LineDash::Dashed);
        assert_eq!(style.polygon, PolygonStyle::default());
    }
}

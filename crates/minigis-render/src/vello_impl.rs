//! Vello-backed drawing surface.

use crate::error::{RenderError, RenderResult};
use kurbo::{Affine, BezPath, Point, Rect, Size, Stroke};
use minigis_core::style::Rgba;
use minigis_core::surface::{PaintStack, Surface};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use std::sync::Arc;
use vello::Scene;

/// A [`Surface`] that encodes drawing into a Vello scene.
///
/// Text is laid out with Parley. Fonts are not bundled: the host registers
/// the faces it wants with [`VelloSurface::register_font`]. Text whose font
/// cannot be resolved is drawn as a translucent placeholder box.
pub struct VelloSurface {
    /// The Vello scene being built.
    scene: Scene,
    paint: PaintStack,
    /// Font context for text rendering (cached across frames).
    font_cx: FontContext,
    /// Layout context for text rendering.
    layout_cx: LayoutContext<Brush>,
    size: Size,
    background: Color,
}

impl VelloSurface {
    pub fn new(size: Size, background: Rgba) -> Self {
        Self {
            scene: Scene::new(),
            paint: PaintStack::new(),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            size,
            background: background.into(),
        }
    }

    /// Register a font file (TTF/OTF/collection). Returns the number of families added.
    pub fn register_font(&mut self, data: Vec<u8>) -> RenderResult<usize> {
        let families = self
            .font_cx
            .collection
            .register_fonts(vello::peniko::Blob::new(Arc::new(data)), None);
        if families.is_empty() {
            return Err(RenderError::FontRegistration("no font faces found in data".to_string()));
        }
        log::debug!("registered {} font families", families.len());
        Ok(families.len())
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    fn stroke_style(&self) -> Stroke {
        let state = self.paint.current();
        let stroke = Stroke::new(state.line_width);
        if state.dash.is_empty() {
            stroke
        } else {
            stroke.with_dashes(0.0, state.dash.iter().copied())
        }
    }

    /// Lay out and draw `text` centered on `anchor`. Returns the number of glyphs drawn.
    fn render_text(&mut self, text: &str, anchor: Point) -> usize {
        let state = self.paint.current();
        let brush = Brush::Solid(state.fill_color.into());
        let font_size = state.font_size as f32;
        let family = state.font_family.clone();

        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(font_size));
        builder.push_default(StyleProperty::Brush(brush.clone()));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Single(
            parley::FontFamily::Named(family.into()),
        )));
        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());

        let width = layout.width() as f64;
        let height = layout.height() as f64;
        let text_transform = Affine::translate((anchor.x - width / 2.0, anchor.y - height / 2.0));

        let mut glyph_count = 0;
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let run_font_size = run.font_size();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        glyph_count += 1;
                        vello::Glyph { id: glyph.id, x: gx, y: gy }
                    })
                    .collect();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(run_font_size)
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }
        glyph_count
    }

    fn render_text_placeholder(&mut self, text: &str, anchor: Point) {
        let state = self.paint.current();
        let width = (text.chars().count() as f64 * state.font_size * 0.6).max(state.font_size);
        let height = state.font_size * 1.2;
        let rect = Rect::from_center_size(anchor, (width, height));
        let color = Color::from(state.fill_color).with_alpha(0.4);
        self.scene.fill(Fill::NonZero, Affine::IDENTITY, color, None, &rect);
    }
}

impl Surface for VelloSurface {
    fn save(&mut self) {
        self.paint.save();
    }

    fn restore(&mut self) {
        self.paint.restore();
    }

    fn set_stroke(&mut self, color: Rgba, width: f64) {
        let state = self.paint.current_mut();
        state.stroke_color = color;
        state.line_width = width;
    }

    fn set_fill(&mut self, color: Rgba) {
        self.paint.current_mut().fill_color = color;
    }

    fn set_dash(&mut self, pattern: &[f64]) {
        self.paint.current_mut().dash = pattern.to_vec();
    }

    fn set_font(&mut self, family: &str, size: f64) {
        let state = self.paint.current_mut();
        state.font_family = family.to_string();
        state.font_size = size;
    }

    fn stroke_path(&mut self, path: &BezPath) {
        let stroke = self.stroke_style();
        let color = Color::from(self.paint.current().stroke_color);
        self.scene.stroke(&stroke, Affine::IDENTITY, color, None, path);
    }

    fn fill_path(&mut self, path: &BezPath, rule: Fill) {
        let color = Color::from(self.paint.current().fill_color);
        self.scene.fill(rule, Affine::IDENTITY, color, None, path);
    }

    fn fill_text(&mut self, text: &str, anchor: Point) {
        if text.is_empty() {
            return;
        }
        if self.render_text(text, anchor) == 0 {
            log::trace!("no glyphs for '{text}', drawing placeholder");
            self.render_text_placeholder(text, anchor);
        }
    }

    fn clear(&mut self) {
        self.scene.reset();
        self.paint.reset();
        let background = Rect::from_origin_size(Point::ZERO, self.size);
        self.scene
            .fill(Fill::NonZero, Affine::IDENTITY, self.background, None, &background);
    }
}

//! Drawing text through a renderer backend.

use fog_asset::{AssetId, AssetRegistry, Image};
use glam::{Vec2, Vec4};

use crate::layout::{layout_with_font, GlyphQuad};
use crate::Result;

/// How text is shaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Fill color, RGBA.
    pub color: Vec4,
    /// Thickness of the glyph bezels.
    pub edge: f32,
    /// Draw a black border around the glyphs.
    pub border: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            edge: 0.2,
            border: false,
        }
    }
}

impl TextStyle {
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn with_edge(mut self, edge: f32) -> Self {
        self.edge = edge;
        self
    }

    pub fn with_border(mut self, border: bool) -> Self {
        self.border = border;
        self
    }
}

/// Backend that puts glyph quads on screen.
pub trait TextRenderer {
    /// Draw `quads`, all sampled from `atlas`.
    fn draw_glyphs(&mut self, atlas: &Image<'_>, quads: &[GlyphQuad], style: &TextStyle);
}

/// Draw `text` with its top-left corner at `(x, y)`.
///
/// Both the font and its texture must be in `registry`. Nothing is drawn if
/// either lookup fails.
#[allow(clippy::too_many_arguments)]
pub fn draw_text<R: TextRenderer + ?Sized>(
    renderer: &mut R,
    registry: &AssetRegistry,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    font_id: AssetId,
    style: &TextStyle,
) -> Result<()> {
    let font = registry.font(font_id)?;
    let atlas = registry.image(font.texture())?;
    let quads = layout_with_font(&font, text, Vec2::new(x, y), size)?;

    if !quads.is_empty() {
        renderer.draw_glyphs(&atlas, &quads, style);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{sample_registry, FONT, TEXTURE};
    use crate::Error;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(u32, Vec<GlyphQuad>, TextStyle)>,
    }

    impl TextRenderer for Recorder {
        fn draw_glyphs(&mut self, atlas: &Image<'_>, quads: &[GlyphQuad], style: &TextStyle) {
            self.calls.push((atlas.width, quads.to_vec(), *style));
        }
    }

    #[test]
    fn test_default_style() {
        let style = TextStyle::default();
        assert_eq!(style.color, Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(style.edge, 0.2);
        assert!(!style.border);
    }

    #[test]
    fn test_draw_forwards_layout() {
        let registry = sample_registry();
        let style = TextStyle::default()
            .with_color(Vec4::new(1.0, 0.5, 0.0, 1.0))
            .with_edge(0.35)
            .with_border(true);
        let mut recorder = Recorder::default();

        draw_text(&mut recorder, &registry, "ABC", 10.0, 20.0, 16.0, FONT, &style).unwrap();

        assert_eq!(recorder.calls.len(), 1);
        let (atlas_width, quads, drawn_style) = &recorder.calls[0];
        assert_eq!(*atlas_width, 64);
        assert_eq!(quads.len(), 3);
        assert_eq!(quads[0].position, Vec2::new(10.0, 21.0));
        assert!(quads.iter().all(|quad| quad.texture == TEXTURE));
        assert_eq!(*drawn_style, style);
        assert_eq!(drawn_style.color, Vec4::new(1.0, 0.5, 0.0, 1.0));
        assert_eq!(drawn_style.edge, 0.35);
        assert!(drawn_style.border);
    }

    #[test]
    fn test_draw_nothing_visible() {
        let registry = sample_registry();
        let mut recorder = Recorder::default();

        draw_text(&mut recorder, &registry, "  \n", 0.0, 0.0, 16.0, FONT, &TextStyle::default()).unwrap();
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn test_draw_unknown_font() {
        let registry = sample_registry();
        let mut recorder = Recorder::default();

        let err = draw_text(&mut recorder, &registry, "A", 0.0, 0.0, 16.0, 404, &TextStyle::default());
        assert!(matches!(err, Err(Error::Asset(fog_asset::Error::AssetNotFound(404)))));
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn test_renderer_as_trait_object() {
        let registry = sample_registry();
        let mut recorder = Recorder::default();
        let renderer: &mut dyn TextRenderer = &mut recorder;

        draw_text(renderer, &registry, "E", 0.0, 0.0, 16.0, FONT, &TextStyle::default()).unwrap();
        assert_eq!(recorder.calls[0].1[0].ch, b'E');
    }
}

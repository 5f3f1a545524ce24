//! Drawing capability trait for pluggable rendering backends.
//!
//! Draw stages and caches talk only to [`Graphics`]. Backends decide what an
//! image is; the grid only asks them to capture one offscreen, blit it, and
//! release it when a cache evicts it.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Point, Rect};

use super::colors::Color;

/// Font description passed to [`Graphics::set_font`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: 12.0,
            bold: false,
            italic: false,
        }
    }
}

impl Font {
    /// CSS font shorthand, e.g. `"bold 12px sans-serif"`.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        if self.italic {
            css.push_str("italic ");
        }
        if self.bold {
            css.push_str("bold ");
        }
        css.push_str(&format!("{}px {}", self.size, self.family));
        css
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Everything a text stage needs besides the string itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextFormat {
    #[serde(default)]
    pub font: Font,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub valign: VerticalAlign,
}

impl TextFormat {
    #[must_use]
    pub fn with_align(mut self, align: TextAlign, valign: VerticalAlign) -> Self {
        self.align = align;
        self.valign = valign;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Per-side insets. `None` on a side means no inset there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
}

impl Padding {
    /// Same inset on every side.
    pub const fn uniform(v: f64) -> Self {
        Self {
            left: Some(v),
            top: Some(v),
            right: Some(v),
            bottom: Some(v),
        }
    }

    pub fn apply(&self, r: Rect) -> Rect {
        r.inset(
            self.left.unwrap_or(0.0),
            self.top.unwrap_or(0.0),
            self.right.unwrap_or(0.0),
            self.bottom.unwrap_or(0.0),
        )
    }
}

/// A raster image owned by whoever captured it.
pub trait ImageHandle {
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    /// Free the backing raster memory. The handle must not be drawn afterwards.
    fn release(&self) -> Result<()>;
}

/// Rendering capability set used by every draw stage.
pub trait Graphics {
    type Image: ImageHandle + 'static;

    fn set_color(&mut self, color: Color);
    fn set_font(&mut self, font: &Font);

    fn fill_rect(&mut self, r: Rect);
    fn stroke_rect(&mut self, r: Rect, line_width: f64);
    fn fill_rounded_rect(&mut self, r: Rect, radius: f64);
    fn stroke_rounded_rect(&mut self, r: Rect, radius: f64, line_width: f64);
    fn fill_oval(&mut self, r: Rect);
    fn stroke_oval(&mut self, r: Rect, line_width: f64);
    fn fill_arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64);
    fn stroke_arc(
        &mut self,
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        line_width: f64,
    );

    /// Start a batch of line segments sharing one stroke.
    fn begin_lines(&mut self, line_width: f64);
    fn draw_line(&mut self, from: Point, to: Point);
    fn end_lines(&mut self);

    /// Draw `text` aligned inside `r` with the current font and color.
    fn draw_text(&mut self, text: &str, r: Rect, align: TextAlign, valign: VerticalAlign);

    fn draw_image(&mut self, image: &Self::Image, at: Point);
    fn draw_image_stretched(&mut self, image: &Self::Image, r: Rect);

    /// Redirect drawing into a fresh `width` x `height` surface.
    ///
    /// `reuse` is an image this caller no longer needs; the backend may
    /// recycle its storage or must release it.
    fn begin_offscreen(&mut self, width: f64, height: f64, reuse: Option<Self::Image>)
        -> Result<()>;

    /// Finish the innermost offscreen capture and hand back its image.
    fn end_offscreen(&mut self) -> Result<Self::Image>;

    fn save_state(&mut self);
    fn restore_state(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    fn scale(&mut self, sx: f64, sy: f64);
    fn clip_rect(&mut self, r: Rect);
}

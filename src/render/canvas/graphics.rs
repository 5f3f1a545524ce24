use std::cell::Cell;
use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::error::{GridError, Result};
use crate::render::backend::{Font, Graphics, ImageHandle, TextAlign, VerticalAlign};
use crate::render::colors::Color;
use crate::types::{Point, Rect};

/// Pixel size of an offscreen canvas for a logical size.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_px(v: f64, dpr: f64) -> u32 {
    (v * dpr).ceil().clamp(1.0, f64::from(u32::MAX)) as u32
}

struct Surface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl Surface {
    fn from_canvas(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| GridError::Offscreen("failed to get 2d context".into()))?
            .ok_or_else(|| GridError::Offscreen("no 2d context available".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| GridError::Offscreen("not a CanvasRenderingContext2d".into()))?;
        let width = f64::from(canvas.width());
        let height = f64::from(canvas.height());
        Ok(Self {
            canvas,
            ctx,
            width,
            height,
        })
    }
}

/// Offscreen canvas captured by [`CanvasGraphics::end_offscreen`].
pub struct CanvasImage {
    canvas: HtmlCanvasElement,
    width: f64,
    height: f64,
    released: Cell<bool>,
}

impl ImageHandle for CanvasImage {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    /// Shrinks the backing canvas to zero so the browser can free it.
    fn release(&self) -> Result<()> {
        if self.released.replace(true) {
            return Err(GridError::ImageRelease("canvas already released".into()));
        }
        self.canvas.set_width(0);
        self.canvas.set_height(0);
        Ok(())
    }
}

/// [`Graphics`] over an HTML canvas 2D context.
pub struct CanvasGraphics {
    main: Surface,
    offscreen: Vec<Surface>,
    dpr: f64,
    line_width: f64,
}

impl CanvasGraphics {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        Ok(Self {
            main: Surface::from_canvas(canvas)?,
            offscreen: Vec::new(),
            dpr: 1.0,
            line_width: 1.0,
        })
    }

    /// Device pixel ratio used when sizing offscreen canvases.
    pub fn set_dpr(&mut self, dpr: f64) {
        if dpr.is_finite() && dpr > 0.0 {
            self.dpr = dpr;
        }
    }

    pub fn width(&self) -> f64 {
        self.main.width
    }

    pub fn height(&self) -> f64 {
        self.main.height
    }

    fn ctx(&self) -> &CanvasRenderingContext2d {
        &self.offscreen.last().unwrap_or(&self.main).ctx
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn new_canvas(width: u32, height: u32) -> Result<HtmlCanvasElement> {
        let canvas = Self::document()
            .ok_or_else(|| GridError::Offscreen("no document".into()))?
            .create_element("canvas")
            .map_err(|_| GridError::Offscreen("failed to create canvas".into()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| GridError::Offscreen("not an HtmlCanvasElement".into()))?;
        canvas.set_width(width);
        canvas.set_height(height);
        Ok(canvas)
    }

    fn rounded_path(&self, r: Rect, radius: f64) {
        let ctx = self.ctx();
        let radius = radius.min(r.width / 2.0).min(r.height / 2.0).max(0.0);
        ctx.begin_path();
        ctx.move_to(r.x + radius, r.y);
        let _ = ctx.arc_to(r.right(), r.y, r.right(), r.bottom(), radius);
        let _ = ctx.arc_to(r.right(), r.bottom(), r.x, r.bottom(), radius);
        let _ = ctx.arc_to(r.x, r.bottom(), r.x, r.y, radius);
        let _ = ctx.arc_to(r.x, r.y, r.right(), r.y, radius);
        ctx.close_path();
    }

    fn oval_path(&self, r: Rect) {
        let ctx = self.ctx();
        ctx.begin_path();
        let _ = ctx.ellipse(
            r.x + r.width / 2.0,
            r.y + r.height / 2.0,
            r.width / 2.0,
            r.height / 2.0,
            0.0,
            0.0,
            2.0 * PI,
        );
    }
}

impl Graphics for CanvasGraphics {
    type Image = CanvasImage;

    fn set_color(&mut self, color: Color) {
        let css = color.to_css();
        let ctx = self.ctx();
        ctx.set_fill_style_str(&css);
        ctx.set_stroke_style_str(&css);
    }

    fn set_font(&mut self, font: &Font) {
        self.ctx().set_font(&font.to_css());
    }

    fn fill_rect(&mut self, r: Rect) {
        self.ctx().fill_rect(r.x, r.y, r.width, r.height);
    }

    fn stroke_rect(&mut self, r: Rect, line_width: f64) {
        let ctx = self.ctx();
        ctx.set_line_width(line_width);
        ctx.stroke_rect(r.x, r.y, r.width, r.height);
    }

    fn fill_rounded_rect(&mut self, r: Rect, radius: f64) {
        self.rounded_path(r, radius);
        self.ctx().fill();
    }

    fn stroke_rounded_rect(&mut self, r: Rect, radius: f64, line_width: f64) {
        self.rounded_path(r, radius);
        self.ctx().set_line_width(line_width);
        self.ctx().stroke();
    }

    fn fill_oval(&mut self, r: Rect) {
        self.oval_path(r);
        self.ctx().fill();
    }

    fn stroke_oval(&mut self, r: Rect, line_width: f64) {
        self.oval_path(r);
        self.ctx().set_line_width(line_width);
        self.ctx().stroke();
    }

    fn fill_arc(&mut self, center: Point, radius: f64, start: f64, end: f64) {
        let ctx = self.ctx();
        ctx.begin_path();
        ctx.move_to(center.x, center.y);
        let _ = ctx.arc(center.x, center.y, radius, start, end);
        ctx.close_path();
        ctx.fill();
    }

    fn stroke_arc(&mut self, center: Point, radius: f64, start: f64, end: f64, line_width: f64) {
        let ctx = self.ctx();
        ctx.begin_path();
        let _ = ctx.arc(center.x, center.y, radius, start, end);
        ctx.set_line_width(line_width);
        ctx.stroke();
    }

    fn begin_lines(&mut self, line_width: f64) {
        self.line_width = line_width;
        self.ctx().begin_path();
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        let ctx = self.ctx();
        ctx.move_to(from.x, from.y);
        ctx.line_to(to.x, to.y);
    }

    fn end_lines(&mut self) {
        let ctx = self.ctx();
        ctx.set_line_width(self.line_width);
        ctx.stroke();
    }

    fn draw_text(&mut self, text: &str, r: Rect, align: TextAlign, valign: VerticalAlign) {
        let ctx = self.ctx();
        let (x, h_align) = match align {
            TextAlign::Left => (r.x, "left"),
            TextAlign::Center => (r.x + r.width / 2.0, "center"),
            TextAlign::Right => (r.right(), "right"),
        };
        let (y, baseline) = match valign {
            VerticalAlign::Top => (r.y, "top"),
            VerticalAlign::Middle => (r.y + r.height / 2.0, "middle"),
            VerticalAlign::Bottom => (r.bottom(), "bottom"),
        };
        ctx.save();
        ctx.begin_path();
        ctx.rect(r.x, r.y, r.width, r.height);
        ctx.clip();
        ctx.set_text_align(h_align);
        ctx.set_text_baseline(baseline);
        let _ = ctx.fill_text(text, x, y);
        ctx.restore();
    }

    fn draw_image(&mut self, image: &CanvasImage, at: Point) {
        let _ = self.ctx().draw_image_with_html_canvas_element_and_dw_and_dh(
            &image.canvas,
            at.x,
            at.y,
            image.width,
            image.height,
        );
    }

    fn draw_image_stretched(&mut self, image: &CanvasImage, r: Rect) {
        let _ = self.ctx().draw_image_with_html_canvas_element_and_dw_and_dh(
            &image.canvas,
            r.x,
            r.y,
            r.width,
            r.height,
        );
    }

    fn begin_offscreen(
        &mut self,
        width: f64,
        height: f64,
        reuse: Option<CanvasImage>,
    ) -> Result<()> {
        if !(width > 0.0 && height > 0.0) {
            if let Some(old) = reuse {
                let _ = old.release();
            }
            return Err(GridError::Offscreen(format!(
                "empty surface {width}x{height}"
            )));
        }
        let (w_px, h_px) = (to_px(width, self.dpr), to_px(height, self.dpr));
        let canvas = match reuse {
            Some(old) if !old.released.get() => {
                old.canvas.set_width(w_px);
                old.canvas.set_height(h_px);
                old.canvas
            }
            _ => Self::new_canvas(w_px, h_px)?,
        };
        let surface = Surface::from_canvas(canvas)?;
        if (self.dpr - 1.0).abs() > f64::EPSILON {
            let _ = surface.ctx.scale(self.dpr, self.dpr);
        }
        self.offscreen.push(Surface {
            width,
            height,
            ..surface
        });
        Ok(())
    }

    fn end_offscreen(&mut self) -> Result<CanvasImage> {
        let surface = self
            .offscreen
            .pop()
            .ok_or_else(|| GridError::Offscreen("no offscreen capture in progress".into()))?;
        Ok(CanvasImage {
            canvas: surface.canvas,
            width: surface.width,
            height: surface.height,
            released: Cell::new(false),
        })
    }

    fn save_state(&mut self) {
        self.ctx().save();
    }

    fn restore_state(&mut self) {
        self.ctx().restore();
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        let _ = self.ctx().translate(dx, dy);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        let _ = self.ctx().scale(sx, sy);
    }

    fn clip_rect(&mut self, r: Rect) {
        let ctx = self.ctx();
        ctx.begin_path();
        ctx.rect(r.x, r.y, r.width, r.height);
        ctx.clip();
    }
}

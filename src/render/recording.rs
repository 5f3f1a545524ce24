//! In-memory [`Graphics`] backend that records every draw call.
//!
//! Used by the CLI, the benches and the tests. Geometry is recorded in device
//! space (after translate/scale), so a recorded rect is where the pixels
//! would land. Offscreen captures record into their own op list and produce a
//! [`RecordedImage`]; a shared counter tracks images that were captured but
//! not yet released.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use tracing::warn;

use crate::error::{GridError, Result};
use crate::types::{Point, Rect};

use super::backend::{Font, Graphics, ImageHandle, TextAlign, VerticalAlign};
use super::colors::Color;

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    SetColor {
        color: Color,
    },
    SetFont {
        font: String,
    },
    FillRect {
        rect: Rect,
    },
    StrokeRect {
        rect: Rect,
        line_width: f64,
    },
    FillRoundedRect {
        rect: Rect,
        radius: f64,
    },
    StrokeRoundedRect {
        rect: Rect,
        radius: f64,
        line_width: f64,
    },
    FillOval {
        rect: Rect,
    },
    StrokeOval {
        rect: Rect,
        line_width: f64,
    },
    FillArc {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
    },
    StrokeArc {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        line_width: f64,
    },
    Lines {
        line_width: f64,
        segments: Vec<(Point, Point)>,
    },
    Text {
        text: String,
        rect: Rect,
        align: TextAlign,
        valign: VerticalAlign,
    },
    Image {
        image: u64,
        rect: Rect,
    },
    Clip {
        rect: Rect,
    },
}

impl DrawOp {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetColor { .. } => "set_color",
            Self::SetFont { .. } => "set_font",
            Self::FillRect { .. } => "fill_rect",
            Self::StrokeRect { .. } => "stroke_rect",
            Self::FillRoundedRect { .. } => "fill_rounded_rect",
            Self::StrokeRoundedRect { .. } => "stroke_rounded_rect",
            Self::FillOval { .. } => "fill_oval",
            Self::StrokeOval { .. } => "stroke_oval",
            Self::FillArc { .. } => "fill_arc",
            Self::StrokeArc { .. } => "stroke_arc",
            Self::Lines { .. } => "lines",
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Clip { .. } => "clip",
        }
    }
}

#[derive(Debug)]
struct ImageInner {
    id: u64,
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
    released: Cell<bool>,
    live: Rc<Cell<usize>>,
    released_total: Rc<Cell<usize>>,
}

/// Image captured by [`RecordingGraphics::end_offscreen`].
#[derive(Debug, Clone)]
pub struct RecordedImage(Rc<ImageInner>);

impl RecordedImage {
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Ops drawn while this image was being captured (surface-local space).
    pub fn ops(&self) -> &[DrawOp] {
        &self.0.ops
    }

    pub fn is_released(&self) -> bool {
        self.0.released.get()
    }
}

impl ImageHandle for RecordedImage {
    fn width(&self) -> f64 {
        self.0.width
    }

    fn height(&self) -> f64 {
        self.0.height
    }

    fn release(&self) -> Result<()> {
        if self.0.released.replace(true) {
            return Err(GridError::ImageRelease(format!(
                "image {} already released",
                self.0.id
            )));
        }
        self.0.live.set(self.0.live.get().saturating_sub(1));
        self.0.released_total.set(self.0.released_total.get() + 1);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform {
    dx: f64,
    dy: f64,
    sx: f64,
    sy: f64,
}

impl Transform {
    const IDENTITY: Self = Self {
        dx: 0.0,
        dy: 0.0,
        sx: 1.0,
        sy: 1.0,
    };

    fn point(&self, p: Point) -> Point {
        Point::new(p.x * self.sx + self.dx, p.y * self.sy + self.dy)
    }

    fn rect(&self, r: Rect) -> Rect {
        Rect::new(
            r.x * self.sx + self.dx,
            r.y * self.sy + self.dy,
            r.width * self.sx,
            r.height * self.sy,
        )
    }
}

#[derive(Debug)]
struct Surface {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
    transform: Transform,
    saved: Vec<Transform>,
    lines: Option<(f64, Vec<(Point, Point)>)>,
}

impl Surface {
    fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            transform: Transform::IDENTITY,
            saved: Vec::new(),
            lines: None,
        }
    }
}

/// Recording backend.
#[derive(Debug)]
pub struct RecordingGraphics {
    main: Surface,
    offscreen: Vec<Surface>,
    next_image: u64,
    live: Rc<Cell<usize>>,
    released_total: Rc<Cell<usize>>,
    captures: usize,
    stale_draws: usize,
    fail_offscreen: bool,
}

impl RecordingGraphics {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            main: Surface::new(width, height),
            offscreen: Vec::new(),
            next_image: 1,
            live: Rc::new(Cell::new(0)),
            released_total: Rc::new(Cell::new(0)),
            captures: 0,
            stale_draws: 0,
            fail_offscreen: false,
        }
    }

    /// Ops recorded on the main surface.
    pub fn ops(&self) -> &[DrawOp] {
        &self.main.ops
    }

    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.main.ops)
    }

    pub fn clear(&mut self) {
        self.main.ops.clear();
    }

    /// Text strings drawn on the main surface, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.main
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Count of main-surface ops per kind.
    pub fn op_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for op in &self.main.ops {
            *counts.entry(op.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Captured images not yet released.
    pub fn live_images(&self) -> usize {
        self.live.get()
    }

    pub fn released_images(&self) -> usize {
        self.released_total.get()
    }

    /// Completed offscreen captures.
    pub fn captures(&self) -> usize {
        self.captures
    }

    /// Draws of images that had already been released.
    pub fn stale_draws(&self) -> usize {
        self.stale_draws
    }

    /// Make every subsequent `begin_offscreen` fail.
    pub fn set_offscreen_failure(&mut self, fail: bool) {
        self.fail_offscreen = fail;
    }

    /// Open save/restore pairs on the current surface.
    pub fn state_depth(&self) -> usize {
        self.surface().saved.len()
    }

    pub fn size(&self) -> (f64, f64) {
        (self.main.width, self.main.height)
    }

    fn surface(&self) -> &Surface {
        self.offscreen.last().unwrap_or(&self.main)
    }

    fn surface_mut(&mut self) -> &mut Surface {
        self.offscreen.last_mut().unwrap_or(&mut self.main)
    }

    fn push(&mut self, op: DrawOp) {
        self.surface_mut().ops.push(op);
    }

    fn xf(&self) -> Transform {
        self.surface().transform
    }
}

impl Graphics for RecordingGraphics {
    type Image = RecordedImage;

    fn set_color(&mut self, color: Color) {
        self.push(DrawOp::SetColor { color });
    }

    fn set_font(&mut self, font: &Font) {
        self.push(DrawOp::SetFont {
            font: font.to_css(),
        });
    }

    fn fill_rect(&mut self, r: Rect) {
        let rect = self.xf().rect(r);
        self.push(DrawOp::FillRect { rect });
    }

    fn stroke_rect(&mut self, r: Rect, line_width: f64) {
        let rect = self.xf().rect(r);
        self.push(DrawOp::StrokeRect { rect, line_width });
    }

    fn fill_rounded_rect(&mut self, r: Rect, radius: f64) {
        let rect = self.xf().rect(r);
        self.push(DrawOp::FillRoundedRect { rect, radius });
    }

    fn stroke_rounded_rect(&mut self, r: Rect, radius: f64, line_width: f64) {
        let rect = self.xf().rect(r);
        self.push(DrawOp::StrokeRoundedRect {
            rect,
            radius,
            line_width,
        });
    }

    fn fill_oval(&mut self, r: Rect) {
        let rect = self.xf().rect(r);
        self.push(DrawOp::FillOval { rect });
    }

    fn stroke_oval(&mut self, r: Rect, line_width: f64) {
        let rect = self.xf().rect(r);
        self.push(DrawOp::StrokeOval { rect, line_width });
    }

    fn fill_arc(&mut self, center: Point, radius: f64, start: f64, end: f64) {
        let center = self.xf().point(center);
        self.push(DrawOp::FillArc {
            center,
            radius,
            start,
            end,
        });
    }

    fn stroke_arc(&mut self, center: Point, radius: f64, start: f64, end: f64, line_width: f64) {
        let center = self.xf().point(center);
        self.push(DrawOp::StrokeArc {
            center,
            radius,
            start,
            end,
            line_width,
        });
    }

    fn begin_lines(&mut self, line_width: f64) {
        self.surface_mut().lines = Some((line_width, Vec::new()));
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        let xf = self.xf();
        let surface = self.surface_mut();
        match surface.lines.as_mut() {
            Some((_, segments)) => segments.push((xf.point(from), xf.point(to))),
            None => surface.ops.push(DrawOp::Lines {
                line_width: 1.0,
                segments: vec![(xf.point(from), xf.point(to))],
            }),
        }
    }

    fn end_lines(&mut self) {
        if let Some((line_width, segments)) = self.surface_mut().lines.take() {
            if !segments.is_empty() {
                self.push(DrawOp::Lines {
                    line_width,
                    segments,
                });
            }
        }
    }

    fn draw_text(&mut self, text: &str, r: Rect, align: TextAlign, valign: VerticalAlign) {
        let rect = self.xf().rect(r);
        self.push(DrawOp::Text {
            text: text.to_string(),
            rect,
            align,
            valign,
        });
    }

    fn draw_image(&mut self, image: &RecordedImage, at: Point) {
        self.draw_image_stretched(
            image,
            Rect::new(at.x, at.y, image.width(), image.height()),
        );
    }

    fn draw_image_stretched(&mut self, image: &RecordedImage, r: Rect) {
        if image.is_released() {
            self.stale_draws += 1;
        }
        let rect = self.xf().rect(r);
        self.push(DrawOp::Image {
            image: image.id(),
            rect,
        });
    }

    fn begin_offscreen(
        &mut self,
        width: f64,
        height: f64,
        reuse: Option<RecordedImage>,
    ) -> Result<()> {
        if let Some(old) = reuse {
            if let Err(e) = old.release() {
                warn!(error = %e, "Discarding unreleasable reuse image");
            }
        }
        if self.fail_offscreen {
            return Err(GridError::Offscreen("offscreen capture disabled".into()));
        }
        if !(width > 0.0 && height > 0.0) {
            return Err(GridError::Offscreen(format!(
                "empty surface {width}x{height}"
            )));
        }
        self.offscreen.push(Surface::new(width, height));
        Ok(())
    }

    fn end_offscreen(&mut self) -> Result<RecordedImage> {
        let surface = self
            .offscreen
            .pop()
            .ok_or_else(|| GridError::Offscreen("no offscreen capture in progress".into()))?;
        let id = self.next_image;
        self.next_image += 1;
        self.captures += 1;
        self.live.set(self.live.get() + 1);
        Ok(RecordedImage(Rc::new(ImageInner {
            id,
            width: surface.width,
            height: surface.height,
            ops: surface.ops,
            released: Cell::new(false),
            live: Rc::clone(&self.live),
            released_total: Rc::clone(&self.released_total),
        })))
    }

    fn save_state(&mut self) {
        let s = self.surface_mut();
        s.saved.push(s.transform);
    }

    fn restore_state(&mut self) {
        let s = self.surface_mut();
        if let Some(t) = s.saved.pop() {
            s.transform = t;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        let t = &mut self.surface_mut().transform;
        t.dx += dx * t.sx;
        t.dy += dy * t.sy;
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        let t = &mut self.surface_mut().transform;
        t.sx *= sx;
        t.sy *= sy;
    }

    fn clip_rect(&mut self, r: Rect) {
        let rect = self.xf().rect(r);
        self.push(DrawOp::Clip { rect });
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn records_in_device_space() {
        let mut g = RecordingGraphics::new(100.0, 100.0);
        g.save_state();
        g.translate(10.0, 20.0);
        g.scale(2.0, 2.0);
        g.fill_rect(Rect::new(1.0, 1.0, 5.0, 5.0));
        g.restore_state();
        g.fill_rect(Rect::new(1.0, 1.0, 5.0, 5.0));
        assert_eq!(
            g.ops()[0],
            DrawOp::FillRect {
                rect: Rect::new(12.0, 22.0, 10.0, 10.0)
            }
        );
        assert_eq!(
            g.ops()[1],
            DrawOp::FillRect {
                rect: Rect::new(1.0, 1.0, 5.0, 5.0)
            }
        );
        assert_eq!(g.state_depth(), 0);
    }

    #[test]
    fn offscreen_capture_is_isolated() {
        let mut g = RecordingGraphics::new(100.0, 100.0);
        g.translate(50.0, 50.0);
        g.begin_offscreen(10.0, 10.0, None).unwrap();
        g.fill_rect(Rect::sized(10.0, 10.0));
        let img = g.end_offscreen().unwrap();
        assert!(g.ops().is_empty());
        assert_eq!(img.ops().len(), 1);
        assert_eq!(g.live_images(), 1);

        g.draw_image(&img, Point::ZERO);
        assert_eq!(
            g.ops()[0],
            DrawOp::Image {
                image: img.id(),
                rect: Rect::new(50.0, 50.0, 10.0, 10.0)
            }
        );
    }

    #[test]
    fn release_tracks_live_images_and_double_release_fails() {
        let mut g = RecordingGraphics::new(10.0, 10.0);
        g.begin_offscreen(4.0, 4.0, None).unwrap();
        let a = g.end_offscreen().unwrap();
        g.begin_offscreen(4.0, 4.0, Some(a.clone())).unwrap();
        let _b = g.end_offscreen().unwrap();
        assert!(a.is_released());
        assert_eq!(g.live_images(), 1);
        assert!(matches!(a.release(), Err(GridError::ImageRelease(_))));
        g.draw_image(&a, Point::ZERO);
        assert_eq!(g.stale_draws(), 1);
    }

    #[test]
    fn end_without_begin_fails() {
        let mut g = RecordingGraphics::new(10.0, 10.0);
        assert!(matches!(g.end_offscreen(), Err(GridError::Offscreen(_))));
        g.set_offscreen_failure(true);
        assert!(g.begin_offscreen(5.0, 5.0, None).is_err());
    }

    #[test]
    fn line_batches_collapse_into_one_op() {
        let mut g = RecordingGraphics::new(10.0, 10.0);
        g.begin_lines(1.0);
        g.draw_line(Point::ZERO, Point::new(5.0, 0.0));
        g.draw_line(Point::ZERO, Point::new(0.0, 5.0));
        g.end_lines();
        assert_eq!(g.op_counts().get("lines"), Some(&1));
        match &g.ops()[0] {
            DrawOp::Lines { segments, .. } => assert_eq!(segments.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}

//! Frames for a scrollable center pane surrounded by up to four frozen panes.

use serde::Serialize;

use crate::types::Rect;

/// Extents reported by the frozen panes. `None` means the pane is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PaneExtents {
    /// Total height of the top pane's rows.
    pub top: Option<f64>,
    /// Total height of the bottom pane's rows.
    pub bottom: Option<f64>,
    /// Total width of the left pane's columns.
    pub left: Option<f64>,
    /// Total width of the right pane's columns.
    pub right: Option<f64>,
}

/// Computed frames, in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FivePaneFrames {
    pub center: Rect,
    pub top: Option<Rect>,
    pub bottom: Option<Rect>,
    pub left: Option<Rect>,
    pub right: Option<Rect>,
}

impl FivePaneFrames {
    /// Lay out the five panes inside a `width` x `height` container.
    ///
    /// Top and bottom panes sit between the left and right panes; left and
    /// right panes sit between the top and bottom panes; the center takes the
    /// rest. Spans that would go negative are floored at zero.
    pub fn compute(width: f64, height: f64, extents: PaneExtents) -> Self {
        let top_h = extents.top.unwrap_or(0.0);
        let bottom_h = extents.bottom.unwrap_or(0.0);
        let left_w = extents.left.unwrap_or(0.0);
        let right_w = extents.right.unwrap_or(0.0);

        let inner_w = (width - left_w - right_w).max(0.0);
        let inner_h = (height - top_h - bottom_h).max(0.0);

        Self {
            center: Rect::new(left_w, top_h, inner_w, inner_h),
            top: extents
                .top
                .map(|h| Rect::new(left_w, 0.0, inner_w, h)),
            bottom: extents
                .bottom
                .map(|h| Rect::new(left_w, height - h, inner_w, h)),
            left: extents
                .left
                .map(|w| Rect::new(0.0, top_h, w, inner_h)),
            right: extents
                .right
                .map(|w| Rect::new(width - w, top_h, w, inner_h)),
        }
    }
}

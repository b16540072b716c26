//! Zoom/pan state and device ↔ scene coordinate mapping.
//!
//! The image is aspect-fit into the container (centered, scaled by the
//! tighter axis). Zoom and pan are applied about the container centre:
//!
//! ```text
//! screen = centre + pan + zoom · (base − centre)
//! ```
//!
//! Scene coordinates are percentages of the rendered image box.

use lm_core::model::ScenePoint;
use lm_render::HitRadius;

/// An axis-aligned box in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone)]
pub struct Viewport {
    container: (f32, f32),
    natural: Option<(u32, u32)>,
    /// Aspect-fit image box at zoom 1, pan 0.
    base: ScreenRect,
    zoom: f32,
    pan: (f32, f32),
    min_zoom: f32,
    max_zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 4.0)
    }
}

impl Viewport {
    pub fn new(min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            container: (0.0, 0.0),
            natural: None,
            base: ScreenRect::default(),
            zoom: min_zoom,
            pan: (0.0, 0.0),
            min_zoom,
            max_zoom: max_zoom.max(min_zoom),
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> (f32, f32) {
        self.pan
    }

    pub fn base_box(&self) -> ScreenRect {
        self.base
    }

    /// Container resized (e.g. window resize).
    pub fn set_container(&mut self, width: f32, height: f32) {
        self.container = (width.max(0.0), height.max(0.0));
        self.recompute();
    }

    /// A new image was loaded.
    pub fn set_natural_size(&mut self, width: u32, height: u32) {
        self.natural = Some((width, height));
        self.recompute();
    }

    pub fn clear_image(&mut self) {
        self.natural = None;
        self.recompute();
        self.reset();
    }

    fn recompute(&mut self) {
        self.base = match self.natural {
            Some((nw, nh)) => aspect_fit(self.container, (nw as f32, nh as f32)),
            None => ScreenRect::default(),
        };
    }

    /// The image box as currently rendered, with zoom and pan applied.
    pub fn rendered_box(&self) -> ScreenRect {
        let (cx, cy) = (self.container.0 / 2.0, self.container.1 / 2.0);
        ScreenRect {
            left: cx + self.pan.0 + self.zoom * (self.base.left - cx),
            top: cy + self.pan.1 + self.zoom * (self.base.top - cy),
            width: self.base.width * self.zoom,
            height: self.base.height * self.zoom,
        }
    }

    /// Map a device position to scene percentages, clamped to the image box.
    /// `None` when no image is laid out.
    pub fn device_to_scene(&self, x: f32, y: f32) -> Option<ScenePoint> {
        let b = self.rendered_box();
        if b.is_empty() {
            return None;
        }
        let rx = (x - b.left).clamp(0.0, b.width);
        let ry = (y - b.top).clamp(0.0, b.height);
        Some(ScenePoint::new(rx / b.width * 100.0, ry / b.height * 100.0))
    }

    /// Inverse of [`device_to_scene`](Self::device_to_scene).
    pub fn scene_to_device(&self, p: ScenePoint) -> (f32, f32) {
        let b = self.rendered_box();
        (
            b.left + p.x / 100.0 * b.width,
            b.top + p.y / 100.0 * b.height,
        )
    }

    /// Convert a device-pixel radius into a per-axis percent radius.
    pub fn hit_radius(&self, px: f32) -> HitRadius {
        let b = self.rendered_box();
        if b.is_empty() {
            return HitRadius { x: 0.0, y: 0.0 };
        }
        HitRadius {
            x: px / b.width * 100.0,
            y: px / b.height * 100.0,
        }
    }

    /// Set zoom, clamped. Returning to minimum zoom recentres the image.
    pub fn set_zoom(&mut self, zoom: f32) {
        let zoom = if zoom.is_finite() { zoom } else { self.min_zoom };
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if self.zoom <= self.min_zoom {
            self.pan = (0.0, 0.0);
        }
    }

    pub fn zoom_by(&mut self, factor: f32) {
        if factor > 0.0 {
            self.set_zoom(self.zoom * factor);
        }
    }

    /// Pan by a device-space delta. Ignored at minimum zoom.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        if self.zoom <= self.min_zoom {
            return;
        }
        self.pan.0 += dx;
        self.pan.1 += dy;
    }

    pub fn reset(&mut self) {
        self.zoom = self.min_zoom;
        self.pan = (0.0, 0.0);
    }
}

/// Scale `natural` to fit inside `container`, centred.
pub fn aspect_fit(container: (f32, f32), natural: (f32, f32)) -> ScreenRect {
    let (cw, ch) = container;
    let (nw, nh) = natural;
    if cw <= 0.0 || ch <= 0.0 || nw <= 0.0 || nh <= 0.0 {
        return ScreenRect::default();
    }
    let scale = (cw / nw).min(ch / nh);
    let (w, h) = (nw * scale, nh * scale);
    ScreenRect {
        left: (cw - w) / 2.0,
        top: (ch - h) / 2.0,
        width: w,
        height: h,
    }
}

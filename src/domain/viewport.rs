//! Zoom and pan of the whole diagram group.
//!
//! The transform maps diagram coordinates to screen coordinates as
//! `screen = diagram * k + (x, y)`. It never touches layout or interaction
//! state.

use serde::{Deserialize, Serialize};

/// Allowed range of the zoom factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleExtent {
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ScaleExtent {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 2.0,
        }
    }
}

impl ScaleExtent {
    pub fn clamp(&self, k: f64) -> f64 {
        k.clamp(self.min_scale, self.max_scale)
    }

    pub fn is_valid(&self) -> bool {
        self.min_scale.is_finite()
            && self.max_scale.is_finite()
            && self.min_scale > 0.0
            && self.min_scale <= self.max_scale
    }
}

/// Axis-aligned rectangle `[x0, y0] - [x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Extent {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            x1: width,
            y1: height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn invert_x(&self, x: f64) -> f64 {
        (x - self.x) / self.k
    }

    pub fn invert_y(&self, y: f64) -> f64 {
        (y - self.y) / self.k
    }

    /// Translate by `(tx, ty)` in diagram units.
    pub fn translate(&self, tx: f64, ty: f64) -> Self {
        Self {
            k: self.k,
            x: self.x + self.k * tx,
            y: self.y + self.k * ty,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// SVG `transform` attribute value.
    pub fn to_svg(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Viewing state: current transform plus the bounds it must respect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    transform: ZoomTransform,
    scale_extent: ScaleExtent,
    /// visible area in screen units
    extent: Extent,
    /// area the visible region must stay within, in diagram units
    translate_extent: Extent,
}

impl Viewport {
    /// Viewport over a `width` x `height` canvas, panning bounded to the canvas.
    pub fn new(width: f64, height: f64, scale_extent: ScaleExtent) -> Self {
        Self {
            transform: ZoomTransform::IDENTITY,
            scale_extent,
            extent: Extent::new(width, height),
            translate_extent: Extent::new(width, height),
        }
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn scale_extent(&self) -> ScaleExtent {
        self.scale_extent
    }

    /// Zoom to `k` keeping the screen point `(px, py)` fixed.
    pub fn scale_to(&mut self, k: f64, px: f64, py: f64) {
        let t0 = self.transform;
        let k = self.scale_extent.clamp(k);
        let (dx, dy) = (t0.invert_x(px), t0.invert_y(py));
        let scaled = ZoomTransform {
            k,
            x: px - dx * k,
            y: py - dy * k,
        };
        self.transform = self.constrain(scaled);
    }

    /// Zoom to `k` around the centre of the visible area.
    pub fn zoom(&mut self, k: f64) {
        let (cx, cy) = self.center();
        self.scale_to(k, cx, cy);
    }

    /// Multiply the current zoom by `factor` around the visible centre.
    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom(self.transform.k * factor);
    }

    /// Pan by `(dx, dy)` screen units.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let t = self.transform;
        let moved = ZoomTransform {
            k: t.k,
            x: t.x + dx,
            y: t.y + dy,
        };
        self.transform = self.constrain(moved);
    }

    pub fn reset(&mut self) {
        self.transform = ZoomTransform::IDENTITY;
    }

    fn center(&self) -> (f64, f64) {
        (
            (self.extent.x0 + self.extent.x1) / 2.0,
            (self.extent.y0 + self.extent.y1) / 2.0,
        )
    }

    /// Shift `t` so the visible area stays inside the translate extent,
    /// centring it on an axis where it is larger than the extent.
    fn constrain(&self, t: ZoomTransform) -> ZoomTransform {
        let e = self.extent;
        let te = self.translate_extent;
        let dx0 = t.invert_x(e.x0) - te.x0;
        let dx1 = t.invert_x(e.x1) - te.x1;
        let dy0 = t.invert_y(e.y0) - te.y0;
        let dy1 = t.invert_y(e.y1) - te.y1;
        t.translate(axis_correction(dx0, dx1), axis_correction(dy0, dy1))
    }
}

fn axis_correction(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        (d0 + d1) / 2.0
    } else {
        let low = d0.min(0.0);
        if low != 0.0 {
            low
        } else {
            d1.max(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0, ScaleExtent::default())
    }

    #[test]
    fn given_zoom_beyond_extent_when_zooming_then_clamps() {
        let mut vp = viewport();
        vp.zoom(10.0);
        assert_eq!(vp.transform().k, 2.0);
        vp.zoom(0.01);
        assert_eq!(vp.transform().k, 0.5);
    }

    #[test]
    fn given_zoom_in_at_centre_when_zooming_then_centre_stays_fixed() {
        let mut vp = viewport();
        vp.zoom(2.0);
        let t = vp.transform();
        assert!((t.invert_x(400.0) - 400.0).abs() < EPS);
        assert!((t.invert_y(300.0) - 300.0).abs() < EPS);
    }

    #[test]
    fn given_identity_when_panning_then_stays_inside_canvas() {
        let mut vp = viewport();
        vp.pan(100.0, -40.0);
        assert!(vp.transform().is_identity());
    }

    #[test]
    fn given_zoomed_in_when_panning_past_edge_then_stops_at_edge() {
        let mut vp = viewport();
        vp.zoom(2.0);
        vp.pan(10_000.0, 0.0);
        let t = vp.transform();
        // left edge of the canvas pinned to the left edge of the screen
        assert!(t.invert_x(0.0).abs() < EPS);
        vp.pan(-10_000.0, 0.0);
        let t = vp.transform();
        assert!((t.invert_x(800.0) - 800.0).abs() < EPS);
    }

    #[test]
    fn given_zoomed_out_when_constrained_then_centres_canvas() {
        let mut vp = viewport();
        vp.zoom(0.5);
        let t = vp.transform();
        assert!((t.x - 200.0).abs() < EPS);
        assert!((t.y - 150.0).abs() < EPS);
    }

    #[test]
    fn given_transform_when_rendering_then_formats_svg_attribute() {
        let t = ZoomTransform {
            k: 1.5,
            x: -20.0,
            y: 10.0,
        };
        assert_eq!(t.to_svg(), "translate(-20,10) scale(1.5)");
    }

    #[test]
    fn given_invalid_extent_when_checking_then_rejects() {
        let extent = ScaleExtent {
            min_scale: 2.0,
            max_scale: 1.0,
        };
        assert!(!extent.is_valid());
        assert!(ScaleExtent::default().is_valid());
    }
}

//! Where a dropped ingredient lands inside the drop zone.

use crate::motion::Rect;

/// Snap tween into the zone.
pub const SNAP_MS: f64 = 300.0;
/// Follow-up nudge when the snap left the element off-centre.
pub const CORRECTION_MS: f64 = 200.0;

/// Pixel offset that moves `element`'s centre onto `zone`'s centre.
pub fn snap_offset(zone: &Rect, element: &Rect) -> (f64, f64) {
    let (zx, zy) = zone.center();
    let (ex, ey) = element.center();
    (zx - ex, zy - ey)
}

/// After the snap settles, an element further than a quarter of the zone's
/// width from its centre gets pulled back in.
pub fn correction(zone: &Rect, settled: &Rect) -> Option<(f64, f64)> {
    let (dx, dy) = snap_offset(zone, settled);
    (dx.hypot(dy) > zone.width / 4.0).then_some((dx, dy))
}

use glam::Vec2;

/// Bounding rectangle of an element in CSS pixels, as reported by
/// `getBoundingClientRect`.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct ClientRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

#[inline]
/// Client coordinates to element-local CSS pixels.
pub fn client_to_local(client: Vec2, rect: &ClientRect) -> Vec2 {
    Vec2::new(client.x - rect.left, client.y - rect.top)
}

#[inline]
/// Client coordinates to normalized device coordinates over `rect`
/// (+Y up). Returns `None` for a collapsed rectangle.
pub fn client_to_ndc(client: Vec2, rect: &ClientRect) -> Option<Vec2> {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return None;
    }
    let local = client_to_local(client, rect);
    Some(Vec2::new(
        (local.x / rect.width) * 2.0 - 1.0,
        1.0 - (local.y / rect.height) * 2.0,
    ))
}

#[inline]
/// Device pixel ratio clamped into `[1, max]`; non-finite ratios fall back to 1.
pub fn clamp_pixel_ratio(dpr: f64, max: f64) -> f64 {
    if dpr.is_finite() {
        dpr.clamp(1.0, max.max(1.0))
    } else {
        1.0
    }
}

#[inline]
/// Backing-store size in device pixels for a CSS size, never below `min_px`.
pub fn backing_size(css_width: f64, css_height: f64, dpr: f64, min_px: u32) -> (u32, u32) {
    let w = (css_width * dpr).round().max(0.0) as u32;
    let h = (css_height * dpr).round().max(0.0) as u32;
    (w.max(min_px), h.max(min_px))
}

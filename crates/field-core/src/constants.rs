// Shared visual/physics tuning constants used by both web and native frontends.

// Palette
pub const FIELD_CYAN: [u8; 3] = [102, 252, 241]; // #66FCF1

// Planar motion
pub const PLANAR_SPEED_SPAN: f32 = 0.5; // initial velocity components in [-span/2, span/2)
pub const PLANAR_RADIUS_MIN: f32 = 1.0;
pub const PLANAR_RADIUS_SPAN: f32 = 2.0;
pub const PLANAR_BRIGHTNESS_RISE: f32 = 0.1; // per frame while near the pointer
pub const PLANAR_BRIGHTNESS_DECAY: f32 = 0.02; // per frame otherwise

// Planar drawing
pub const EDGE_OPACITY_SCALE: f32 = 0.3;
pub const EDGE_HIGHLIGHT_GAIN: f32 = 2.0;
pub const EDGE_WIDTH: f32 = 0.5;
pub const EDGE_HIGHLIGHT_WIDTH: f32 = 1.5;
pub const GLOW_MAX_RADIUS: f32 = 20.0;
pub const GLOW_ALPHA: f32 = 0.5;
pub const NODE_HIGHLIGHT_SCALE: f32 = 1.5;

// Spherical physics
pub const ATTRACTION_GAIN: f32 = 0.08; // scales the quadratic falloff
pub const MIN_ATTRACTION_DISTANCE: f32 = 0.01; // guards normalisation

// Spherical drawing
pub const SPRITE_SIZE: f32 = 0.035; // world units, size-attenuated
pub const SPRITE_OPACITY: f32 = 0.9;
pub const LINE_OPACITY: f32 = 0.12;

// Camera
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 2000.0;

// Neighbour search: brute force below this many points, spatial hash above
pub const GRID_THRESHOLD: usize = 256;

// Frame pacing
pub const MAX_FRAME_DT_SEC: f32 = 0.1; // clamp after tab switches / stalls

#[inline]
pub fn field_cyan_unit() -> [f32; 3] {
    [
        FIELD_CYAN[0] as f32 / 255.0,
        FIELD_CYAN[1] as f32 / 255.0,
        FIELD_CYAN[2] as f32 / 255.0,
    ]
}

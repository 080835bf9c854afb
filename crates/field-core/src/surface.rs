//! 2D drawing seam for the planar field.
//!
//! The field issues a handful of primitive calls per frame; the browser
//! front-end maps them onto `CanvasRenderingContext2d`, tests record them.

use glam::Vec2;

/// Colour with 8-bit channels and a unit alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    /// Builds a colour, clamping alpha into [0, 1].
    pub fn new(rgb: [u8; 3], alpha: f32) -> Self {
        let a = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        Self {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            a,
        }
    }

    /// CSS `rgba(...)` string.
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

pub trait PlanarSurface {
    fn clear(&mut self, width: f32, height: f32);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32);
    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgba);
    /// Radial gradient disc fading from `inner` at the centre to `outer` at `radius`.
    fn fill_glow(&mut self, center: Vec2, radius: f32, inner: Rgba, outer: Rgba);
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f32,
        height: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgba,
        width: f32,
    },
    Disc {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
    Glow {
        center: Vec2,
        radius: f32,
        inner: Rgba,
        outer: Rgba,
    },
}

/// Surface that keeps every call, for headless inspection of a frame.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    pub commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    pub fn discs(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Disc { .. }))
    }

    pub fn glows(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Glow { .. }))
    }
}

impl PlanarSurface for CommandRecorder {
    fn clear(&mut self, width: f32, height: f32) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Disc {
            center,
            radius,
            color,
        });
    }

    fn fill_glow(&mut self, center: Vec2, radius: f32, inner: Rgba, outer: Rgba) {
        self.commands.push(DrawCommand::Glow {
            center,
            radius,
            inner,
            outer,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(Rgba::new([1, 2, 3], 1.7).a, 1.0);
        assert_eq!(Rgba::new([1, 2, 3], -0.2).a, 0.0);
        assert_eq!(Rgba::new([1, 2, 3], f32::NAN).a, 0.0);
    }

    #[test]
    fn css_string_formats_channels() {
        assert_eq!(
            Rgba::new([102, 252, 241], 0.5).css(),
            "rgba(102, 252, 241, 0.5)"
        );
    }

    #[test]
    fn clear_resets_recording() {
        let mut rec = CommandRecorder::default();
        rec.fill_disc(Vec2::ZERO, 1.0, Rgba::new([0, 0, 0], 1.0));
        rec.clear(10.0, 10.0);
        assert_eq!(rec.commands.len(), 1);
        assert!(matches!(rec.commands[0], DrawCommand::Clear { .. }));
    }
}

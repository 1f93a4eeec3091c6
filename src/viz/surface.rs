/// RGBA color with an alpha in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }
}

/// Axis-aligned rectangle in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Render target for the visualizer
///
/// The host implements this over its canvas or framebuffer. `size` is
/// re-read every frame, so container resizes are entirely the
/// implementation's concern; drawing outside the reported size must clip
/// rather than fail.
pub trait DrawSurface: Send {
    /// Current (width, height) in surface coordinates
    fn size(&self) -> (f32, f32);

    fn clear(&mut self);

    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    /// Fill a bar with a vertical gradient through the three stops
    fn fill_vertical_gradient(&mut self, rect: Rect, top: Rgba, mid: Rgba, bottom: Rgba);

    fn draw_label(&mut self, text: &str, x: f32, y: f32, color: Rgba);

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba);

    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgba);
}

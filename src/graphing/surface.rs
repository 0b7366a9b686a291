//! Drawing-surface capability the renderer draws on.
//!
//! The surface follows the usual 2-D canvas model: a current stroke colour and
//! fill colour, a path built from `move_to` / `line_to` and flushed by
//! `stroke_path`, filled rectangles, and bulk pixel writes for mask-based
//! equation families. Coordinates are pixels, origin top-left, y downward.
//!
//! Two implementations ship with the crate: [`RecordingSurface`] (keeps the
//! command list, used for tests and for replaying a frame) and
//! `PlottersSurface` (draws onto any plotters backend).
use crate::graphing::error::Result;

/// RGBA colour with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque colour (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same colour with opacity `alpha` in [0, 1].
    pub fn with_alpha(self, alpha: f64) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Parses `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Row-major block of pixels written in one call; transparent pixels are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::default(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: u32, y: u32, color: Rgba) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = color;
        }
    }

    /// Fills the clipped rectangle `[x, x+w) x [y, y+h)`.
    pub fn fill_block(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for row in y.min(self.height)..y_end {
            let start = row as usize * self.width as usize;
            self.pixels[start + x.min(x_end) as usize..start + x_end as usize].fill(color);
        }
    }

    /// Non-transparent pixels as `(x, y, colour)`, row-major.
    pub fn opaque_pixels(&self) -> impl Iterator<Item = (u32, u32, Rgba)> + '_ {
        let width = self.width.max(1);
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_transparent())
            .map(move |(i, c)| ((i as u32) % width, (i as u32) / width, *c))
    }

    pub fn count_opaque(&self) -> usize {
        self.pixels.iter().filter(|c| !c.is_transparent()).count()
    }
}

/// Abstract 2-D drawing context.
pub trait DrawingSurface {
    /// Pixel size of the surface.
    fn size(&self) -> (u32, u32);

    /// Paints the whole surface with `color`, discarding any pending path.
    fn clear(&mut self, color: Rgba) -> Result<()>;

    fn set_stroke_color(&mut self, color: Rgba);

    fn set_fill_color(&mut self, color: Rgba);

    /// Starts a new sub-path at (x, y).
    fn move_to(&mut self, x: f64, y: f64);

    /// Extends the current sub-path to (x, y).
    fn line_to(&mut self, x: f64, y: f64);

    /// Strokes every pending sub-path with the stroke colour and clears the path.
    fn stroke_path(&mut self) -> Result<()>;

    /// Fills a rectangle with the fill colour.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<()>;

    /// Writes a pixel block with its top-left corner at (x, y); transparent pixels are left untouched.
    fn put_pixels(&mut self, x: i32, y: i32, pixels: &PixelBuffer) -> Result<()>;
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgba),
    StrokeColor(Rgba),
    FillColor(Rgba),
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Stroke,
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    PutPixels {
        x: i32,
        y: i32,
        pixels: PixelBuffer,
    },
}

/// Surface that keeps the drawing calls of the current frame.
///
/// `clear` starts a new frame, so after a full render `commands()` holds exactly
/// that render. Two renders of unchanged state compare equal command by command.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of sub-paths stroked while the stroke colour was `color`.
    pub fn subpaths_with_color(&self, color: Rgba) -> usize {
        let mut current = None;
        let mut pending = 0;
        let mut total = 0;
        for command in &self.commands {
            match command {
                DrawCommand::StrokeColor(c) => current = Some(*c),
                DrawCommand::MoveTo(..) => pending += 1,
                DrawCommand::Stroke => {
                    if current == Some(color) {
                        total += pending;
                    }
                    pending = 0;
                }
                _ => {}
            }
        }
        total
    }

    /// Replays the recorded frame onto another surface.
    pub fn replay(&self, target: &mut dyn DrawingSurface) -> Result<()> {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(c) => target.clear(*c)?,
                DrawCommand::StrokeColor(c) => target.set_stroke_color(*c),
                DrawCommand::FillColor(c) => target.set_fill_color(*c),
                DrawCommand::MoveTo(x, y) => target.move_to(*x, *y),
                DrawCommand::LineTo(x, y) => target.line_to(*x, *y),
                DrawCommand::Stroke => target.stroke_path()?,
                DrawCommand::FillRect {
                    x,
                    y,
                    width,
                    height,
                } => target.fill_rect(*x, *y, *width, *height)?,
                DrawCommand::PutPixels { x, y, pixels } => target.put_pixels(*x, *y, pixels)?,
            }
        }
        Ok(())
    }
}

impl DrawingSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgba) -> Result<()> {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
        Ok(())
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::StrokeColor(color));
    }

    fn set_fill_color(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::FillColor(color));
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::LineTo(x, y));
    }

    fn stroke_path(&mut self) -> Result<()> {
        self.commands.push(DrawCommand::Stroke);
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn put_pixels(&mut self, x: i32, y: i32, pixels: &PixelBuffer) -> Result<()> {
        self.commands.push(DrawCommand::PutPixels {
            x,
            y,
            pixels: pixels.clone(),
        });
        Ok(())
    }
}

use tracing::info;

use crate::content::{Bitmap, Color4, Font, Glyph, ResourceKey, Resources};
use crate::error::ContractViolation;
use crate::geometry::{Aabb, IVec2};

use super::rasterizer::PointRasterizer;
use super::screen::{extent, PixelShader, PositionMode, Screen, ScreenId, SizeMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mirror {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Mirror {
    pub const NONE: Self = Self {
        horizontal: false,
        vertical: false,
    };
    pub const HORIZONTAL: Self = Self {
        horizontal: true,
        vertical: false,
    };
    pub const VERTICAL: Self = Self {
        horizontal: false,
        vertical: true,
    };
    pub const BOTH: Self = Self {
        horizontal: true,
        vertical: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectStyle {
    Filled,
    Outline,
}

/// Ordered set of virtual screens. Later screens draw over earlier ones.
#[derive(Debug)]
pub struct Compositor {
    screens: Vec<Screen>,
    window_size: (u32, u32),
}

impl Compositor {
    pub fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            screens: Vec::new(),
            window_size: (window_width, window_height),
        }
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub fn create_screen(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<ScreenId, ContractViolation> {
        if width == 0 || height == 0 {
            return Err(ContractViolation::ZeroResolution { width, height });
        }
        let id = ScreenId(self.screens.len());
        let screen = Screen::new(width, height, self.window_size);
        info!(
            screen = id.0,
            width,
            height,
            pixel_size = screen.pixel_size(),
            "screen_created"
        );
        self.screens.push(screen);
        Ok(id)
    }

    /// Recomputes pixel size, position and point positions of every screen.
    pub fn on_window_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.window_size = (width, height);
        for screen in &mut self.screens {
            screen.relayout(self.window_size);
        }
    }

    pub fn screen_count(&self) -> usize {
        self.screens.len()
    }

    pub fn screen(&self, id: ScreenId) -> Result<&Screen, ContractViolation> {
        self.screens
            .get(id.0)
            .ok_or(ContractViolation::UnknownScreen { id })
    }

    fn screen_mut(&mut self, id: ScreenId) -> Result<&mut Screen, ContractViolation> {
        self.screens
            .get_mut(id.0)
            .ok_or(ContractViolation::UnknownScreen { id })
    }

    pub fn enable_screen(&mut self, id: ScreenId) -> Result<(), ContractViolation> {
        self.screen_mut(id)?.set_enabled(true);
        Ok(())
    }

    pub fn disable_screen(&mut self, id: ScreenId) -> Result<(), ContractViolation> {
        self.screen_mut(id)?.set_enabled(false);
        Ok(())
    }

    pub fn set_size_mode(
        &mut self,
        id: ScreenId,
        mode: SizeMode,
    ) -> Result<(), ContractViolation> {
        let window_size = self.window_size;
        self.screen_mut(id)?.set_size_mode(mode, window_size);
        Ok(())
    }

    pub fn set_position_mode(
        &mut self,
        id: ScreenId,
        mode: PositionMode,
    ) -> Result<(), ContractViolation> {
        let window_size = self.window_size;
        self.screen_mut(id)?.set_position_mode(mode, window_size);
        Ok(())
    }

    /// Only takes effect while the screen is in `SizeMode::Manual`.
    pub fn set_manual_pixel_size(
        &mut self,
        id: ScreenId,
        pixel_size: u32,
    ) -> Result<(), ContractViolation> {
        if pixel_size == 0 {
            return Err(ContractViolation::ZeroPixelSize);
        }
        let window_size = self.window_size;
        let screen = self.screen_mut(id)?;
        let (width, height) = (screen.width(), screen.height());
        if extent(width, pixel_size).is_none() || extent(height, pixel_size).is_none() {
            return Err(ContractViolation::PixelSizeTooLarge {
                pixel_size,
                width,
                height,
            });
        }
        screen.set_manual_pixel_size(pixel_size, window_size);
        Ok(())
    }

    /// Only takes effect while the screen is in `PositionMode::Manual`.
    pub fn set_manual_position(
        &mut self,
        id: ScreenId,
        position: IVec2,
    ) -> Result<(), ContractViolation> {
        let window_size = self.window_size;
        self.screen_mut(id)?
            .set_manual_position(position, window_size);
        Ok(())
    }

    pub fn set_pixel_shader<F>(
        &mut self,
        id: ScreenId,
        shader: F,
    ) -> Result<(), ContractViolation>
    where
        F: Fn(Color4, i32, i32) -> Color4 + 'static,
    {
        let shader: PixelShader = Box::new(shader);
        self.screen_mut(id)?.set_shader(Some(shader));
        Ok(())
    }

    pub fn clear_pixel_shader(&mut self, id: ScreenId) -> Result<(), ContractViolation> {
        self.screen_mut(id)?.set_shader(None);
        Ok(())
    }

    pub fn clear_screen(
        &mut self,
        id: ScreenId,
        color: Color4,
    ) -> Result<(), ContractViolation> {
        self.screen_mut(id)?.clear(color);
        Ok(())
    }

    pub fn point(
        &mut self,
        id: ScreenId,
        position: IVec2,
        color: Color4,
    ) -> Result<(), ContractViolation> {
        self.screen_mut(id)?.plot(position.x, position.y, color);
        Ok(())
    }

    /// Line with both endpoints inclusive. Only the stretch whose major-axis
    /// coordinate lies on the screen is walked.
    pub fn line(
        &mut self,
        id: ScreenId,
        from: IVec2,
        to: IVec2,
        color: Color4,
    ) -> Result<(), ContractViolation> {
        let screen = self.screen_mut(id)?;
        let (x0, y0) = (i64::from(from.x), i64::from(from.y));
        let (dx, dy) = (i64::from(to.x) - x0, i64::from(to.y) - y0);
        let steps = dx.abs().max(dy.abs());
        if steps == 0 {
            screen.plot(from.x, from.y, color);
            return Ok(());
        }

        let (start, delta, extent) = if dx.abs() >= dy.abs() {
            (x0, dx, i64::from(screen.width()))
        } else {
            (y0, dy, i64::from(screen.height()))
        };
        let (first, last) = if delta > 0 {
            (-start, extent - 1 - start)
        } else {
            (start - (extent - 1), start)
        };
        for step in first.max(0)..=last.min(steps) {
            let x = x0 + line_offset(dx, step, steps);
            let y = y0 + line_offset(dy, step, steps);
            screen.plot(x as i32, y as i32, color);
        }
        Ok(())
    }

    pub fn rect(
        &mut self,
        id: ScreenId,
        rect: Aabb,
        color: Color4,
        style: RectStyle,
    ) -> Result<(), ContractViolation> {
        let screen = self.screen_mut(id)?;
        if rect.is_empty() {
            return Ok(());
        }
        match style {
            RectStyle::Filled => {
                let xmin = rect.xmin.max(0);
                let ymin = rect.ymin.max(0);
                let xmax = rect.xmax.min(screen.width() as i32 - 1);
                let ymax = rect.ymax.min(screen.height() as i32 - 1);
                for y in ymin..=ymax {
                    for x in xmin..=xmax {
                        screen.plot(x, y, color);
                    }
                }
            }
            RectStyle::Outline => {
                let xmin = rect.xmin.max(0);
                let ymin = rect.ymin.max(0);
                let xmax = rect.xmax.min(screen.width() as i32 - 1);
                let ymax = rect.ymax.min(screen.height() as i32 - 1);
                for x in xmin..=xmax {
                    screen.plot(x, rect.ymin, color);
                    screen.plot(x, rect.ymax, color);
                }
                for y in ymin..=ymax {
                    screen.plot(rect.xmin, y, color);
                    screen.plot(rect.xmax, y, color);
                }
            }
        }
        Ok(())
    }

    /// Draws sprite `index` of `sheet` with its origin at `position`.
    pub fn blit_sprite(
        &mut self,
        id: ScreenId,
        resources: &Resources,
        sheet: ResourceKey,
        index: usize,
        position: IVec2,
        mirror: Mirror,
    ) -> Result<(), ContractViolation> {
        let sprite = *resources.sprite(sheet, index)?;
        let bitmap = resources.spritesheet(sheet)?.bitmap();
        let screen = self.screen_mut(id)?;
        blit_region(
            screen,
            bitmap,
            Aabb::from_min_size(sprite.position, sprite.size),
            position - sprite.origin,
            mirror,
            None,
        );
        Ok(())
    }

    /// Draws a whole spritesheet bitmap with its bottom-left at `position`.
    pub fn blit_bitmap(
        &mut self,
        id: ScreenId,
        resources: &Resources,
        sheet: ResourceKey,
        position: IVec2,
    ) -> Result<(), ContractViolation> {
        let spritesheet = resources.spritesheet(sheet)?;
        let screen = self.screen_mut(id)?;
        blit_region(
            screen,
            spritesheet.bitmap(),
            Aabb::from_min_size(IVec2::ZERO, spritesheet.size()),
            position,
            Mirror::NONE,
            None,
        );
        Ok(())
    }

    /// Draws `text` with the first line's bottom-left at `position`. Opaque
    /// glyph pixels take `color`; `\n` starts a new line below.
    pub fn text(
        &mut self,
        id: ScreenId,
        resources: &Resources,
        font_key: ResourceKey,
        position: IVec2,
        text: &str,
        color: Color4,
    ) -> Result<(), ContractViolation> {
        let font = resources.font(font_key)?;
        check_glyphs(font, font_key, text)?;
        let screen = self.screen_mut(id)?;
        let metrics = font.metrics();
        layout_text(font, text, position, |glyph, pen| {
            blit_region(
                screen,
                font.bitmap(),
                Aabb::from_min_size(
                    IVec2::new(glyph.x, glyph.y),
                    IVec2::new(glyph.width, glyph.height),
                ),
                IVec2::new(
                    pen.x + glyph.x_offset,
                    pen.y + metrics.baseline + glyph.y_offset,
                ),
                Mirror::NONE,
                Some(color),
            );
        });
        Ok(())
    }

    /// Extent `text` would cover when drawn with `font_key`.
    pub fn text_size(
        &self,
        resources: &Resources,
        font_key: ResourceKey,
        text: &str,
    ) -> Result<IVec2, ContractViolation> {
        let font = resources.font(font_key)?;
        check_glyphs(font, font_key, text)?;
        let metrics = font.metrics();
        let mut widest = 0;
        for line in text.split('\n') {
            let mut width = 0;
            layout_text(font, line, IVec2::ZERO, |glyph, pen| {
                width = pen.x + glyph.x_advance;
            });
            widest = widest.max(width);
        }
        let lines = text.split('\n').count() as i32;
        Ok(IVec2::new(widest, lines * metrics.line_height))
    }

    /// Submits every enabled screen in creation order, then swaps.
    pub fn present(&self, rasterizer: &mut dyn PointRasterizer, clear_color: Color4) {
        rasterizer.clear(clear_color);
        self.submit_screens(rasterizer);
        rasterizer.swap();
    }

    /// One `draw_points` call per enabled screen, without clear or swap.
    pub(crate) fn submit_screens(&self, rasterizer: &mut dyn PointRasterizer) {
        for screen in self.screens.iter().filter(|screen| screen.is_enabled()) {
            rasterizer.draw_points(screen.pixels(), screen.points(), screen.pixel_size());
        }
    }
}

fn check_glyphs(font: &Font, key: ResourceKey, text: &str) -> Result<(), ContractViolation> {
    match text
        .chars()
        .find(|&character| character != '\n' && font.glyph(character).is_none())
    {
        Some(character) => Err(ContractViolation::GlyphOutOfRange { key, character }),
        None => Ok(()),
    }
}

/// Walks `text`, calling `place` with each glyph and the pen position it is
/// drawn from. Characters without a glyph are skipped.
fn layout_text<F>(font: &Font, text: &str, start: IVec2, mut place: F)
where
    F: FnMut(&Glyph, IVec2),
{
    let metrics = font.metrics();
    let mut pen = start;
    for character in text.chars() {
        if character == '\n' {
            pen = IVec2::new(start.x, pen.y - metrics.line_height);
            continue;
        }
        let Some(glyph) = font.glyph(character) else {
            continue;
        };
        place(glyph, pen);
        pen.x += glyph.x_advance + metrics.glyph_space;
    }
}

/// Copies `source` (a rect in `bitmap`) to `dest` on the screen. Alpha-keyed
/// source pixels are skipped; `tint` replaces the colour of opaque ones.
fn blit_region(
    screen: &mut Screen,
    bitmap: &Bitmap,
    source: Aabb,
    dest: IVec2,
    mirror: Mirror,
    tint: Option<Color4>,
) {
    let width = source.width();
    let height = source.height();
    for dy in 0..height {
        let sy = if mirror.vertical {
            source.ymax - dy
        } else {
            source.ymin + dy
        };
        for dx in 0..width {
            let sx = if mirror.horizontal {
                source.xmax - dx
            } else {
                source.xmin + dx
            };
            if sx < 0 || sy < 0 {
                continue;
            }
            let Some(pixel) = bitmap.get(sx as u32, sy as u32) else {
                continue;
            };
            if pixel.is_transparent() {
                continue;
            }
            screen.plot(dest.x + dx, dest.y + dy, tint.unwrap_or(pixel));
        }
    }
}

/// Offset along one axis after `step` of `steps`, rounded to the nearest pixel.
fn line_offset(delta: i64, step: i64, steps: i64) -> i64 {
    let steps = i128::from(steps);
    let magnitude = (2 * i128::from(step) * i128::from(delta.abs()) + steps) / (2 * steps);
    let magnitude = magnitude as i64;
    if delta < 0 {
        -magnitude
    } else {
        magnitude
    }
}

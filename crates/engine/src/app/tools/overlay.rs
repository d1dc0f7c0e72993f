use crate::app::rendering::{
    Compositor, PointRasterizer, PositionMode, RectStyle, ScreenId, SizeMode,
};
use crate::content::{Color4, Resources, DEBUG_GLYPH_HEIGHT};
use crate::error::ContractViolation;
use crate::geometry::{Aabb, IVec2};
use crate::time::FrequencyStats;

const OVERLAY_WIDTH: u32 = 132;
const OVERLAY_HEIGHT: u32 = 48;
const OVERLAY_PIXEL_SIZE: u32 = 2;
const OVERLAY_PADDING: i32 = 3;
const LINE_ADVANCE: i32 = DEBUG_GLYPH_HEIGHT + 2;
const OVERLAY_TEXT_PRIMARY_COLOR: Color4 = Color4::rgb(244, 248, 252);
const OVERLAY_TEXT_DIM_COLOR: Color4 = Color4::rgb(176, 198, 220);
const OVERLAY_TEXT_ALERT_COLOR: Color4 = Color4::rgb(255, 196, 64);
const OVERLAY_PANEL_BG_COLOR: Color4 = Color4::rgba(10, 12, 16, 210);
const OVERLAY_PANEL_BORDER_COLOR: Color4 = Color4::rgb(92, 106, 126);
const PERF_SECTION_LABEL: &str = "Perf";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct OverlayData {
    pub fps: f32,
    pub sim: FrequencyStats,
    pub render: FrequencyStats,
    pub sim_backlog: u64,
    pub scale: f32,
    pub paused: bool,
}

/// Timing panel drawn with the debug font on its own screen, submitted after
/// every game screen so it stays on top.
#[derive(Debug)]
pub(crate) struct PerfOverlay {
    compositor: Compositor,
    screen: ScreenId,
}

impl PerfOverlay {
    pub(crate) fn new(window_width: u32, window_height: u32) -> Result<Self, ContractViolation> {
        let mut compositor = Compositor::new(window_width, window_height);
        let screen = compositor.create_screen(OVERLAY_WIDTH, OVERLAY_HEIGHT)?;
        compositor.set_manual_pixel_size(screen, OVERLAY_PIXEL_SIZE)?;
        compositor.set_size_mode(screen, SizeMode::Manual)?;
        compositor.set_position_mode(screen, PositionMode::TopLeft)?;
        Ok(Self { compositor, screen })
    }

    pub(crate) fn on_window_resize(&mut self, width: u32, height: u32) {
        self.compositor.on_window_resize(width, height);
    }

    pub(crate) fn refresh(
        &mut self,
        resources: &Resources,
        data: &OverlayData,
    ) -> Result<(), ContractViolation> {
        let id = self.screen;
        let font = resources.debug_font_key();
        let panel = Aabb::new(0, 0, OVERLAY_WIDTH as i32 - 1, OVERLAY_HEIGHT as i32 - 1);
        self.compositor.clear_screen(id, Color4::TRANSPARENT)?;
        self.compositor
            .rect(id, panel, OVERLAY_PANEL_BG_COLOR, RectStyle::Filled)?;
        self.compositor
            .rect(id, panel, OVERLAY_PANEL_BORDER_COLOR, RectStyle::Outline)?;

        let top = OVERLAY_HEIGHT as i32 - OVERLAY_PADDING - DEBUG_GLYPH_HEIGHT;
        for (row, line) in build_overlay_lines(data).iter().enumerate() {
            let position = IVec2::new(OVERLAY_PADDING, top - row as i32 * LINE_ADVANCE);
            self.compositor
                .text(id, resources, font, position, line, overlay_line_color(line))?;
        }
        Ok(())
    }

    pub(crate) fn submit(&self, rasterizer: &mut dyn PointRasterizer) {
        self.compositor.submit_screens(rasterizer);
    }
}

fn build_overlay_lines(data: &OverlayData) -> Vec<String> {
    let mut lines = vec![
        PERF_SECTION_LABEL.to_string(),
        format!("FPS: {:.0}", data.fps),
        format_rate_line("SIM", data.sim),
        format_rate_line("REN", data.render),
        format!("Backlog: {}", data.sim_backlog),
    ];
    lines.push(if data.paused {
        format!("Scale: {:.1} PAUSED", data.scale)
    } else {
        format!("Scale: {:.1}", data.scale)
    });
    lines
}

fn overlay_line_color(line: &str) -> Color4 {
    if line == PERF_SECTION_LABEL {
        OVERLAY_TEXT_DIM_COLOR
    } else if line.ends_with("PAUSED") {
        OVERLAY_TEXT_ALERT_COLOR
    } else {
        OVERLAY_TEXT_PRIMARY_COLOR
    }
}

fn format_rate_line(label: &str, stats: FrequencyStats) -> String {
    format!(
        "{} l/a/m: {:.1}/{:.1}/{:.1} hz",
        label, stats.last_hz, stats.avg_hz, stats.max_hz
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::rendering::PointPosition;
    use crate::content::MemoryAssetSource;

    #[derive(Default)]
    struct CountingRasterizer {
        draws: Vec<(usize, u32)>,
    }

    impl PointRasterizer for CountingRasterizer {
        fn clear(&mut self, _color: Color4) {}

        fn draw_points(&mut self, colors: &[Color4], _points: &[PointPosition], point_size: u32) {
            self.draws.push((colors.len(), point_size));
        }

        fn swap(&mut self) {}
    }

    fn stats(last_hz: f32, avg_hz: f32, max_hz: f32) -> FrequencyStats {
        FrequencyStats {
            last_hz,
            avg_hz,
            max_hz,
            samples: 1,
        }
    }

    #[test]
    fn rate_line_formats_last_avg_max() {
        let line = format_rate_line("SIM", stats(59.5, 60.0, 61.3));
        assert_eq!(line, "SIM l/a/m: 59.5/60.0/61.3 hz");
    }

    #[test]
    fn lines_report_scale_and_pause() {
        let data = OverlayData {
            fps: 143.6,
            sim_backlog: 4,
            scale: 0.5,
            paused: true,
            ..OverlayData::default()
        };
        let lines = build_overlay_lines(&data);

        assert_eq!(lines[0], "Perf");
        assert_eq!(lines[1], "FPS: 144");
        assert_eq!(lines[4], "Backlog: 4");
        assert_eq!(lines[5], "Scale: 0.5 PAUSED");
        assert_eq!(overlay_line_color(&lines[5]), OVERLAY_TEXT_ALERT_COLOR);
        assert_eq!(overlay_line_color(&lines[0]), OVERLAY_TEXT_DIM_COLOR);
    }

    #[test]
    fn lines_fit_the_overlay_screen() {
        let resources = Resources::new(MemoryAssetSource::new());
        let compositor = Compositor::new(800, 600);
        let data = OverlayData {
            fps: 999.0,
            sim: stats(999.9, 999.9, 999.9),
            render: stats(999.9, 999.9, 999.9),
            sim_backlog: 99_999,
            scale: 10.0,
            paused: true,
        };
        for line in build_overlay_lines(&data) {
            let size = compositor
                .text_size(&resources, resources.debug_font_key(), &line)
                .expect("measure");
            assert!(size.x + OVERLAY_PADDING * 2 <= OVERLAY_WIDTH as i32, "{line}");
        }
    }

    #[test]
    fn refresh_draws_panel_and_text_pinned_top_left() {
        let resources = Resources::new(MemoryAssetSource::new());
        let mut overlay = PerfOverlay::new(800, 600).expect("overlay");
        overlay
            .refresh(&resources, &OverlayData::default())
            .expect("refresh");

        let screen = overlay.compositor.screen(overlay.screen).expect("screen");
        assert_eq!(screen.pixel_size(), OVERLAY_PIXEL_SIZE);
        assert_eq!(screen.position(), IVec2::new(0, 600 - 96));
        assert_eq!(screen.get(0, 0), Some(OVERLAY_PANEL_BORDER_COLOR));
        assert_eq!(screen.get(1, 1), Some(OVERLAY_PANEL_BG_COLOR));
        assert!(screen
            .pixels()
            .iter()
            .any(|px| *px == OVERLAY_TEXT_PRIMARY_COLOR));

        let mut rasterizer = CountingRasterizer::default();
        overlay.submit(&mut rasterizer);
        assert_eq!(
            rasterizer.draws,
            vec![((OVERLAY_WIDTH * OVERLAY_HEIGHT) as usize, OVERLAY_PIXEL_SIZE)]
        );
    }
}

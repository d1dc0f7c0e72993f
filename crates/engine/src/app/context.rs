use tracing::info;

use crate::collision::{test_collision, CollisionResult, CollisionSubject};
use crate::config::EngineConfig;
use crate::content::{AssetSource, Color4, ResourceKey, Resources};
use crate::error::ContractViolation;
use crate::geometry::IVec2;
use crate::time::{ClockPair, FrequencyStats};

use super::input::{InputSnapshot, TimingControl};
use super::rendering::{Compositor, Mirror, PointRasterizer, ScreenId};
use super::tools::{OverlayData, PerfOverlay};

/// Game-layer hooks driven by the loop. `update` runs once per simulation
/// tick with the fixed tick period in seconds; `draw` runs once per render
/// tick, before the screens are presented.
pub trait Game {
    fn load(&mut self, engine: &mut Engine);
    fn update(&mut self, dt_seconds: f32, input: &InputSnapshot, engine: &mut Engine);
    fn draw(&mut self, engine: &mut Engine);
    fn unload(&mut self, _engine: &mut Engine) {}
}

/// Ticker state as of the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimingStats {
    pub sim: FrequencyStats,
    pub render: FrequencyStats,
    pub sim_backlog: u64,
    pub render_backlog: u64,
    pub sim_ticks_total: u64,
    pub render_ticks_total: u64,
}

/// Everything a game touches: clocks, cached resources and screens.
#[derive(Debug)]
pub struct Engine {
    clocks: ClockPair,
    resources: Resources,
    compositor: Compositor,
    overlay: PerfOverlay,
    overlay_visible: bool,
    clear_color: Color4,
    timing: TimingStats,
    quit_requested: bool,
}

impl Engine {
    pub fn new(
        config: &EngineConfig,
        source: impl AssetSource + 'static,
    ) -> Result<Self, ContractViolation> {
        let mut clocks = ClockPair::new();
        clocks.game.set_scale(config.time_scale);
        Ok(Self {
            clocks,
            resources: Resources::new(source),
            compositor: Compositor::new(config.window_width, config.window_height),
            overlay: PerfOverlay::new(config.window_width, config.window_height)?,
            overlay_visible: false,
            clear_color: config.clear_color,
            timing: TimingStats::default(),
            quit_requested: false,
        })
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    pub fn clocks(&self) -> &ClockPair {
        &self.clocks
    }

    pub(crate) fn clocks_mut(&mut self) -> &mut ClockPair {
        &mut self.clocks
    }

    pub fn create_screen(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<ScreenId, ContractViolation> {
        self.compositor.create_screen(width, height)
    }

    pub fn blit_sprite(
        &mut self,
        screen: ScreenId,
        sheet: ResourceKey,
        index: usize,
        position: IVec2,
        mirror: Mirror,
    ) -> Result<(), ContractViolation> {
        self.compositor
            .blit_sprite(screen, &self.resources, sheet, index, position, mirror)
    }

    pub fn blit_bitmap(
        &mut self,
        screen: ScreenId,
        sheet: ResourceKey,
        position: IVec2,
    ) -> Result<(), ContractViolation> {
        self.compositor
            .blit_bitmap(screen, &self.resources, sheet, position)
    }

    pub fn text(
        &mut self,
        screen: ScreenId,
        font: ResourceKey,
        position: IVec2,
        text: &str,
        color: Color4,
    ) -> Result<(), ContractViolation> {
        self.compositor
            .text(screen, &self.resources, font, position, text, color)
    }

    pub fn text_size(&self, font: ResourceKey, text: &str) -> Result<IVec2, ContractViolation> {
        self.compositor.text_size(&self.resources, font, text)
    }

    pub fn test_collision(
        &self,
        a: &CollisionSubject,
        b: &CollisionSubject,
        want_full_pixel_list: bool,
    ) -> Result<CollisionResult, ContractViolation> {
        test_collision(&self.resources, a, b, want_full_pixel_list)
    }

    pub fn time_scale(&self) -> f32 {
        self.clocks.game.scale()
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.clocks.game.set_scale(scale);
        info!(scale = self.clocks.game.scale(), "time_scale_changed");
    }

    pub fn increment_time_scale(&mut self) {
        self.clocks.game.increment_scale();
        info!(scale = self.clocks.game.scale(), "time_scale_changed");
    }

    pub fn decrement_time_scale(&mut self) {
        self.clocks.game.decrement_scale();
        info!(scale = self.clocks.game.scale(), "time_scale_changed");
    }

    pub fn reset_time_scale(&mut self) {
        self.clocks.game.reset_scale();
        info!(scale = self.clocks.game.scale(), "time_scale_changed");
    }

    pub fn is_paused(&self) -> bool {
        self.clocks.game.is_paused()
    }

    pub fn pause(&mut self) {
        self.clocks.game.pause();
        info!(paused = true, "pause_changed");
    }

    pub fn unpause(&mut self) {
        self.clocks.game.unpause();
        info!(paused = false, "pause_changed");
    }

    pub fn toggle_pause(&mut self) {
        self.clocks.game.toggle_pause();
        info!(paused = self.clocks.game.is_paused(), "pause_changed");
    }

    pub fn is_overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn set_overlay_visible(&mut self, visible: bool) {
        self.overlay_visible = visible;
        info!(overlay_visible = visible, "overlay_toggled");
    }

    pub fn toggle_overlay(&mut self) {
        self.set_overlay_visible(!self.overlay_visible);
    }

    pub fn clear_color(&self) -> Color4 {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color4) {
        self.clear_color = color;
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn timing_stats(&self) -> TimingStats {
        self.timing
    }

    pub(crate) fn set_timing_stats(&mut self, timing: TimingStats) {
        self.timing = timing;
    }

    pub(crate) fn apply_timing_control(&mut self, control: TimingControl) {
        match control {
            TimingControl::ScaleUp => self.increment_time_scale(),
            TimingControl::ScaleDown => self.decrement_time_scale(),
            TimingControl::ScaleReset => self.reset_time_scale(),
            TimingControl::TogglePause => self.toggle_pause(),
            TimingControl::ToggleOverlay => self.toggle_overlay(),
        }
    }

    pub(crate) fn on_window_resize(&mut self, width: u32, height: u32) {
        self.compositor.on_window_resize(width, height);
        self.overlay.on_window_resize(width, height);
    }

    pub(crate) fn refresh_overlay(&mut self, fps: f32) -> Result<(), ContractViolation> {
        if !self.overlay_visible {
            return Ok(());
        }
        let data = OverlayData {
            fps,
            sim: self.timing.sim,
            render: self.timing.render,
            sim_backlog: self.timing.sim_backlog,
            scale: self.clocks.game.scale(),
            paused: self.clocks.game.is_paused(),
        };
        self.overlay.refresh(&self.resources, &data)
    }

    /// Clears, submits every enabled game screen then the overlay, and swaps.
    pub fn present(&self, rasterizer: &mut dyn PointRasterizer) {
        rasterizer.clear(self.clear_color);
        self.compositor.submit_screens(rasterizer);
        if self.overlay_visible {
            self.overlay.submit(rasterizer);
        }
        rasterizer.swap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::rendering::PointPosition;
    use crate::content::MemoryAssetSource;

    #[derive(Default)]
    struct RecordingRasterizer {
        calls: Vec<String>,
    }

    impl PointRasterizer for RecordingRasterizer {
        fn clear(&mut self, color: Color4) {
            self.calls.push(format!("clear {}", color.b));
        }

        fn draw_points(&mut self, colors: &[Color4], _points: &[PointPosition], point_size: u32) {
            self.calls.push(format!("draw {} @{}", colors.len(), point_size));
        }

        fn swap(&mut self) {
            self.calls.push("swap".to_string());
        }
    }

    fn engine() -> Engine {
        let config = EngineConfig {
            clear_color: Color4::rgb(0, 0, 9),
            time_scale: 2.0,
            ..EngineConfig::default()
        };
        Engine::new(&config, MemoryAssetSource::new()).expect("engine")
    }

    #[test]
    fn config_seeds_scale_and_clear_colour() {
        let engine = engine();
        assert!((engine.time_scale() - 2.0).abs() < 1e-6);
        assert_eq!(engine.clear_color(), Color4::rgb(0, 0, 9));
        assert!(!engine.is_overlay_visible());
    }

    #[test]
    fn timing_controls_drive_the_game_clock() {
        let mut engine = engine();

        engine.apply_timing_control(TimingControl::ScaleDown);
        assert!((engine.time_scale() - 1.9).abs() < 1e-4);
        engine.apply_timing_control(TimingControl::ScaleReset);
        assert!((engine.time_scale() - 1.0).abs() < 1e-6);
        engine.apply_timing_control(TimingControl::ScaleUp);
        assert!((engine.time_scale() - 1.1).abs() < 1e-4);

        engine.apply_timing_control(TimingControl::TogglePause);
        assert!(engine.is_paused());
        engine.apply_timing_control(TimingControl::TogglePause);
        assert!(!engine.is_paused());

        engine.apply_timing_control(TimingControl::ToggleOverlay);
        assert!(engine.is_overlay_visible());
    }

    #[test]
    fn present_draws_overlay_last_only_when_visible() {
        let mut engine = engine();
        engine.create_screen(224, 256).expect("screen");

        let mut hidden = RecordingRasterizer::default();
        engine.present(&mut hidden);
        assert_eq!(hidden.calls, vec!["clear 9", "draw 57344 @2", "swap"]);

        engine.set_overlay_visible(true);
        engine.refresh_overlay(60.0).expect("overlay");
        let mut shown = RecordingRasterizer::default();
        engine.present(&mut shown);
        assert_eq!(shown.calls.len(), 4);
        assert_eq!(shown.calls[1], "draw 57344 @2");
        assert!(shown.calls[2].ends_with("@2"));
        assert_eq!(shown.calls[3], "swap");
    }

    #[test]
    fn resize_reaches_game_screens() {
        let mut engine = engine();
        let id = engine.create_screen(224, 256).expect("screen");
        engine.on_window_resize(1920, 1080);
        assert_eq!(engine.compositor().screen(id).expect("screen").pixel_size(), 4);
    }

    #[test]
    fn quit_request_is_sticky() {
        let mut engine = engine();
        assert!(!engine.is_quit_requested());
        engine.request_quit();
        assert!(engine.is_quit_requested());
    }
}

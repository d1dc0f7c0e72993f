use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::PhysicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Fullscreen, WindowBuilder};

use crate::config::EngineConfig;
use crate::content::AssetSource;
use crate::error::{ContractViolation, ErrorKind};

use super::context::{Engine, Game};
use super::frame::FrameDriver;
use super::input::InputCollector;
use super::metrics::MetricsHandle;
use super::rendering::WindowSurface;

pub const SLOW_FRAME_ENV_VAR: &str = "PIXELCADE_SLOW_FRAME_MS";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize pixel surface: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("failed to set up engine: {0}")]
    Engine(#[from] ContractViolation),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Engine(violation) => violation.kind(),
            _ => ErrorKind::Environment,
        }
    }
}

pub fn run_app<G>(
    title: &str,
    config: EngineConfig,
    source: impl AssetSource + 'static,
    game: G,
) -> Result<(), AppError>
where
    G: Game,
{
    run_app_with_metrics(title, config, source, game, MetricsHandle::default())
}

pub fn run_app_with_metrics<G>(
    title: &str,
    config: EngineConfig,
    source: impl AssetSource + 'static,
    mut game: G,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError>
where
    G: Game,
{
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let mut builder = WindowBuilder::new()
        .with_title(title)
        .with_inner_size(PhysicalSize::new(config.window_width, config.window_height));
    if config.fullscreen {
        builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    let window = Arc::new(builder.build(&event_loop).map_err(AppError::CreateWindow)?);
    let mut surface = WindowSurface::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;
    let (width, height) = surface.size();

    let mut engine = Engine::new(&config, source)?;
    engine.on_window_resize(width, height);
    let mut input = InputCollector::new(width, height);

    event_loop.set_control_flow(ControlFlow::Poll);

    let frame_floor = config.frame_floor();
    let slow_frame_delay = resolve_slow_frame_delay();
    info!(
        width,
        height,
        fullscreen = config.fullscreen,
        frame_floor_ms = frame_floor.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        "loop_config"
    );

    game.load(&mut engine);
    info!(
        spritesheets = engine.resources().loaded_count(),
        screens = engine.compositor().screen_count(),
        "game_loaded"
    );
    let mut driver = FrameDriver::new(&config, &mut engine, metrics_handle, Instant::now());

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        input.mark_quit_requested();
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = resize(&mut surface, &mut engine, &mut input, new_size)
                        {
                            warn!(error = %error, "surface_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window.inner_size();
                        if let Err(error) = resize(&mut surface, &mut engine, &mut input, size) {
                            warn!(error = %error, "surface_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input.handle_keyboard_input(&event);
                        if input.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if slow_frame_delay > Duration::ZERO {
                            // Debug perturbation for exercising catch-up, not a frame cap.
                            thread::sleep(slow_frame_delay);
                        }

                        let frame_start = Instant::now();
                        let report =
                            driver.run_frame(frame_start, &mut engine, &mut game, &mut input);
                        if report.sim.backlog > 0 {
                            debug!(
                                sim_executed = report.sim.executed,
                                sim_backlog = report.sim.backlog,
                                render_executed = report.render.executed,
                                "frame_behind"
                            );
                        }
                        if report.present {
                            if let Err(error) = surface.present(&engine) {
                                warn!(error = %error, "surface_present_failed");
                                window_target.exit();
                            }
                        }
                        if engine.is_quit_requested() {
                            info!(reason = "game_request", "shutdown_requested");
                            window_target.exit();
                        }

                        let floor_sleep = compute_floor_sleep(frame_start.elapsed(), frame_floor);
                        if floor_sleep > Duration::ZERO {
                            thread::sleep(floor_sleep);
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                game.unload(&mut engine);
                let timing = engine.timing_stats();
                info!(
                    sim_ticks_total = timing.sim_ticks_total,
                    render_ticks_total = timing.render_ticks_total,
                    "shutdown"
                );
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn resize(
    surface: &mut WindowSurface,
    engine: &mut Engine,
    input: &mut InputCollector,
    size: PhysicalSize<u32>,
) -> Result<(), PixelsError> {
    surface.resize(size.width, size.height)?;
    engine.on_window_resize(size.width, size.height);
    input.set_window_size(size.width, size.height);
    Ok(())
}

fn compute_floor_sleep(elapsed: Duration, floor: Duration) -> Duration {
    floor.saturating_sub(elapsed)
}

fn resolve_slow_frame_delay() -> Duration {
    slow_frame_delay_from(env::var(SLOW_FRAME_ENV_VAR))
}

fn slow_frame_delay_from(raw: Result<String, env::VarError>) -> Duration {
    match raw {
        Ok(value) => match value.trim().parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-frame env var value; ignoring"
                );
                Duration::ZERO
            }
        },
        Err(env::VarError::NotPresent) => Duration::ZERO,
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; ignoring"
            );
            Duration::ZERO
        }
    }
}

use engine::{
    enforce, CollisionSubject, Color4, Engine, Game, IVec2, InputAction, InputSnapshot, Mirror,
    ResourceKey, ScreenId,
};
use tracing::{info, warn};

const SCREEN_WIDTH: u32 = 224;
const SCREEN_HEIGHT: u32 = 256;
const SHIP_SHEET: &str = "ships";
const HUD_FONT: &str = "hud";
const PLAYER_SPRITE: usize = 0;
const TARGET_SPRITE: usize = 1;
const PLAYER_SPEED_PX_PER_SECOND: f32 = 90.0;
const PLAYER_SPAWN: (f32, f32) = (104.0, 24.0);
const TARGET_POSITION: IVec2 = IVec2::new(104, 200);
const BACKGROUND_COLOR: Color4 = Color4::rgb(8, 8, 24);
const HUD_COLOR: Color4 = Color4::rgb(220, 220, 220);
const HIT_COLOR: Color4 = Color4::YELLOW;
const HUD_MARGIN: i32 = 2;

/// Handles acquired in `load`.
#[derive(Debug, Clone, Copy)]
struct Stage {
    screen: ScreenId,
    sheet: ResourceKey,
    font: ResourceKey,
    target_sprite: usize,
}

/// Minimal shooter-shaped demo: one ship moved by input, one stationary
/// target tested pixel-for-pixel against it every tick.
#[derive(Debug)]
pub(crate) struct DemoGame {
    stage: Option<Stage>,
    player_x: f32,
    player_y: f32,
    mirror: Mirror,
    shots: u32,
    overlap_pixels: usize,
}

impl DemoGame {
    pub(crate) fn new() -> Self {
        Self {
            stage: None,
            player_x: PLAYER_SPAWN.0,
            player_y: PLAYER_SPAWN.1,
            mirror: Mirror::NONE,
            shots: 0,
            overlap_pixels: 0,
        }
    }

    fn player_position(&self) -> IVec2 {
        IVec2::new(self.player_x.round() as i32, self.player_y.round() as i32)
    }

    fn move_player(
        &mut self,
        stage: &Stage,
        dt_seconds: f32,
        input: &InputSnapshot,
        engine: &Engine,
    ) {
        let mut dx = 0.0;
        let mut dy = 0.0;
        if input.is_down(InputAction::MoveLeft) {
            dx -= 1.0;
        }
        if input.is_down(InputAction::MoveRight) {
            dx += 1.0;
        }
        if input.is_down(InputAction::MoveDown) {
            dy -= 1.0;
        }
        if input.is_down(InputAction::MoveUp) {
            dy += 1.0;
        }

        let step = PLAYER_SPEED_PX_PER_SECOND * dt_seconds;
        let size = engine
            .resources()
            .sprite_size(stage.sheet, PLAYER_SPRITE)
            .unwrap_or(IVec2::ZERO);
        let max_x = (SCREEN_WIDTH as i32 - size.x).max(0) as f32;
        let max_y = (SCREEN_HEIGHT as i32 - size.y).max(0) as f32;
        self.player_x = (self.player_x + dx * step).clamp(0.0, max_x);
        self.player_y = (self.player_y + dy * step).clamp(0.0, max_y);
    }
}

impl Game for DemoGame {
    fn load(&mut self, engine: &mut Engine) {
        let sheet = engine.resources_mut().load_spritesheet(SHIP_SHEET);
        let font = engine.resources_mut().load_font(HUD_FONT);
        if engine.resources().is_error_resource(sheet) {
            warn!(name = SHIP_SHEET, "demo_using_error_spritesheet");
        }
        let sprite_count = engine.resources().sprite_count(sheet).unwrap_or(1);
        let target_sprite = if sprite_count > TARGET_SPRITE {
            TARGET_SPRITE
        } else {
            PLAYER_SPRITE
        };

        let Some(screen) = enforce(engine.create_screen(SCREEN_WIDTH, SCREEN_HEIGHT)) else {
            return;
        };
        info!(
            sheet = sheet.0,
            font = font.0,
            target_sprite,
            "demo_loaded"
        );
        self.stage = Some(Stage {
            screen,
            sheet,
            font,
            target_sprite,
        });
    }

    fn update(&mut self, dt_seconds: f32, input: &InputSnapshot, engine: &mut Engine) {
        if input.is_down(InputAction::Quit) {
            engine.request_quit();
            return;
        }
        let Some(stage) = self.stage else {
            return;
        };

        self.move_player(&stage, dt_seconds, input, engine);
        if input.fire_pressed() {
            self.shots += 1;
            self.mirror = if self.mirror == Mirror::NONE {
                Mirror::HORIZONTAL
            } else {
                Mirror::NONE
            };
        }

        let player = CollisionSubject::new(self.player_position(), stage.sheet, PLAYER_SPRITE);
        let target = CollisionSubject::new(TARGET_POSITION, stage.sheet, stage.target_sprite);
        let result = enforce(engine.test_collision(&player, &target, true));
        self.overlap_pixels = result.map_or(0, |hit| hit.collision_count());
    }

    fn draw(&mut self, engine: &mut Engine) {
        let Some(Stage {
            screen,
            sheet,
            font,
            target_sprite,
        }) = self.stage
        else {
            return;
        };

        enforce(engine.compositor_mut().clear_screen(screen, BACKGROUND_COLOR));
        enforce(engine.blit_sprite(
            screen,
            sheet,
            target_sprite,
            TARGET_POSITION,
            Mirror::NONE,
        ));
        enforce(engine.blit_sprite(
            screen,
            sheet,
            PLAYER_SPRITE,
            self.player_position(),
            self.mirror,
        ));

        let hud = format!("SHOTS {}", self.shots);
        let hud_height = enforce(engine.text_size(font, &hud)).map_or(0, |size| size.y);
        let hud_position = IVec2::new(HUD_MARGIN, SCREEN_HEIGHT as i32 - HUD_MARGIN - hud_height);
        enforce(engine.text(screen, font, hud_position, &hud, HUD_COLOR));

        if self.overlap_pixels > 0 {
            let label = format!("HIT {}", self.overlap_pixels);
            enforce(engine.text(
                screen,
                font,
                IVec2::new(HUD_MARGIN, HUD_MARGIN),
                &label,
                HIT_COLOR,
            ));
        }
    }

    fn unload(&mut self, engine: &mut Engine) {
        if let Some(stage) = self.stage.take() {
            engine.resources_mut().unload_spritesheet(stage.sheet);
            engine.resources_mut().unload_font(stage.font);
        }
        info!(shots = self.shots, "demo_unloaded");
    }
}

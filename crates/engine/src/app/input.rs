use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Fire,
    Quit,
}

const ACTION_COUNT: usize = 6;

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Fire => 4,
            InputAction::Quit => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

/// Engine-level keys handled before the game sees input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingControl {
    ScaleUp,
    ScaleDown,
    ScaleReset,
    TogglePause,
    ToggleOverlay,
}

const CONTROL_COUNT: usize = 5;

impl TimingControl {
    const fn index(self) -> usize {
        match self {
            TimingControl::ScaleUp => 0,
            TimingControl::ScaleDown => 1,
            TimingControl::ScaleReset => 2,
            TimingControl::TogglePause => 3,
            TimingControl::ToggleOverlay => 4,
        }
    }

    fn from_key(key: PhysicalKey) -> Option<Self> {
        match key {
            PhysicalKey::Code(KeyCode::Equal) | PhysicalKey::Code(KeyCode::NumpadAdd) => {
                Some(TimingControl::ScaleUp)
            }
            PhysicalKey::Code(KeyCode::Minus) | PhysicalKey::Code(KeyCode::NumpadSubtract) => {
                Some(TimingControl::ScaleDown)
            }
            PhysicalKey::Code(KeyCode::Digit0) | PhysicalKey::Code(KeyCode::Numpad0) => {
                Some(TimingControl::ScaleReset)
            }
            PhysicalKey::Code(KeyCode::KeyP) => Some(TimingControl::TogglePause),
            PhysicalKey::Code(KeyCode::F3) => Some(TimingControl::ToggleOverlay),
            _ => None,
        }
    }
}

/// Input as seen by one simulation tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
    fire_pressed: bool,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_fire_pressed(mut self, fire_pressed: bool) -> Self {
        self.fire_pressed = fire_pressed;
        self
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// True only on the first tick after the fire key went down.
    pub fn fire_pressed(&self) -> bool {
        self.fire_pressed
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    pub(crate) quit_requested: bool,
    actions: ActionStates,
    fire_pressed_edge: bool,
    controls_down: [bool; CONTROL_COUNT],
    pending_controls: Vec<TimingControl>,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    pub(crate) fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    pub(crate) fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    pub(crate) fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.handle_physical_key(key_event.physical_key, is_pressed);
    }

    pub(crate) fn handle_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        if let Some(control) = TimingControl::from_key(key) {
            let was_down = self.controls_down[control.index()];
            if is_pressed && !was_down {
                self.pending_controls.push(control);
            }
            self.controls_down[control.index()] = is_pressed;
            return;
        }

        let action = match key {
            PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
                InputAction::MoveUp
            }
            PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
                InputAction::MoveDown
            }
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                InputAction::MoveLeft
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                InputAction::MoveRight
            }
            PhysicalKey::Code(KeyCode::Space) => InputAction::Fire,
            PhysicalKey::Code(KeyCode::Escape) => InputAction::Quit,
            _ => return,
        };

        if action == InputAction::Fire && is_pressed && !self.actions.is_down(action) {
            self.fire_pressed_edge = true;
        }
        if action == InputAction::Quit && is_pressed {
            self.mark_quit_requested();
        }
        self.actions.set(action, is_pressed);
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    pub(crate) fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot {
            actions: self.actions,
            fire_pressed: self.fire_pressed_edge,
            window_width: self.window_width,
            window_height: self.window_height,
        };
        self.fire_pressed_edge = false;
        snapshot
    }

    pub(crate) fn take_timing_controls(&mut self) -> Vec<TimingControl> {
        std::mem::take(&mut self.pending_controls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> PhysicalKey {
        PhysicalKey::Code(code)
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut input = InputCollector::default();

        input.handle_physical_key(key(KeyCode::KeyW), true);
        input.handle_physical_key(key(KeyCode::ArrowLeft), true);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = InputCollector::default();
        input.handle_physical_key(key(KeyCode::KeyD), true);
        input.handle_physical_key(key(KeyCode::KeyD), false);

        assert!(!input.snapshot_for_tick().is_down(InputAction::MoveRight));
    }

    #[test]
    fn fire_press_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::new(800, 600);

        input.handle_physical_key(key(KeyCode::Space), true);
        let first = input.snapshot_for_tick();
        input.handle_physical_key(key(KeyCode::Space), true);
        let second = input.snapshot_for_tick();
        input.handle_physical_key(key(KeyCode::Space), false);
        input.handle_physical_key(key(KeyCode::Space), true);
        let third = input.snapshot_for_tick();

        assert!(first.fire_pressed());
        assert!(second.is_down(InputAction::Fire));
        assert!(!second.fire_pressed());
        assert!(third.fire_pressed());
        assert_eq!(third.window_size(), (800, 600));
    }

    #[test]
    fn timing_keys_queue_once_per_press() {
        let mut input = InputCollector::default();

        input.handle_physical_key(key(KeyCode::Equal), true);
        input.handle_physical_key(key(KeyCode::Equal), true);
        input.handle_physical_key(key(KeyCode::KeyP), true);
        input.handle_physical_key(key(KeyCode::F3), true);
        input.handle_physical_key(key(KeyCode::Digit0), true);
        input.handle_physical_key(key(KeyCode::Minus), true);

        assert_eq!(
            input.take_timing_controls(),
            vec![
                TimingControl::ScaleUp,
                TimingControl::TogglePause,
                TimingControl::ToggleOverlay,
                TimingControl::ScaleReset,
                TimingControl::ScaleDown,
            ]
        );
        assert!(input.take_timing_controls().is_empty());

        input.handle_physical_key(key(KeyCode::Equal), false);
        input.handle_physical_key(key(KeyCode::Equal), true);
        assert_eq!(input.take_timing_controls(), vec![TimingControl::ScaleUp]);
    }

    #[test]
    fn timing_keys_do_not_reach_game_actions() {
        let mut input = InputCollector::default();
        input.handle_physical_key(key(KeyCode::KeyP), true);
        let snapshot = input.snapshot_for_tick();
        assert!(!snapshot.is_down(InputAction::Fire));
        assert!(!snapshot.fire_pressed());
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::default();
        input.handle_physical_key(key(KeyCode::Escape), true);
        assert!(input.quit_requested);
    }

    #[test]
    fn snapshot_builders_set_state() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveDown, true)
            .with_fire_pressed(true);
        assert!(snapshot.is_down(InputAction::MoveDown));
        assert!(snapshot.fire_pressed());
    }
}

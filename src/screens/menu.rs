//=========================================================================
// Main Menu Screen
//=========================================================================
//
// Two-item menu (Play, Exit) driven by keyboard, pointer, gamepad or GUI
// clicks.
//
// Flow:
//   attach_controls() (first time) → fade in 1500 ms → select item 0
//   MOVE_UP / MOVE_DOWN → selection wraps around the item list
//   ACTIVATE or click → hide menu → fade out 1000 ms → on_play / on_exit
//
// Fades run as timers on the scene timeline; their completion comes back
// through a channel and is handled on the next update.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::f32::consts::PI;
use std::rc::Rc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::Screen;
use crate::core::{
    host::{GuiLayer, HostEngine},
    input::{
        ActionContext, ActionHandler, ActionListItem, ActionTarget, GamepadManager, InputAction,
        InputProcessor, RawInputEvent, SharedInputManager,
    },
    observable::Observable,
    scene::Scene,
    timeline::{Timer, TimerHandle},
};

//=== Constants ===========================================================

const FADE_IN: Duration = Duration::from_millis(1500);
const FADE_OUT: Duration = Duration::from_millis(1000);

const ACTIONS: [ActionListItem; 6] = [
    ActionListItem::bounced(InputAction::Activate),
    ActionListItem::bounced(InputAction::MoveUp),
    ActionListItem::bounced(InputAction::MoveDown),
    ActionListItem::bounced(InputAction::MoveRight),
    ActionListItem::bounced(InputAction::MoveLeft),
    ActionListItem::bounced(InputAction::GoBack),
];

//=== MenuItem ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Play,
    Exit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::Play, MenuItem::Exit];

    pub fn title(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Exit => "Exit",
        }
    }

    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

enum MenuEvent {
    EnterFinished,
    LeaveFinished(MenuItem),
}

//=== MenuState ===========================================================

/// Input-facing state of the menu.
#[derive(Debug)]
pub struct MenuState {
    selected_index: i32,
    item_count: usize,
    selection_changed: bool,
    clicks: Vec<usize>,
}

impl MenuState {
    fn new(item_count: usize) -> Self {
        Self {
            selected_index: -1,
            item_count,
            selection_changed: false,
            clicks: Vec::new(),
        }
    }

    pub fn selected_index(&self) -> i32 {
        self.selected_index
    }

    /// Item under the selector, if any is selected.
    pub fn selected_item(&self) -> Option<usize> {
        usize::try_from(self.selected_index)
            .ok()
            .filter(|&i| i < self.item_count)
    }

    /// Sets the selection, wrapping around both ends of the list.
    pub fn set_selected_index(&mut self, index: i32) {
        self.selected_index = repeat(index, self.item_count);
        self.selection_changed = true;
    }

    //--- Action Handlers --------------------------------------------------

    fn move_up(&mut self, context: ActionContext, _event: &RawInputEvent) -> bool {
        debug!("MOVE_UP");
        if !context.prior_state {
            self.set_selected_index(self.selected_index - 1);
        }
        true
    }

    fn move_down(&mut self, context: ActionContext, _event: &RawInputEvent) -> bool {
        if !context.prior_state {
            self.set_selected_index(self.selected_index + 1);
            debug!("MOVE_DOWN {}", self.selected_index);
        }
        context.prior_state
    }

    fn activate(&mut self, context: ActionContext, _event: &RawInputEvent) -> bool {
        if !context.prior_state {
            debug!("ACTIVATE - {}", self.selected_index);
            if let Some(item) = self.selected_item() {
                self.clicks.push(item);
            }
        }
        true
    }

    fn go_back(&mut self, _context: ActionContext, _event: &RawInputEvent) -> bool {
        false
    }
}

impl ActionTarget for MenuState {
    fn action_handler(action: InputAction) -> Option<ActionHandler<Self>> {
        match action {
            InputAction::Activate => Some(Self::activate),
            InputAction::MoveUp => Some(Self::move_up),
            InputAction::MoveDown => Some(Self::move_down),
            InputAction::GoBack => Some(Self::go_back),
            _ => None,
        }
    }
}

//=== MenuScreen ==========================================================

pub struct MenuScreen {
    scene: Rc<Scene>,
    processor: InputProcessor<MenuState>,
    state: MenuState,
    gui: Box<dyn GuiLayer>,

    alpha: Rc<Cell<f32>>,
    events_tx: Sender<MenuEvent>,
    events_rx: Receiver<MenuEvent>,
    selector_frame: f32,
    fade_in: Option<TimerHandle>,
    entered: bool,
    leaving: bool,

    pub on_play: Observable<()>,
    pub on_exit: Observable<()>,
}

impl MenuScreen {
    pub fn new(
        host: &dyn HostEngine,
        gamepads: Rc<GamepadManager>,
        input_manager: SharedInputManager,
        debounce: Duration,
    ) -> Self {
        let scene = Scene::new("menu", host.create_scene_renderer("menu"), gamepads);

        let titles: Vec<&str> = MenuItem::ALL.iter().map(|item| item.title()).collect();
        let mut gui = host.create_gui("menuContainer", &titles);
        gui.set_alpha(0.0);
        gui.highlight(None, 0.0);

        let processor = InputProcessor::new(Rc::clone(&scene), input_manager, &ACTIONS, debounce);
        let (events_tx, events_rx) = unbounded();

        Self {
            scene,
            processor,
            state: MenuState::new(titles.len()),
            gui,
            alpha: Rc::new(Cell::new(0.0)),
            events_tx,
            events_rx,
            selector_frame: 0.0,
            fade_in: None,
            entered: false,
            leaving: false,
            on_play: Observable::new(),
            on_exit: Observable::new(),
        }
    }

    //--- Transitions ------------------------------------------------------

    fn enter(&mut self) {
        self.entered = true;

        let alpha = Rc::clone(&self.alpha);
        let tx = self.events_tx.clone();
        let handle = self.scene.timeline().schedule(
            Timer::new(FADE_IN)
                .on_tick(move |p| alpha.set(smooth_step(0.0, 1.0, p.completion)))
                .on_end(move || {
                    let _ = tx.send(MenuEvent::EnterFinished);
                }),
        );
        self.fade_in = Some(handle);
    }

    /// Invokes the menu item at `index`, as a GUI click would.
    pub fn click(&mut self, index: usize) {
        let Some(item) = MenuItem::from_index(index) else {
            return;
        };
        if self.leaving {
            return;
        }
        info!("{} button clicked", item.title());
        self.leaving = true;
        self.gui.set_visible(false);
        if let Some(fade_in) = self.fade_in.take() {
            self.scene.timeline().cancel(fade_in);
        }

        let alpha = Rc::clone(&self.alpha);
        let tx = self.events_tx.clone();
        self.scene.timeline().schedule(
            Timer::new(FADE_OUT)
                .on_tick(move |p| alpha.set(smooth_step(1.0, 0.0, p.completion)))
                .on_end(move || {
                    let _ = tx.send(MenuEvent::LeaveFinished(item));
                }),
        );
    }

    fn handle_events(&mut self) {
        let events: Vec<MenuEvent> = self.events_rx.try_iter().collect();
        for event in events {
            match event {
                MenuEvent::EnterFinished => self.state.set_selected_index(0),
                MenuEvent::LeaveFinished(MenuItem::Play) => self.on_play.notify(&()),
                MenuEvent::LeaveFinished(MenuItem::Exit) => self.on_exit.notify(&()),
            }
        }
    }

    fn animate_selector(&mut self, delta: Duration) {
        self.selector_frame = repeat_f32(self.selector_frame + delta.as_secs_f32() * 5.0, PI * 2.0 * 10.0);
        let selected = self.state.selected_item();
        if self.state.selection_changed || selected.is_some() {
            self.state.selection_changed = false;
            self.gui.highlight(selected, self.selector_frame.sin().round());
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn selected_index(&self) -> i32 {
        self.state.selected_index()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha.get()
    }

    pub fn is_leaving(&self) -> bool {
        self.leaving
    }
}

impl Screen for MenuScreen {
    fn scene(&self) -> &Rc<Scene> {
        &self.scene
    }

    fn update(&mut self, delta: Option<Duration>) {
        self.processor.update(&mut self.state);

        while let Some(index) = self.gui.poll_click() {
            self.state.clicks.push(index);
        }
        for index in std::mem::take(&mut self.state.clicks) {
            self.click(index);
        }

        self.handle_events();
        self.animate_selector(delta.unwrap_or_default());
        self.gui.set_alpha(self.alpha.get());
    }

    fn attach_controls(&mut self) {
        self.processor.attach_control();
        if !self.entered {
            self.enter();
        }
    }

    fn detach_controls(&mut self) {
        self.processor.detach_control();
    }
}

//=========================================================================
// Helpers
//=========================================================================

/// Wraps `value` into `[0, length)`.
fn repeat(value: i32, length: usize) -> i32 {
    match i32::try_from(length) {
        Ok(length) if length > 0 => value.rem_euclid(length),
        _ => 0,
    }
}

fn repeat_f32(value: f32, length: f32) -> f32 {
    value - (value / length).floor() * length
}

/// Hermite interpolation between `from` and `to` for `t` in `[0, 1]`.
fn smooth_step(from: f32, to: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let t = -2.0 * t * t * t + 3.0 * t * t;
    to * t + from * (1.0 - t)
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::testing::MockHost;
    use crate::core::input::{DeviceEvent, InputManager, KeyCode, KeyboardInfo, DEFAULT_DEBOUNCE};

    //--- Helpers ----------------------------------------------------------

    fn menu(host: &MockHost) -> MenuScreen {
        MenuScreen::new(
            host,
            Rc::new(GamepadManager::new()),
            InputManager::default().shared(),
            DEFAULT_DEBOUNCE,
        )
    }

    fn frame(menu: &mut MenuScreen, ms: u64) {
        let delta = Duration::from_millis(ms);
        menu.update(Some(delta));
        menu.scene().render(delta);
    }

    fn counter(observable: &Observable<()>) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        observable.add(move |_| c.set(c.get() + 1));
        count
    }

    fn ctx(prior_state: bool) -> ActionContext {
        ActionContext { prior_state }
    }

    fn key() -> RawInputEvent {
        RawInputEvent::Keyboard(KeyboardInfo::down(KeyCode::Enter))
    }

    //--- Selection --------------------------------------------------------

    #[test]
    fn selection_starts_unset_and_wraps() {
        let mut state = MenuState::new(2);
        assert_eq!(state.selected_index(), -1);
        assert_eq!(state.selected_item(), None);

        state.move_up(ctx(false), &key());
        assert_eq!(state.selected_index(), 0);

        state.move_up(ctx(false), &key());
        assert_eq!(state.selected_index(), 1);

        state.move_down(ctx(false), &key());
        assert_eq!(state.selected_index(), 0);
    }

    #[test]
    fn held_moves_do_not_repeat() {
        let mut state = MenuState::new(2);
        state.set_selected_index(0);

        assert!(state.move_up(ctx(true), &key()));
        assert!(state.move_down(ctx(true), &key()));
        assert_eq!(state.selected_index(), 0);
    }

    #[test]
    fn move_down_returns_prior_state() {
        let mut state = MenuState::new(2);
        assert!(!state.move_down(ctx(false), &key()));
        assert!(state.move_down(ctx(true), &key()));
    }

    #[test]
    fn activate_without_selection_clicks_nothing() {
        let mut state = MenuState::new(2);
        assert!(state.activate(ctx(false), &key()));
        assert!(state.clicks.is_empty());

        state.set_selected_index(1);
        state.activate(ctx(true), &key());
        assert!(state.clicks.is_empty());

        state.activate(ctx(false), &key());
        assert_eq!(state.clicks, vec![1]);
    }

    #[test]
    fn left_and_right_have_no_handler() {
        assert!(MenuState::action_handler(InputAction::MoveLeft).is_none());
        assert!(MenuState::action_handler(InputAction::MoveRight).is_none());
        assert!(MenuState::action_handler(InputAction::GoBack).is_some());
    }

    //--- Fades ------------------------------------------------------------

    #[test]
    fn first_attach_fades_in_and_selects_first_item() {
        let host = MockHost::new();
        let mut menu = menu(&host);
        menu.attach_controls();

        frame(&mut menu, 750);
        assert!((menu.alpha() - 0.5).abs() < 1e-3);
        assert_eq!(menu.selected_index(), -1);

        frame(&mut menu, 750);
        frame(&mut menu, 16);
        assert_eq!(menu.alpha(), 1.0);
        assert_eq!(menu.selected_index(), 0);
        assert_eq!(host.gui("menuContainer").highlighted.get(), Some(0));
    }

    #[test]
    fn play_click_fades_out_then_notifies() {
        let host = MockHost::new();
        let mut menu = menu(&host);
        let play = counter(&menu.on_play);
        let exit = counter(&menu.on_exit);

        menu.click(0);
        menu.click(1);
        assert!(!host.gui("menuContainer").visible.get());

        frame(&mut menu, 500);
        assert_eq!(play.get(), 0);

        frame(&mut menu, 500);
        frame(&mut menu, 16);
        assert_eq!(play.get(), 1);
        assert_eq!(exit.get(), 0);
    }

    #[test]
    fn click_during_fade_in_stops_it() {
        let host = MockHost::new();
        let mut menu = menu(&host);
        let exit = counter(&menu.on_exit);
        menu.attach_controls();

        frame(&mut menu, 750);
        menu.click(1);
        frame(&mut menu, 1000);
        frame(&mut menu, 16);

        assert_eq!(menu.alpha(), 0.0);
        assert_eq!(menu.selected_index(), -1);
        assert_eq!(exit.get(), 1);
        assert_eq!(menu.scene().timeline().pending(), 0);
    }

    #[test]
    fn gui_click_on_exit_notifies_exit() {
        let host = MockHost::new();
        let mut menu = menu(&host);
        let exit = counter(&menu.on_exit);

        host.gui("menuContainer").clicks.borrow_mut().push_back(1);
        frame(&mut menu, 16);
        frame(&mut menu, 1000);
        frame(&mut menu, 16);

        assert_eq!(exit.get(), 1);
    }

    //--- Input ------------------------------------------------------------

    #[test]
    fn keyboard_navigation_and_activation() {
        let host = MockHost::new();
        let mut menu = menu(&host);
        let exit = counter(&menu.on_exit);
        menu.attach_controls();
        frame(&mut menu, 1500);
        frame(&mut menu, 16);
        assert_eq!(menu.selected_index(), 0);

        let scene = Rc::clone(menu.scene());
        scene.dispatch(&DeviceEvent::Keyboard(KeyboardInfo::down(KeyCode::ArrowDown)));
        frame(&mut menu, 16);
        scene.dispatch(&DeviceEvent::Keyboard(KeyboardInfo::up(KeyCode::ArrowDown)));
        assert_eq!(menu.selected_index(), 1);

        scene.dispatch(&DeviceEvent::Keyboard(KeyboardInfo::down(KeyCode::Enter)));
        frame(&mut menu, 16);
        assert!(menu.is_leaving());

        frame(&mut menu, 1000);
        frame(&mut menu, 16);
        assert_eq!(exit.get(), 1);
    }

    //--- Helpers ----------------------------------------------------------

    #[test]
    fn repeat_wraps_negative_values() {
        assert_eq!(repeat(-1, 2), 1);
        assert_eq!(repeat(2, 2), 0);
        assert_eq!(repeat(5, 0), 0);
        assert!((repeat_f32(7.0, 5.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn smooth_step_endpoints() {
        assert_eq!(smooth_step(0.0, 1.0, 0.0), 0.0);
        assert_eq!(smooth_step(0.0, 1.0, 1.0), 1.0);
        assert_eq!(smooth_step(1.0, 0.0, 1.0), 0.0);
        assert!((smooth_step(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }
}

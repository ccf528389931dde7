//=========================================================================
// Running Screen
//=========================================================================
//
// Gameplay scene. Only owns its scene for now: no input bindings and no
// per-frame logic.
//
//=========================================================================

use std::rc::Rc;
use std::time::Duration;

use log::debug;

use super::Screen;
use crate::core::{host::HostEngine, input::GamepadManager, scene::Scene};

pub struct RunningScreen {
    scene: Rc<Scene>,
}

impl RunningScreen {
    pub fn new(host: &dyn HostEngine, gamepads: Rc<GamepadManager>) -> Self {
        Self {
            scene: Scene::new("running", host.create_scene_renderer("running"), gamepads),
        }
    }
}

impl Screen for RunningScreen {
    fn scene(&self) -> &Rc<Scene> {
        &self.scene
    }

    fn update(&mut self, _delta: Option<Duration>) {}

    fn attach_controls(&mut self) {
        debug!("Running screen active");
        self.scene.attach_control();
    }

    fn detach_controls(&mut self) {
        self.scene.detach_control();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::testing::MockHost;

    #[test]
    fn attach_toggles_scene_input() {
        let host = MockHost::new();
        let mut screen = RunningScreen::new(&host, Rc::new(GamepadManager::new()));

        screen.attach_controls();
        assert!(screen.scene().is_input_attached());

        screen.detach_controls();
        assert!(!screen.scene().is_input_attached());
    }
}

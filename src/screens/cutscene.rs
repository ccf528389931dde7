//=========================================================================
// Cut-Scene Segment
//=========================================================================
//
// One step of a scripted sequence: a host animation group plus an end
// notification.
//
// Flow:
//   start() → host plays the group
//   poll()  → group reports finished → on_end.notify(segment name)
//
// A segment is created once and is not restarted after it ended.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::{
    host::{AnimationGroup, AnimationTrack, HostEngine},
    observable::Observable,
};

//=== CutSceneSegment =====================================================

pub struct CutSceneSegment {
    name: String,
    group: Box<dyn AnimationGroup>,
    looping: bool,
    running: bool,
    ended: bool,

    /// Fired once with the segment name when playback ends.
    pub on_end: Observable<String>,
}

impl CutSceneSegment {
    pub fn new(host: &dyn HostEngine, name: &str, tracks: Vec<AnimationTrack>) -> Self {
        let group = host.create_animation_group(&format!("{name}-animGroupCS"), tracks);
        Self {
            name: name.to_owned(),
            group,
            looping: false,
            running: false,
            ended: false,
            on_end: Observable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Starts playback. Ignored while running or after the segment ended.
    pub fn start(&mut self) {
        if self.running || self.ended {
            return;
        }
        debug!("Cut-scene segment '{}' started", self.name);
        self.running = true;
        self.group.start(self.looping);
    }

    /// Stops playback without firing `on_end`.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.group.stop();
        }
    }

    /// Checks the host group and fires `on_end` when it finished.
    /// Returns `true` on the poll that observed the end.
    pub fn poll(&mut self) -> bool {
        if !self.running || !self.group.poll_finished() {
            return false;
        }
        self.running = false;
        self.ended = true;
        debug!("Cut-scene segment '{}' ended", self.name);
        self.on_end.notify(&self.name);
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }
}

impl fmt::Debug for CutSceneSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CutSceneSegment")
            .field("name", &self.name)
            .field("running", &self.running)
            .field("ended", &self.ended)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::testing::MockHost;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn end_is_announced_once() {
        let host = MockHost::new();
        let mut segment = CutSceneSegment::new(&host, "intro", Vec::new());
        let ended = Rc::new(Cell::new(0));

        let e = Rc::clone(&ended);
        segment.on_end.add(move |_| e.set(e.get() + 1));

        segment.start();
        assert!(!segment.poll());

        host.animation("intro-animGroupCS").finish();
        assert!(segment.poll());
        assert!(!segment.poll());

        assert_eq!(ended.get(), 1);
        assert!(segment.has_ended());
    }

    #[test]
    fn ended_segment_is_not_restarted() {
        let host = MockHost::new();
        let mut segment = CutSceneSegment::new(&host, "intro", Vec::new());

        segment.start();
        segment.start();
        host.animation("intro-animGroupCS").finish();
        segment.poll();
        segment.start();

        assert_eq!(host.animation("intro-animGroupCS").starts.get(), 1);
    }

    #[test]
    fn stopped_segment_never_ends() {
        let host = MockHost::new();
        let mut segment = CutSceneSegment::new(&host, "intro", Vec::new());

        segment.start();
        segment.stop();
        host.animation("intro-animGroupCS").finish();

        assert!(!segment.poll());
        assert!(host.animation("intro-animGroupCS").stopped.get());
    }
}

//! Slide transition of the slot strip

use super::slot::SlotRole;
use super::timer::{TimerId, TimerKind};
use super::{PictureViewer, ViewerChrome};
use std::time::Instant;

/// What happens when the slide ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideAction {
    /// Rotate to the neighbor that slid in
    Switch,
    /// Snap back to rest, no rotation
    Restore,
}

/// Direction the strip moves in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    /// Strip moves left, the next picture comes in
    Left,
    /// Strip moves right, the previous picture comes in
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum SlideState {
    Idle,
    Sliding {
        action: SlideAction,
        direction: SlideDirection,
        src_x: f64,
        dst_x: f64,
        started: Instant,
        timer: TimerId,
    },
}

impl<C: ViewerChrome> PictureViewer<C> {
    pub fn is_sliding(&self) -> bool {
        matches!(self.slide, SlideState::Sliding { .. })
    }

    pub fn slide_action(&self) -> Option<SlideAction> {
        match self.slide {
            SlideState::Sliding { action, .. } => Some(action),
            SlideState::Idle => None,
        }
    }

    /// Place the three slots side by side, CURRENT at `x`
    pub(super) fn set_strip_position(&mut self, x: f64) {
        self.strip_x = x;
        let width = self.viewport.width;
        self.chrome.set_slot_offset(self.ring.index(SlotRole::Prev), Some(x - width));
        self.chrome.set_slot_offset(self.ring.index(SlotRole::Current), Some(x));
        self.chrome.set_slot_offset(self.ring.index(SlotRole::Next), Some(x + width));
    }

    fn clear_strip_position(&mut self) {
        self.strip_x = 0.0;
        for index in 0..self.slots.len() {
            self.chrome.set_slot_offset(index, None);
        }
    }

    /// Slide to the previous picture; false at the start of the list
    pub fn switch_prev(&mut self) -> bool {
        if !self.iterator.as_ref().is_some_and(|iter| iter.has_prev()) {
            return false;
        }
        self.start_switch(SlideDirection::Right)
    }

    /// Slide to the next picture; false at the end of the list
    pub fn switch_next(&mut self) -> bool {
        if !self.iterator.as_ref().is_some_and(|iter| iter.has_next()) {
            return false;
        }
        self.start_switch(SlideDirection::Left)
    }

    /// False when a slide is already running
    fn start_switch(&mut self, direction: SlideDirection) -> bool {
        if self.is_sliding() {
            return false;
        }
        let width = self.viewport.width;
        let dst_x = match direction {
            SlideDirection::Right => width,
            SlideDirection::Left => -width,
        };
        self.begin_slide(SlideAction::Switch, direction, dst_x);
        true
    }

    /// Animate the strip back to rest after a drag that did not switch
    pub(super) fn restore_slider(&mut self) {
        if self.is_sliding() || self.strip_x == 0.0 {
            return;
        }
        let direction = if self.strip_x < 0.0 {
            SlideDirection::Right
        } else {
            SlideDirection::Left
        };
        self.begin_slide(SlideAction::Restore, direction, 0.0);
    }

    fn begin_slide(&mut self, action: SlideAction, direction: SlideDirection, dst_x: f64) {
        let started = self.clock.now();
        let timer = self
            .timers
            .schedule(started + self.config.slide_start_delay(), TimerKind::SlideTick);
        tracing::debug!(?action, ?direction, src_x = self.strip_x, dst_x, "Slide started");
        self.slide = SlideState::Sliding {
            action,
            direction,
            src_x: self.strip_x,
            dst_x,
            started,
            timer,
        };
    }

    pub(super) fn on_slide_tick(&mut self, id: TimerId) {
        let SlideState::Sliding {
            action,
            direction,
            src_x,
            dst_x,
            started,
            timer,
        } = self.slide
        else {
            return;
        };
        if timer != id {
            return;
        }

        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(started);
        let duration = self.config.slide_duration();
        if elapsed < duration {
            let x = src_x + (dst_x - src_x) * elapsed.as_secs_f64() / duration.as_secs_f64();
            tracing::trace!(x, "Slide tick");
            self.set_strip_position(x);
            let timer = self.timers.schedule(now + self.config.slide_tick(), TimerKind::SlideTick);
            self.slide = SlideState::Sliding {
                action,
                direction,
                src_x,
                dst_x,
                started,
                timer,
            };
            return;
        }

        self.set_strip_position(dst_x);
        self.slide = SlideState::Idle;
        self.clear_strip_position();
        if action == SlideAction::Switch {
            match direction {
                SlideDirection::Right => self.open_prev(),
                SlideDirection::Left => self.open_next(),
            };
        }
    }
}

//! Pointer, touch, wheel and keyboard handling

use super::geometry::{Point, Size};
use super::{PictureViewer, ViewerChrome};
use crate::ViewerError;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `-`
    Minus,
    /// `=`
    Equal,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchState {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    pub x: f64,
    pub y: f64,
    pub state: TouchState,
}

impl TouchPoint {
    pub fn new(id: i32, x: f64, y: f64, state: TouchState) -> Self {
        Self { id, x, y, state }
    }

    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Viewer buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Prev,
    Next,
    ZoomIn,
    ZoomOut,
    ResetSize,
    Delete,
    Info,
    Back,
}

/// Raw input delivered to the viewer on the interaction thread
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseDown(Point),
    MouseMove(Point),
    MouseUp(Point),
    DoubleClick,
    /// Positive `delta` zooms in
    Wheel { at: Point, delta: f64 },
    Key(Key),
    /// All touch points of one touch event
    Touch(Vec<TouchPoint>),
    Resize(Size),
    Action(ViewerAction),
}

/// Axes on which the picture overflows the viewport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct DragAxes {
    pub x: bool,
    pub y: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum DragState {
    Idle,
    Dragging { pointer: Point, focus: Point },
}

/// Horizontal swipe being tracked
#[derive(Debug, Clone, Copy)]
pub(super) struct Gesture {
    x: f64,
    start_x: f64,
    /// Last time `x` changed
    moved_at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Pinch {
    distance: f64,
    scale: f64,
    anchor: Point,
}

/// The two touch points driving a pinch.
///
/// Extra points are ignored until a tracked one lifts; then the first
/// untracked point still down takes its place.
#[derive(Debug, Default)]
pub(super) struct TouchTracker {
    ids: [Option<i32>; 2],
    pinch: Option<Pinch>,
}

impl<C: ViewerChrome> PictureViewer<C> {
    pub fn handle_input(&mut self, event: InputEvent) -> Result<(), ViewerError> {
        if !self.is_working() {
            return Ok(());
        }
        match event {
            InputEvent::MouseDown(p) => self.on_mouse_down(p),
            InputEvent::MouseMove(p) => self.on_mouse_move(p),
            InputEvent::MouseUp(_) => self.on_mouse_up(),
            InputEvent::DoubleClick => self.toggle_reset_size(),
            InputEvent::Wheel { at, delta } => self.on_wheel(at, delta),
            InputEvent::Key(key) => self.on_key(key),
            InputEvent::Touch(points) => self.on_touch(&points),
            InputEvent::Resize(size) => self.resize(size),
            InputEvent::Action(action) => return self.on_action(action),
        }
        Ok(())
    }

    fn on_action(&mut self, action: ViewerAction) -> Result<(), ViewerError> {
        match action {
            ViewerAction::Prev => {
                self.open_prev();
            }
            ViewerAction::Next => {
                self.open_next();
            }
            ViewerAction::ZoomIn => self.zoom_in_centered(),
            ViewerAction::ZoomOut => self.zoom_out_centered(),
            ViewerAction::ResetSize => self.toggle_reset_size(),
            ViewerAction::Delete => return self.delete_current(),
            ViewerAction::Info => self.show_info(),
            ViewerAction::Back => self.back(),
        }
        Ok(())
    }

    fn on_key(&mut self, key: Key) {
        let step = self.config.move_step;
        let (dx, dy) = match key {
            Key::Minus => return self.zoom_out(),
            Key::Equal => return self.zoom_in(),
            Key::Left if !self.zoom_mode => {
                self.open_prev();
                return;
            }
            Key::Right if !self.zoom_mode => {
                self.open_next();
                return;
            }
            Key::Up | Key::Down if !self.zoom_mode => return,
            Key::Left => (-step, 0.0),
            Key::Right => (step, 0.0),
            Key::Up => (0.0, -step),
            Key::Down => (0.0, step),
        };
        self.set_focus_point(Point::new(self.focus.x + dx, self.focus.y + dy));
    }

    fn on_wheel(&mut self, at: Point, delta: f64) {
        if self.picture_size().is_none() {
            return;
        }
        self.anchor_at(at);
        if delta < 0.0 {
            self.zoom_out();
        } else {
            self.zoom_in();
        }
    }

    fn start_drag(&mut self, pointer: Point) {
        self.drag = DragState::Dragging {
            pointer,
            focus: self.focus,
        };
    }

    /// Move the picture with the pointer on the axes where it overflows
    fn drag_to(&mut self, pointer: Point) {
        let DragState::Dragging { pointer: start, focus } = self.drag else {
            return;
        };
        let mut target = self.focus;
        if self.draggable.x {
            target.x = focus.x - (pointer.x - start.x);
        }
        if self.draggable.y {
            target.y = focus.y - (pointer.y - start.y);
        }
        self.set_focus_point(target);
    }

    fn start_gesture(&mut self, x: f64) {
        self.gesture = Some(Gesture {
            x,
            start_x: x,
            moved_at: self.clock.now(),
        });
    }

    fn update_gesture(&mut self, x: f64) {
        let now = self.clock.now();
        let Some(g) = self.gesture.as_mut() else {
            return;
        };
        if g.x == x {
            return;
        }
        // Direction reversed: measure the swipe from here
        if (g.x > g.start_x && x < g.x) || (g.x < g.start_x && x > g.x) {
            g.start_x = x;
        }
        g.x = x;
        g.moved_at = now;
    }

    /// Finish a swipe. It switches pictures only if the pointer was still
    /// moving at release and travelled far enough; returns false otherwise.
    fn handle_gesture(&mut self) -> bool {
        let Some(g) = self.gesture.take() else {
            return false;
        };
        let idle = self.clock.now().saturating_duration_since(g.moved_at);
        if idle > self.config.swipe_max_idle() || (g.x - g.start_x).abs() < self.config.swipe_min_distance {
            return false;
        }
        if g.x > g.start_x {
            self.switch_prev()
        } else if g.x < g.start_x {
            self.switch_next()
        } else {
            false
        }
    }

    /// Pointer released: switch or snap the strip back
    fn end_gesture(&mut self) {
        if self.gesture.is_none() {
            return;
        }
        if self.touch.pinch.is_none() && !self.zoom_mode && !self.handle_gesture() {
            self.restore_slider();
        }
        self.gesture = None;
    }

    fn on_mouse_down(&mut self, p: Point) {
        if self.touch_mode {
            return;
        }
        self.start_drag(p);
        if !self.zoom_mode {
            self.start_gesture(p.x);
        }
        self.chrome.set_pointer_capture(true);
    }

    fn on_mouse_move(&mut self, p: Point) {
        if self.touch_mode {
            return;
        }
        self.pointer_moved(p);
    }

    fn on_mouse_up(&mut self) {
        if self.touch_mode {
            return;
        }
        self.drag = DragState::Idle;
        self.chrome.set_pointer_capture(false);
        self.end_gesture();
    }

    fn pointer_moved(&mut self, p: Point) {
        let DragState::Dragging { pointer: start, .. } = self.drag else {
            return;
        };
        self.drag_to(p);
        if self.gesture.is_some() {
            self.update_gesture(p.x);
            self.set_strip_position(p.x - start.x);
        }
    }

    fn on_touch_down(&mut self, point: &TouchPoint) {
        self.touch_mode = true;
        self.start_drag(point.position());
        if !self.zoom_mode {
            self.start_gesture(point.x);
        }
        self.chrome.set_touch_capture(Some(point.id));
    }

    fn on_touch_up(&mut self) {
        self.touch_mode = false;
        self.drag = DragState::Idle;
        self.end_gesture();
        self.chrome.set_touch_capture(None);
    }

    fn on_touch(&mut self, points: &[TouchPoint]) {
        match points {
            [] => {}
            [point] => {
                match point.state {
                    TouchState::Down => {
                        self.on_touch_down(point);
                        self.touch.ids = [Some(point.id), None];
                    }
                    TouchState::Move => self.pointer_moved(point.position()),
                    TouchState::Up => {
                        self.on_touch_up();
                        self.touch = TouchTracker::default();
                    }
                }
            }
            _ => self.on_pinch(points),
        }
    }

    fn on_pinch(&mut self, points: &[TouchPoint]) {
        // A swipe cut short by a second finger leaves the strip displaced
        self.gesture = None;
        self.drag = DragState::Idle;
        self.restore_slider();

        // Fill free tracking slots with points that are still down
        for i in 0..2 {
            let other = self.touch.ids[1 - i];
            let tracked = self.touch.ids[i].filter(|id| points.iter().any(|p| p.id == *id));
            self.touch.ids[i] = tracked.or_else(|| first_free(points, other));
        }
        let find = |id: Option<i32>| id.and_then(|id| points.iter().find(|p| p.id == id).copied());
        let (Some(a), Some(b)) = (find(self.touch.ids[0]), find(self.touch.ids[1])) else {
            return;
        };

        let distance = a.position().distance(b.position());
        match self.touch.pinch {
            None => {
                self.touch.pinch = Some(Pinch {
                    distance,
                    scale: self.scale(),
                    anchor: a.position().midpoint(b.position()),
                });
            }
            Some(pinch) if a.state == TouchState::Move || b.state == TouchState::Move => {
                if pinch.distance > 0.0 {
                    self.anchor_at(pinch.anchor);
                    self.set_scale(pinch.scale * distance / pinch.distance);
                }
            }
            Some(_) => {}
        }

        // Replace lifted points; the pinch baseline is captured again
        for (i, point) in [a, b].into_iter().enumerate() {
            if point.state != TouchState::Up {
                continue;
            }
            self.touch.pinch = None;
            let other = self.touch.ids[1 - i];
            self.touch.ids[i] = first_free(points, other);
        }
        if self.touch.ids[0].is_none() {
            self.touch.ids = [self.touch.ids[1], None];
        }

        match self.touch.ids {
            [Some(id), None] => {
                // One finger left: carry on as a single-touch drag
                self.touch.pinch = None;
                if let Some(p) = points.iter().find(|p| p.id == id) {
                    self.touch_mode = true;
                    self.start_drag(p.position());
                }
            }
            [None, _] => {
                self.touch = TouchTracker::default();
                self.touch_mode = false;
            }
            _ => {}
        }
    }
}

/// First point still down that is not `other`
fn first_free(points: &[TouchPoint], other: Option<i32>) -> Option<i32> {
    points
        .iter()
        .find(|p| p.state != TouchState::Up && Some(p.id) != other)
        .map(|p| p.id)
}

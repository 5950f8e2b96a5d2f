//! Picture viewer
//!
//! [`PictureViewer`] is the single owner of everything visible in the viewer:
//! the three slots, the file iterator, focus/offset/scale and the state of
//! the current drag, gesture, pinch or slide. It lives on the interaction
//! thread. The loader thread and decode callbacks talk back to it only
//! through posted [`ViewerTask`]s.

mod chrome;
mod geometry;
mod interaction;
mod loader;
mod navigation;
mod scale;
mod slide;
mod slot;
mod task;
mod timer;

#[cfg(test)]
pub(crate) mod testing;

pub use chrome::{Controls, FileIndex, LabelsContext, ResetIcon, ViewerChrome, CONFIRM_DELETE_KEY};
pub use geometry::{fit_area, fit_scale, layout_axis, AxisLayout, Background, BackgroundPosition, Point, Size};
pub use interaction::{InputEvent, Key, TouchPoint, TouchState, ViewerAction};
pub use loader::{LoadTargets, PictureLoader};
pub use slide::{SlideAction, SlideDirection};
pub use slot::{BeginLoad, PictureSlot, SlotRing, SlotRole, SlotSnapshot};
pub use task::{task_channel, TaskSender, ViewerTask};
pub use timer::{Clock, ManualClock, SystemClock, TimerId, TimerKind, TimerQueue};

use crate::config::{AppConfig, FilerConfig, ViewerConfig, ViewerMode};
use crate::events::EventBus;
use crate::file_iterator::FileIterator;
use crate::image_loader::{DecodedImage, ImageSource};
use crate::ViewerError;
use app_fs::FileOperations;
use interaction::{DragAxes, DragState, Gesture, TouchTracker};
use slide::SlideState;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Window title when no picture is open
pub const APP_NAME: &str = "LC-Finder";

/// Interaction-thread side of a slot: what is on screen and at what scale
#[derive(Debug)]
struct SlotView {
    image: Option<Arc<DecodedImage>>,
    scale: f64,
    min_scale: f64,
    tip_timer: Option<TimerId>,
}

impl Default for SlotView {
    fn default() -> Self {
        Self {
            image: None,
            scale: 1.0,
            min_scale: 1.0,
            tip_timer: None,
        }
    }
}

impl SlotView {
    fn image_size(&self) -> Option<Size> {
        self.image
            .as_ref()
            .map(|image| Size::new(f64::from(image.width), f64::from(image.height)))
    }
}

/// Collaborators handed to the viewer at construction
pub struct ViewerServices {
    pub source: Arc<dyn ImageSource>,
    pub files: Arc<dyn FileOperations>,
    pub index: Box<dyn FileIndex>,
    pub events: EventBus,
    pub clock: Arc<dyn Clock>,
}

pub struct PictureViewer<C: ViewerChrome> {
    config: ViewerConfig,
    filer: FilerConfig,
    mode: ViewerMode,
    chrome: C,

    /// Cleared once at teardown; checked by every blocking wait
    working: Arc<AtomicBool>,
    slots: [Arc<PictureSlot>; 3],
    views: [SlotView; 3],
    ring: SlotRing,
    loader: PictureLoader,

    iterator: Option<Box<dyn FileIterator>>,
    /// Path passed to the last `open`
    opened: Option<PathBuf>,
    scanning: bool,

    viewport: Size,
    focus: Point,
    origin: Point,
    offset: Point,
    draggable: DragAxes,
    zoom_mode: bool,
    touch_mode: bool,

    drag: DragState,
    gesture: Option<Gesture>,
    touch: TouchTracker,
    slide: SlideState,
    /// Horizontal offset of the slot strip
    strip_x: f64,

    timers: TimerQueue,
    clock: Arc<dyn Clock>,
    tasks: TaskSender,
    files: Arc<dyn FileOperations>,
    index: Box<dyn FileIndex>,
    events: EventBus,
    quit: bool,
}

impl<C: ViewerChrome> PictureViewer<C> {
    /// Create the viewer and start its loader thread
    pub fn new(config: &AppConfig, chrome: C, services: ViewerServices, tasks: TaskSender) -> Result<Self, ViewerError> {
        let working = Arc::new(AtomicBool::new(true));
        let slots = [0, 1, 2].map(|index| Arc::new(PictureSlot::new(index)));
        let loader = PictureLoader::new(
            slots.clone(),
            services.source,
            tasks.clone(),
            Arc::clone(&working),
            config.viewer.load_poll(),
        )?;

        tracing::info!(mode = ?config.general.start_mode, "Picture viewer initialized");

        Ok(Self {
            config: config.viewer.clone(),
            filer: config.filer.clone(),
            mode: config.general.start_mode,
            chrome,
            working,
            slots,
            views: Default::default(),
            ring: SlotRing::new(),
            loader,
            iterator: None,
            opened: None,
            scanning: false,
            viewport: Size::default(),
            focus: Point::default(),
            origin: Point::default(),
            offset: Point::default(),
            draggable: DragAxes::default(),
            zoom_mode: false,
            touch_mode: false,
            drag: DragState::Idle,
            gesture: None,
            touch: TouchTracker::default(),
            slide: SlideState::Idle,
            strip_x: 0.0,
            timers: TimerQueue::new(),
            clock: services.clock,
            tasks,
            files: services.files,
            index: services.index,
            events: services.events,
            quit: false,
        })
    }

    pub fn chrome(&self) -> &C {
        &self.chrome
    }

    pub fn chrome_mut(&mut self) -> &mut C {
        &mut self.chrome
    }

    pub fn mode(&self) -> ViewerMode {
        self.mode
    }

    pub fn is_working(&self) -> bool {
        self.working.load(Ordering::Acquire)
    }

    pub fn is_open(&self) -> bool {
        self.opened.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn is_zoom_mode(&self) -> bool {
        self.zoom_mode
    }

    pub fn is_touch_mode(&self) -> bool {
        self.touch_mode
    }

    pub fn iterator(&self) -> Option<&dyn FileIterator> {
        self.iterator.as_deref()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.opened.as_deref()
    }

    pub fn ring(&self) -> SlotRing {
        self.ring
    }

    pub fn slot(&self, role: SlotRole) -> &Arc<PictureSlot> {
        &self.slots[self.ring.index(role)]
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn focus(&self) -> Point {
        self.focus
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Scale of the picture on screen
    pub fn scale(&self) -> f64 {
        self.views[self.active()].scale
    }

    pub fn min_scale(&self) -> f64 {
        self.views[self.active()].min_scale
    }

    pub fn strip_position(&self) -> f64 {
        self.strip_x
    }

    /// Physical index of the CURRENT slot
    fn active(&self) -> usize {
        self.ring.index(SlotRole::Current)
    }

    /// Apply work posted by the loader, the decoder or the folder scanner
    pub fn handle_task(&mut self, task: ViewerTask) {
        if !self.is_working() {
            return;
        }
        tracing::trace!(?task, "Viewer task");
        match task {
            ViewerTask::LoadStarted { slot, epoch } => self.on_load_started(slot, epoch),
            ViewerTask::LoadProgress { slot, epoch, percent } => {
                if slot == self.active() && self.slots[slot].epoch() == epoch {
                    self.chrome.set_loading_progress(percent);
                }
            }
            ViewerTask::SlotLoaded { slot, epoch } => self.on_slot_loaded(slot, epoch),
            ViewerTask::FolderScanned { path, iterator } => self.on_folder_scanned(path, iterator),
        }
    }

    fn on_load_started(&mut self, slot: usize, epoch: u64) {
        if self.slots[slot].epoch() != epoch {
            return;
        }
        self.views[slot].image = None;
        self.chrome.set_slot_image(slot, None);
        self.cancel_loading_tip(slot);
        let deadline = self.clock.now() + self.config.loading_tip_delay();
        self.views[slot].tip_timer = Some(self.timers.schedule(deadline, TimerKind::LoadingTip { slot }));
    }

    fn on_slot_loaded(&mut self, slot: usize, epoch: u64) {
        let snap = self.slots[slot].snapshot();
        if snap.epoch != epoch {
            tracing::debug!(slot, epoch, "Ignoring stale load result");
            return;
        }
        if snap.valid && !snap.has_newer_target {
            self.views[slot].image = snap.image.clone();
            self.chrome.set_slot_image(slot, snap.image);
            self.reset_size(slot);
        }
        if slot != self.active() {
            return;
        }
        if !snap.has_newer_target {
            self.cancel_loading_tip(slot);
            self.chrome.show_loading_tip(false);
        }
        self.chrome.show_unsupported_tip(!snap.valid);
        self.update_controls();
    }

    fn cancel_loading_tip(&mut self, slot: usize) {
        if let Some(id) = self.views[slot].tip_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn on_loading_tip(&mut self, slot: usize, id: TimerId) {
        if self.views[slot].tip_timer != Some(id) {
            return;
        }
        self.views[slot].tip_timer = None;
        if slot == self.active() && self.slots[slot].is_loading() {
            self.chrome.set_loading_progress(0.0);
            self.chrome.show_loading_tip(true);
        }
    }

    pub fn next_timer_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn time_until_next_timer(&self) -> Option<Duration> {
        self.next_timer_deadline()
            .map(|deadline| deadline.saturating_duration_since(self.clock.now()))
    }

    /// Fire every timer that is due
    pub fn run_due_timers(&mut self) {
        let now = self.clock.now();
        for (id, kind) in self.timers.take_due(now) {
            match kind {
                TimerKind::SlideTick => self.on_slide_tick(id),
                TimerKind::LoadingTip { slot } => self.on_loading_tip(slot, id),
            }
        }
    }

    /// Button and overlay state for the picture on screen
    pub fn controls(&self) -> Controls {
        let view = &self.views[self.active()];
        let valid = view.image.is_some();
        let (prev_visible, next_visible) = match (&self.iterator, self.zoom_mode) {
            (Some(iter), false) => (iter.has_prev(), iter.has_next()),
            _ => (false, false),
        };
        Controls {
            prev_visible,
            next_visible,
            zoom_in_enabled: valid && view.scale < self.config.max_scale,
            zoom_out_enabled: valid && view.scale > view.min_scale,
            reset_enabled: valid,
            reset_icon: if view.scale == view.min_scale {
                ResetIcon::Fit
            } else {
                ResetIcon::Actual
            },
        }
    }

    fn update_controls(&mut self) {
        let controls = self.controls();
        self.chrome.update_controls(&controls);
    }

    pub fn labels(&self) -> LabelsContext {
        let view = &self.views[self.active()];
        LabelsContext {
            path: self.opened.clone(),
            focus: self.focus,
            offset: self.offset,
            scale: if view.image.is_some() { view.scale } else { 1.0 },
            image_size: view.image.as_ref().map(|image| (image.width, image.height)),
        }
    }

    fn update_labels(&mut self) {
        let labels = self.labels();
        self.chrome.update_labels(&labels);
    }

    /// Tear down: stop the loader and drop pending timers.
    /// In-flight loads notice within one poll interval and publish nothing.
    pub fn shutdown(&mut self) {
        if !self.working.swap(false, Ordering::AcqRel) {
            return;
        }
        self.loader.exit();
        self.timers.clear();
        self.slide = SlideState::Idle;
        tracing::info!("Picture viewer stopped");
    }
}

impl<C: ViewerChrome> Drop for PictureViewer<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

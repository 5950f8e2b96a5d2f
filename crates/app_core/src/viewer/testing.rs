//! Test doubles for the viewer's collaborators

use super::chrome::{Controls, FileIndex, LabelsContext, ViewerChrome};
use super::geometry::{Background, Size};
use super::slot::SlotRole;
use super::task::{task_channel, ViewerTask};
use super::timer::ManualClock;
use super::{PictureViewer, ViewerServices};
use crate::config::{AppConfig, ViewerMode};
use crate::events::{DomainEvent, EventBus};
use crate::file_iterator::PathListIterator;
use crate::image_loader::{DecodedImage, DoneCallback, ImageSource, ProgressCallback};
use app_fs::{FileOpError, FileOperations};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Records what the viewer asked the display to do
#[derive(Debug)]
pub struct MockChrome {
    pub title: String,
    pub viewer_visible: bool,
    pub main_view_shown: bool,
    /// Dimensions of the picture each slot widget draws
    pub images: [Option<(u32, u32)>; 3],
    pub backgrounds: [Option<Background>; 3],
    pub offsets: [Option<f64>; 3],
    pub loading_tip: bool,
    pub progress: f32,
    pub unsupported_tip: bool,
    pub empty_tip: bool,
    pub controls: Option<Controls>,
    pub labels: Option<LabelsContext>,
    pub pointer_captured: bool,
    pub touch_capture: Option<i32>,
    pub confirm_answer: bool,
    pub confirms: Vec<String>,
    pub info: Option<PathBuf>,
    pub quit: bool,
}

impl Default for MockChrome {
    fn default() -> Self {
        Self {
            title: String::new(),
            viewer_visible: false,
            main_view_shown: false,
            images: [None; 3],
            backgrounds: [None; 3],
            offsets: [None; 3],
            loading_tip: false,
            progress: 0.0,
            unsupported_tip: false,
            empty_tip: false,
            controls: None,
            labels: None,
            pointer_captured: false,
            touch_capture: None,
            confirm_answer: true,
            confirms: Vec::new(),
            info: None,
            quit: false,
        }
    }
}

impl ViewerChrome for MockChrome {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn show_viewer(&mut self) {
        self.viewer_visible = true;
    }

    fn hide_viewer(&mut self) {
        self.viewer_visible = false;
    }

    fn show_main_view(&mut self) {
        self.main_view_shown = true;
    }

    fn set_slot_image(&mut self, slot: usize, image: Option<Arc<DecodedImage>>) {
        self.images[slot] = image.map(|image| (image.width, image.height));
        if self.images[slot].is_none() {
            self.backgrounds[slot] = None;
        }
    }

    fn set_slot_background(&mut self, slot: usize, background: &Background) {
        self.backgrounds[slot] = Some(*background);
    }

    fn set_slot_offset(&mut self, slot: usize, x: Option<f64>) {
        self.offsets[slot] = x;
    }

    fn show_loading_tip(&mut self, visible: bool) {
        self.loading_tip = visible;
    }

    fn set_loading_progress(&mut self, percent: f32) {
        self.progress = percent;
    }

    fn show_unsupported_tip(&mut self, visible: bool) {
        self.unsupported_tip = visible;
    }

    fn show_empty_tip(&mut self, visible: bool) {
        self.empty_tip = visible;
    }

    fn update_controls(&mut self, controls: &Controls) {
        self.controls = Some(*controls);
    }

    fn update_labels(&mut self, labels: &LabelsContext) {
        self.labels = Some(labels.clone());
    }

    fn set_pointer_capture(&mut self, captured: bool) {
        self.pointer_captured = captured;
    }

    fn set_touch_capture(&mut self, point: Option<i32>) {
        self.touch_capture = point;
    }

    fn confirm(&mut self, title_key: &str) -> bool {
        self.confirms.push(title_key.to_string());
        self.confirm_answer
    }

    fn show_info(&mut self, path: &Path) {
        self.info = Some(path.to_path_buf());
    }

    fn quit(&mut self) {
        self.quit = true;
    }
}

/// Decodes synchronously from a table of picture sizes. Unknown paths fail.
/// While held, requests wait until the test finishes them.
#[derive(Default)]
pub struct MemorySource {
    sizes: Mutex<HashMap<PathBuf, (u32, u32)>>,
    requests: Mutex<Vec<PathBuf>>,
    hold: Mutex<bool>,
    pending: Mutex<Vec<(PathBuf, ProgressCallback, DoneCallback)>>,
}

impl MemorySource {
    fn decode(&self, path: &Path) -> Option<DecodedImage> {
        let size = self.sizes.lock().get(path).copied();
        size.map(|(w, h)| DecodedImage::new(w, h, Vec::new()))
    }
}

impl ImageSource for MemorySource {
    fn request_image(&self, path: &Path, on_progress: ProgressCallback, on_done: DoneCallback) {
        self.requests.lock().push(path.to_path_buf());
        if *self.hold.lock() {
            self.pending.lock().push((path.to_path_buf(), on_progress, on_done));
            return;
        }
        on_progress(0.0);
        let image = self.decode(path);
        if image.is_some() {
            on_progress(100.0);
        }
        on_done(image);
    }
}

#[derive(Default)]
pub struct RecordingFiles {
    fail: Mutex<bool>,
    deleted: Mutex<Vec<(PathBuf, bool)>>,
}

impl FileOperations for RecordingFiles {
    fn delete(&self, paths: &[PathBuf], use_trash: bool) -> Result<(), FileOpError> {
        if *self.fail.lock() {
            return Err(FileOpError::NotFound(paths[0].clone()));
        }
        self.deleted
            .lock()
            .extend(paths.iter().map(|p| (p.clone(), use_trash)));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingIndex {
    deleted: Arc<Mutex<Vec<PathBuf>>>,
}

impl FileIndex for RecordingIndex {
    fn delete_files(&mut self, paths: &[PathBuf]) {
        self.deleted.lock().extend_from_slice(paths);
    }
}

pub struct Harness {
    pub viewer: PictureViewer<MockChrome>,
    pub tasks: Receiver<ViewerTask>,
    pub clock: Arc<ManualClock>,
    pub events: Receiver<DomainEvent>,
    source: Arc<MemorySource>,
    files: Arc<RecordingFiles>,
    index: RecordingIndex,
}

/// Viewer on an 800 x 600 viewport whose source knows `pictures`
pub fn harness(mode: ViewerMode, pictures: &[(&str, u32, u32)]) -> Harness {
    let source = Arc::new(MemorySource::default());
    for &(name, w, h) in pictures {
        source.sizes.lock().insert(PathBuf::from(name), (w, h));
    }
    let files = Arc::new(RecordingFiles::default());
    let index = RecordingIndex::default();
    let clock = Arc::new(ManualClock::new());
    let bus = EventBus::new();
    let events = bus.subscribe();

    let mut config = AppConfig::default();
    config.general.start_mode = mode;
    config.viewer.load_poll_ms = 20;

    let (sender, tasks) = task_channel();
    let services = ViewerServices {
        source: source.clone(),
        files: files.clone(),
        index: Box::new(index.clone()),
        events: bus,
        clock: clock.clone(),
    };
    let mut viewer = PictureViewer::new(&config, MockChrome::default(), services, sender).unwrap();
    viewer.resize(Size::new(800.0, 600.0));

    Harness {
        viewer,
        tasks,
        clock,
        events,
        source,
        files,
        index,
    }
}

const PUMP_TIMEOUT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(100);

impl Harness {
    pub fn add_picture(&self, path: &Path, width: u32, height: u32) {
        self.source.sizes.lock().insert(path.to_path_buf(), (width, height));
    }

    /// Paths handed to the decoder so far, in order
    pub fn requests(&self) -> Vec<PathBuf> {
        self.source.requests.lock().clone()
    }

    pub fn deleted(&self) -> Vec<(PathBuf, bool)> {
        self.files.deleted.lock().clone()
    }

    pub fn indexed_deletes(&self) -> Vec<PathBuf> {
        self.index.deleted.lock().clone()
    }

    /// Keep later decodes pending until [`Harness::finish_decode`]
    pub fn hold_decodes(&self) {
        *self.source.hold.lock() = true;
    }

    /// Report progress on the held decode of `path`; false if none is held
    pub fn report_progress(&self, path: &str, percent: f32) -> bool {
        let pending = self.source.pending.lock();
        match pending.iter().find(|(p, _, _)| p == Path::new(path)) {
            Some((_, on_progress, _)) => {
                on_progress(percent);
                true
            }
            None => false,
        }
    }

    /// Complete the held decode of `path`; false if none is held
    pub fn finish_decode(&self, path: &str) -> bool {
        let entry = {
            let mut pending = self.source.pending.lock();
            let at = pending.iter().position(|(p, _, _)| p == Path::new(path));
            at.map(|at| pending.remove(at))
        };
        let Some((path, _, on_done)) = entry else {
            return false;
        };
        on_done(self.source.decode(&path));
        true
    }

    /// Wait until the source holds a decode of `path`
    pub fn wait_for_request(&mut self, path: &str) -> bool {
        let deadline = Instant::now() + PUMP_TIMEOUT;
        while Instant::now() < deadline {
            if self.source.pending.lock().iter().any(|(p, _, _)| p == Path::new(path)) {
                return true;
            }
            if let Ok(task) = self.tasks.recv_timeout(Duration::from_millis(10)) {
                self.viewer.handle_task(task);
            }
        }
        false
    }

    /// Apply every task already posted
    pub fn drain(&mut self) {
        while let Ok(task) = self.tasks.try_recv() {
            self.viewer.handle_task(task);
        }
    }

    pub fn fail_deletes(&self) {
        *self.files.fail.lock() = true;
    }

    pub fn open_list(&mut self, names: &[&str], index: usize) {
        let paths: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();
        let current = paths[index].clone();
        self.viewer.set_iterator(Box::new(PathListIterator::new(paths, index)));
        self.viewer.open(&current);
    }

    /// Apply posted tasks until `done` holds; false on timeout
    pub fn pump_until(&mut self, mut done: impl FnMut(&PictureViewer<MockChrome>) -> bool) -> bool {
        let deadline = Instant::now() + PUMP_TIMEOUT;
        while !done(&self.viewer) {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.tasks.recv_timeout(left) {
                Ok(task) => self.viewer.handle_task(task),
                Err(_) => return false,
            }
        }
        true
    }

    pub fn wait_for_picture(&mut self) -> bool {
        self.pump_until(|v| v.picture_size().is_some())
    }

    /// Apply tasks until the loader is idle and nothing more arrives
    pub fn settle(&mut self) {
        let deadline = Instant::now() + PUMP_TIMEOUT;
        while Instant::now() < deadline {
            match self.tasks.recv_timeout(QUIET) {
                Ok(task) => self.viewer.handle_task(task),
                Err(RecvTimeoutError::Timeout) => {
                    let idle = SlotRole::ALL.iter().all(|&role| {
                        let snap = self.viewer.slot(role).snapshot();
                        !snap.loading && !snap.has_newer_target
                    });
                    if idle {
                        return;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    /// Step the clock through a running slide; true once it finished
    pub fn run_slide(&mut self) -> bool {
        for _ in 0..100 {
            if !self.viewer.is_sliding() {
                return true;
            }
            self.clock.advance(Duration::from_millis(10));
            self.viewer.run_due_timers();
        }
        !self.viewer.is_sliding()
    }
}

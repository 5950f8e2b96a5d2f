//! Picture slots
//!
//! The viewer owns three slots. Each one holds the load state of one picture
//! and is shared with the loader thread and the decode callback, so its
//! fields live behind the slot's own lock.

use super::task::{TaskSender, ViewerTask};
use crate::image_loader::{DecodedImage, ImageSource};
use parking_lot::{Condvar, Mutex};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Logical position of a slot in the viewer strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRole {
    Prev,
    Current,
    Next,
}

impl SlotRole {
    pub const ALL: [SlotRole; 3] = [SlotRole::Prev, SlotRole::Current, SlotRole::Next];

    fn ordinal(self) -> usize {
        match self {
            SlotRole::Prev => 0,
            SlotRole::Current => 1,
            SlotRole::Next => 2,
        }
    }
}

/// Role to physical slot mapping.
///
/// Navigation rotates the mapping; the slots themselves never move, so a
/// picture already decoded for a neighbor is reused as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRing {
    slots: [usize; 3],
}

impl SlotRing {
    pub fn new() -> Self {
        Self { slots: [0, 1, 2] }
    }

    /// Physical slot playing `role`
    pub fn index(&self, role: SlotRole) -> usize {
        self.slots[role.ordinal()]
    }

    pub fn role_of(&self, index: usize) -> SlotRole {
        SlotRole::ALL
            .into_iter()
            .find(|role| self.index(*role) == index)
            .unwrap_or(SlotRole::Current)
    }

    /// NEXT becomes CURRENT, CURRENT becomes PREV. Returns the slot recycled
    /// into the NEXT role.
    pub fn rotate_next(&mut self) -> usize {
        let [prev, current, next] = self.slots;
        self.slots = [current, next, prev];
        prev
    }

    /// PREV becomes CURRENT, CURRENT becomes NEXT. Returns the slot recycled
    /// into the PREV role.
    pub fn rotate_prev(&mut self) -> usize {
        let [prev, current, next] = self.slots;
        self.slots = [next, prev, current];
        next
    }
}

impl Default for SlotRing {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct SlotState {
    /// Path to load on the next loader pass
    requested: Option<PathBuf>,
    /// Path of the last load started on this slot
    loaded_path: Option<PathBuf>,
    valid: bool,
    image: Option<Arc<DecodedImage>>,
    /// Bumped on every new load and on every clear
    epoch: u64,
    /// Epoch of the decode still running
    in_flight: Option<u64>,
}

/// Outcome of [`PictureSlot::begin_load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginLoad {
    /// No target, or the viewer is shutting down
    Idle,
    /// Target already loaded; nothing to wait for
    Cached,
    /// A decode for the target is running under this epoch
    Pending { epoch: u64 },
}

/// Point-in-time copy of a slot's load state
#[derive(Debug, Clone)]
pub struct SlotSnapshot {
    pub path: Option<PathBuf>,
    pub loading: bool,
    pub valid: bool,
    pub image: Option<Arc<DecodedImage>>,
    pub epoch: u64,
    /// A target different from the loaded path is queued
    pub has_newer_target: bool,
}

pub struct PictureSlot {
    index: usize,
    state: Mutex<SlotState>,
    loaded: Condvar,
}

impl PictureSlot {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            state: Mutex::new(SlotState::default()),
            loaded: Condvar::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Record the path to load next; `None` drops a queued target
    pub fn set_target(&self, path: Option<&Path>) {
        self.state.lock().requested = path.map(Path::to_path_buf);
    }

    /// Start loading the queued target.
    ///
    /// A target equal to the loaded path is a cache hit: the target is
    /// cleared and no decode is requested.
    pub fn begin_load(
        self: &Arc<Self>,
        source: &dyn ImageSource,
        tasks: &TaskSender,
        working: &AtomicBool,
    ) -> BeginLoad {
        let mut state = self.state.lock();
        if !working.load(Ordering::Acquire) {
            return BeginLoad::Idle;
        }
        let Some(path) = state.requested.take() else {
            return BeginLoad::Idle;
        };
        if state.loaded_path.as_ref() == Some(&path) {
            tracing::debug!(slot = self.index, "Cache hit: {}", path.display());
            return match state.in_flight {
                Some(epoch) => BeginLoad::Pending { epoch },
                None => BeginLoad::Cached,
            };
        }

        state.epoch += 1;
        let epoch = state.epoch;
        state.loaded_path = Some(path.clone());
        state.valid = false;
        state.image = None;
        state.in_flight = Some(epoch);
        drop(state);

        tracing::debug!(slot = self.index, epoch, "Load: {}", path.display());
        tasks.post(ViewerTask::LoadStarted {
            slot: self.index,
            epoch,
        });

        let index = self.index;
        let progress = tasks.clone();
        let slot = Arc::clone(self);
        source.request_image(
            &path,
            Box::new(move |percent| {
                progress.post(ViewerTask::LoadProgress {
                    slot: index,
                    epoch,
                    percent,
                })
            }),
            Box::new(move |image| slot.complete(epoch, image)),
        );

        BeginLoad::Pending { epoch }
    }

    /// Decode completion; runs on the decoder's thread
    pub fn complete(&self, epoch: u64, image: Option<DecodedImage>) {
        let mut state = self.state.lock();
        if state.in_flight != Some(epoch) {
            tracing::debug!(slot = self.index, epoch, "Dropping result of superseded load");
            return;
        }
        state.in_flight = None;
        if epoch == state.epoch {
            match image.filter(DecodedImage::is_valid) {
                Some(image) => {
                    state.image = Some(Arc::new(image));
                    state.valid = true;
                }
                None => {
                    state.image = None;
                    state.valid = false;
                }
            }
        } else {
            tracing::debug!(slot = self.index, epoch, "Slot was cleared during load");
        }
        self.loaded.notify_all();
    }

    /// Block until the running decode finishes or `working` is cleared,
    /// re-checking `working` every `poll`
    pub fn wait_until_loaded(&self, working: &AtomicBool, poll: Duration) {
        let mut state = self.state.lock();
        while state.in_flight.is_some() && working.load(Ordering::Acquire) {
            self.loaded.wait_for(&mut state, poll);
        }
    }

    /// Forget the loaded picture and any queued target.
    ///
    /// A running decode keeps its place so the loader still waits for it,
    /// but its result is discarded.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.requested = None;
        state.loaded_path = None;
        state.valid = false;
        state.image = None;
        state.epoch += 1;
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.state.lock().valid
    }

    pub fn epoch(&self) -> u64 {
        self.state.lock().epoch
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        let state = self.state.lock();
        SlotSnapshot {
            path: state.loaded_path.clone(),
            loading: state.in_flight.is_some(),
            valid: state.valid,
            image: state.image.clone(),
            epoch: state.epoch,
            has_newer_target: state
                .requested
                .as_ref()
                .is_some_and(|r| state.loaded_path.as_ref() != Some(r)),
        }
    }
}

impl std::fmt::Debug for PictureSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PictureSlot")
            .field("index", &self.index)
            .field("state", &*self.state.lock())
            .finish()
    }
}

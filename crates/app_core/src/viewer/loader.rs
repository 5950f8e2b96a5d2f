//! Background picture loader
//!
//! One worker thread serves the three slots in a fixed cycle, CURRENT first,
//! then NEXT, then PREV. Only one decode runs at a time. A new target resets
//! the cycle so the picture on screen is always attempted first, once the
//! leg in progress has finished.

use super::slot::{BeginLoad, PictureSlot, SlotRing, SlotRole};
use super::task::{TaskSender, ViewerTask};
use crate::image_loader::ImageSource;
use crate::ViewerError;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Service order of one loader pass
const CYCLE: [SlotRole; 3] = [SlotRole::Current, SlotRole::Next, SlotRole::Prev];

/// Paths each role should hold
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadTargets {
    pub prev: Option<PathBuf>,
    pub current: Option<PathBuf>,
    pub next: Option<PathBuf>,
}

impl LoadTargets {
    fn get(&self, role: SlotRole) -> Option<&PathBuf> {
        match role {
            SlotRole::Prev => self.prev.as_ref(),
            SlotRole::Current => self.current.as_ref(),
            SlotRole::Next => self.next.as_ref(),
        }
    }
}

struct LoaderState {
    running: bool,
    /// Position in [`CYCLE`]; a full pass is done when it reaches the end
    cursor: usize,
    ring: SlotRing,
}

struct LoaderShared {
    state: Mutex<LoaderState>,
    wake: Condvar,
    slots: [Arc<PictureSlot>; 3],
    source: Arc<dyn ImageSource>,
    tasks: TaskSender,
    working: Arc<AtomicBool>,
    poll: Duration,
}

pub struct PictureLoader {
    shared: Arc<LoaderShared>,
    worker: Option<JoinHandle<()>>,
}

impl PictureLoader {
    pub fn new(
        slots: [Arc<PictureSlot>; 3],
        source: Arc<dyn ImageSource>,
        tasks: TaskSender,
        working: Arc<AtomicBool>,
        poll: Duration,
    ) -> Result<Self, ViewerError> {
        let shared = Arc::new(LoaderShared {
            state: Mutex::new(LoaderState {
                running: true,
                cursor: CYCLE.len(),
                ring: SlotRing::new(),
            }),
            wake: Condvar::new(),
            slots,
            source,
            tasks,
            working,
            poll,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("picture-loader".into())
            .spawn(move || run(&worker_shared))
            .map_err(|e| ViewerError::Thread(e.to_string()))?;

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Queue new targets and restart the cycle from CURRENT.
    ///
    /// Returns true when the CURRENT slot is still busy with an earlier
    /// decode.
    pub fn set_target(&self, ring: SlotRing, targets: &LoadTargets) -> bool {
        let mut state = self.shared.state.lock();
        for role in SlotRole::ALL {
            self.shared.slots[ring.index(role)].set_target(targets.get(role).map(PathBuf::as_path));
        }
        state.ring = ring;
        state.cursor = 0;
        let busy = self.shared.slots[ring.index(SlotRole::Current)].is_loading();
        self.shared.wake.notify_one();
        drop(state);

        tracing::debug!(current = ?targets.current, busy, "Loader target set");
        busy
    }

    /// Stop the worker and wait for it to exit
    pub fn exit(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        {
            let mut state = self.shared.state.lock();
            state.running = false;
            self.shared.wake.notify_all();
        }
        if worker.join().is_err() {
            tracing::error!("Picture loader panicked");
        }
        tracing::debug!("Picture loader stopped");
    }
}

impl Drop for PictureLoader {
    fn drop(&mut self) {
        self.exit();
    }
}

fn run(shared: &LoaderShared) {
    let mut state = shared.state.lock();
    while state.running {
        if state.cursor >= CYCLE.len() {
            shared.wake.wait(&mut state);
            continue;
        }
        let role = CYCLE[state.cursor];
        state.cursor += 1;
        let slot = Arc::clone(&shared.slots[state.ring.index(role)]);

        // Targets and ring only change under this lock, so the decode
        // started here is the one the current ring asks for
        let BeginLoad::Pending { epoch } = slot.begin_load(shared.source.as_ref(), &shared.tasks, &shared.working)
        else {
            continue;
        };
        MutexGuard::unlocked(&mut state, || wait_for_slot(shared, &slot, epoch));
    }
}

/// Second half of a leg: wait for the slot's decode and report it
fn wait_for_slot(shared: &LoaderShared, slot: &PictureSlot, epoch: u64) {
    slot.wait_until_loaded(&shared.working, shared.poll);
    if shared.working.load(std::sync::atomic::Ordering::Acquire) {
        shared.tasks.post(ViewerTask::SlotLoaded {
            slot: slot.index(),
            epoch,
        });
    }
}

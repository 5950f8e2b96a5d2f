//! Work posted to the interaction thread
//!
//! Loader and decoder threads never touch the display. They post a
//! [`ViewerTask`] and the interaction thread applies it.

use crate::file_iterator::FileIterator;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::fmt;
use std::path::PathBuf;

pub enum ViewerTask {
    /// A slot started decoding a new file
    LoadStarted { slot: usize, epoch: u64 },
    /// Decode progress in percent
    LoadProgress { slot: usize, epoch: u64, percent: f32 },
    /// The loader finished waiting on a slot
    SlotLoaded { slot: usize, epoch: u64 },
    /// Folder of a file opened in single-picture mode was scanned;
    /// `None` when the scan failed
    FolderScanned {
        path: PathBuf,
        iterator: Option<Box<dyn FileIterator>>,
    },
}

impl fmt::Debug for ViewerTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerTask::LoadStarted { slot, epoch } => f
                .debug_struct("LoadStarted")
                .field("slot", slot)
                .field("epoch", epoch)
                .finish(),
            ViewerTask::LoadProgress { slot, epoch, percent } => f
                .debug_struct("LoadProgress")
                .field("slot", slot)
                .field("epoch", epoch)
                .field("percent", percent)
                .finish(),
            ViewerTask::SlotLoaded { slot, epoch } => f
                .debug_struct("SlotLoaded")
                .field("slot", slot)
                .field("epoch", epoch)
                .finish(),
            ViewerTask::FolderScanned { path, iterator } => f
                .debug_struct("FolderScanned")
                .field("path", path)
                .field("len", &iterator.as_ref().map(|it| it.len()))
                .finish(),
        }
    }
}

/// Handle for posting tasks from any thread
#[derive(Clone)]
pub struct TaskSender {
    tx: Sender<ViewerTask>,
}

impl TaskSender {
    pub fn new(tx: Sender<ViewerTask>) -> Self {
        Self { tx }
    }

    /// Post a task; dropped silently once the interaction thread is gone
    pub fn post(&self, task: ViewerTask) {
        if let Err(e) = self.tx.send(task) {
            tracing::trace!(task = ?e.into_inner(), "Task dropped, receiver gone");
        }
    }
}

pub fn task_channel() -> (TaskSender, Receiver<ViewerTask>) {
    let (tx, rx) = unbounded();
    (TaskSender::new(tx), rx)
}

//! Opening, switching, closing and deleting pictures

use super::chrome::CONFIRM_DELETE_KEY;
use super::loader::LoadTargets;
use super::slot::SlotRole;
use super::task::ViewerTask;
use super::{PictureViewer, SlotView, ViewerChrome, APP_NAME};
use crate::config::ViewerMode;
use crate::events::DomainEvent;
use crate::file_iterator::{neighbor_paths, FileIterator, PathListIterator};
use crate::ViewerError;
use std::path::{Path, PathBuf};

impl<C: ViewerChrome> PictureViewer<C> {
    /// Replace the file list the viewer walks through
    pub fn set_iterator(&mut self, iterator: Box<dyn FileIterator>) {
        tracing::debug!(len = iterator.len(), index = iterator.index(), "File iterator set");
        self.iterator = Some(iterator);
    }

    /// Show `path` in the CURRENT slot and preload its neighbors
    pub fn open(&mut self, path: &Path) {
        if !self.is_working() {
            return;
        }
        tracing::info!("Open picture: {}", path.display());

        self.opened = Some(path.to_path_buf());
        self.zoom_mode = false;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.chrome.set_title(&format!("{} - {}", name, APP_NAME));
        self.chrome.show_unsupported_tip(false);
        self.chrome.show_empty_tip(false);
        self.chrome.show_loading_tip(false);

        let active = self.active();
        let snap = self.slots[active].snapshot();
        let same_picture = snap.path.as_deref() == Some(path);
        if !same_picture && self.views[active].image.is_some() {
            self.views[active].image = None;
            self.chrome.set_slot_image(active, None);
        }

        if self.load_targets(path) {
            self.chrome.set_loading_progress(0.0);
            self.chrome.show_loading_tip(true);
        }

        if self.views[active].image.is_some() {
            self.reset_size(active);
        } else {
            if same_picture && !snap.loading && !snap.valid {
                self.chrome.show_unsupported_tip(true);
            }
            self.update_controls();
        }
        self.update_labels();
        self.chrome.show_viewer();

        if self.mode == ViewerMode::Single && self.iterator.is_none() && !self.scanning {
            self.scan_folder(path);
        }
    }

    /// Hand the loader `current` plus the iterator's neighbors.
    /// Returns true when the CURRENT slot is still busy.
    fn load_targets(&mut self, current: &Path) -> bool {
        let (prev, next) = match self.iterator.as_deref_mut() {
            Some(iter) => neighbor_paths(iter),
            None => (None, None),
        };
        for index in 0..self.slots.len() {
            self.cancel_loading_tip(index);
        }
        let targets = LoadTargets {
            prev,
            current: Some(current.to_path_buf()),
            next,
        };
        self.loader.set_target(self.ring, &targets)
    }

    /// Step to the next picture; false at the end of the list
    pub fn open_next(&mut self) -> bool {
        let Some(path) = self.step(|iter| iter.next()) else {
            return false;
        };
        let recycled = self.ring.rotate_next();
        self.recycle_slot(recycled);
        self.reset_size(self.ring.index(SlotRole::Prev));
        self.open(&path);
        true
    }

    /// Step to the previous picture; false at the start of the list
    pub fn open_prev(&mut self) -> bool {
        let Some(path) = self.step(|iter| iter.prev()) else {
            return false;
        };
        let recycled = self.ring.rotate_prev();
        self.recycle_slot(recycled);
        self.reset_size(self.ring.index(SlotRole::Next));
        self.open(&path);
        true
    }

    fn step(&mut self, advance: impl FnOnce(&mut dyn FileIterator) -> bool) -> Option<PathBuf> {
        let iter = self.iterator.as_deref_mut()?;
        if !advance(iter) {
            return None;
        }
        iter.filepath().map(Path::to_path_buf)
    }

    /// Drop everything a slot holds so it can take a new role
    fn recycle_slot(&mut self, index: usize) {
        self.cancel_loading_tip(index);
        self.slots[index].clear();
        self.views[index] = SlotView::default();
        self.chrome.set_slot_image(index, None);
    }

    /// Hide the viewer and release the file list
    pub fn close(&mut self) {
        tracing::info!("Viewer closed");
        self.chrome.set_title(APP_NAME);
        self.zoom_mode = false;
        self.reset_size(self.active());
        self.chrome.hide_viewer();
        self.opened = None;
        self.iterator = None;
        self.update_controls();
    }

    /// Back button: single-picture mode hands over to the library browser
    pub fn back(&mut self) {
        if self.mode == ViewerMode::Single {
            self.mode = ViewerMode::Full;
            self.chrome.show_main_view();
        }
        self.close();
    }

    /// Move the picture on screen to the trash after confirmation.
    ///
    /// A failed delete leaves the viewer untouched and returns the error.
    pub fn delete_current(&mut self) -> Result<(), ViewerError> {
        let Some(path) = self.opened.clone() else {
            return Ok(());
        };
        if self.filer.confirm_delete && !self.chrome.confirm(CONFIRM_DELETE_KEY) {
            tracing::debug!("Delete cancelled: {}", path.display());
            return Ok(());
        }

        self.files
            .delete(std::slice::from_ref(&path), self.filer.use_recycle_bin)?;
        tracing::info!(trash = self.filer.use_recycle_bin, "Deleted: {}", path.display());

        self.recycle_slot(self.active());
        let next = match self.iterator.as_deref_mut() {
            Some(iter) => {
                iter.unlink();
                iter.filepath().map(Path::to_path_buf)
            }
            None => None,
        };
        self.index.delete_files(std::slice::from_ref(&path));
        self.events.emit(DomainEvent::FileDeleted(path));

        match next {
            Some(next) => self.open(&next),
            None => {
                self.chrome.show_empty_tip(true);
                match self.mode {
                    ViewerMode::Single => {
                        tracing::info!("Last picture deleted, quitting");
                        self.quit = true;
                        self.chrome.quit();
                    }
                    ViewerMode::Full => self.close(),
                }
            }
        }
        Ok(())
    }

    pub fn show_info(&mut self) {
        if let Some(path) = self.opened.clone() {
            self.chrome.show_info(&path);
        }
    }

    /// Scan the picture's folder in the background to build a file list
    fn scan_folder(&mut self, path: &Path) {
        let file = path.to_path_buf();
        let tasks = self.tasks.clone();
        let spawned = std::thread::Builder::new()
            .name("folder-scanner".into())
            .spawn(move || {
                let iterator = match app_fs::scan_folder_of(&file) {
                    Ok(scan) => {
                        tracing::debug!(files = scan.files.len(), "Folder scanned");
                        Some(Box::new(PathListIterator::from(scan)) as Box<dyn FileIterator>)
                    }
                    Err(e) => {
                        tracing::warn!("Folder scan failed for {}: {}", file.display(), e);
                        None
                    }
                };
                tasks.post(ViewerTask::FolderScanned { path: file, iterator });
            });
        match spawned {
            Ok(_) => self.scanning = true,
            Err(e) => tracing::error!("Failed to spawn folder scanner: {}", e),
        }
    }

    pub(super) fn on_folder_scanned(&mut self, path: PathBuf, iterator: Option<Box<dyn FileIterator>>) {
        self.scanning = false;
        if self.iterator.is_some() {
            return;
        }
        let Some(opened) = self.opened.clone() else {
            return;
        };
        if opened != path {
            // Another picture was opened while this scan ran
            tracing::debug!("Discarding scan of {}", path.display());
            if self.mode == ViewerMode::Single {
                self.scan_folder(&opened);
            }
            return;
        }
        let Some(iterator) = iterator else {
            return;
        };
        self.set_iterator(iterator);
        if self.load_targets(&path) && self.views[self.active()].image.is_none() {
            self.chrome.show_loading_tip(true);
        }
        self.update_controls();
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{harness, Harness};
    use super::*;
    use std::sync::{Arc, Weak};

    fn abc(mode: ViewerMode) -> Harness {
        let mut h = harness(
            mode,
            &[("a.png", 800, 600), ("b.png", 1600, 1200), ("c.png", 400, 300)],
        );
        h.open_list(&["a.png", "b.png", "c.png"], 0);
        assert!(h.wait_for_picture());
        h
    }

    #[test]
    fn test_open_sets_title_and_preloads_neighbors() {
        let mut h = abc(ViewerMode::Full);
        h.settle();
        assert_eq!(h.viewer.chrome().title, "a.png - LC-Finder");
        assert!(h.viewer.chrome().viewer_visible);
        assert_eq!(h.requests(), vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);

        let next = h.viewer.ring().index(SlotRole::Next);
        assert_eq!(h.viewer.chrome().images[next], Some((1600, 1200)));
        let controls = h.viewer.chrome().controls.unwrap();
        assert!(!controls.prev_visible);
        assert!(controls.next_visible);
    }

    #[test]
    fn test_rotation_round_trip() {
        let mut h = abc(ViewerMode::Full);
        let start = h.viewer.ring();
        assert!(h.viewer.open_next());
        assert!(h.viewer.open_next());
        assert!(!h.viewer.open_next());
        assert!(h.viewer.open_prev());
        assert!(h.viewer.open_prev());
        assert!(!h.viewer.open_prev());
        assert_eq!(h.viewer.ring(), start);
        assert_eq!(h.viewer.iterator().unwrap().index(), 0);
    }

    #[test]
    fn test_recycled_slot_releases_picture() {
        let mut h = abc(ViewerMode::Full);
        h.settle();
        let a_slot = h.viewer.ring().index(SlotRole::Current);
        let a_image: Weak<_> = Arc::downgrade(h.viewer.slot(SlotRole::Current).snapshot().image.as_ref().unwrap());

        assert!(h.viewer.open_next());
        h.settle();
        assert!(h.viewer.open_next());
        h.settle();

        assert_eq!(h.viewer.iterator().unwrap().index(), 2);
        assert_eq!(h.viewer.ring().role_of(a_slot), SlotRole::Next);
        assert!(h.viewer.slot(SlotRole::Next).snapshot().path.is_none());
        assert_eq!(h.viewer.chrome().images[a_slot], None);
        assert!(a_image.upgrade().is_none());
    }

    #[test]
    fn test_next_uses_preloaded_picture() {
        let mut h = abc(ViewerMode::Full);
        h.settle();
        assert!(h.viewer.open_next());
        // Already decoded while it was the NEXT slot
        assert_eq!(h.viewer.picture_size(), Some((1600, 1200)));
        assert!((h.viewer.min_scale() - 0.4).abs() < 1e-12);
        assert_eq!(h.viewer.chrome().title, "b.png - LC-Finder");
    }

    #[test]
    fn test_unsupported_file_shows_tip() {
        let mut h = harness(ViewerMode::Full, &[("a.png", 800, 600)]);
        h.open_list(&["a.png", "broken.png"], 1);
        h.pump_until(|v| v.chrome().unsupported_tip);
        assert!(h.viewer.chrome().unsupported_tip);
        assert_eq!(h.viewer.picture_size(), None);
        assert!(!h.viewer.chrome().controls.unwrap().reset_enabled);
    }

    #[test]
    fn test_delete_moves_to_next_and_notifies() {
        let mut h = abc(ViewerMode::Full);
        h.viewer.delete_current().unwrap();

        assert_eq!(h.viewer.chrome().confirms, vec![CONFIRM_DELETE_KEY.to_string()]);
        assert_eq!(h.deleted(), vec![(PathBuf::from("a.png"), true)]);
        assert_eq!(h.indexed_deletes(), vec![PathBuf::from("a.png")]);
        assert_eq!(h.events.try_recv().unwrap(), DomainEvent::FileDeleted(PathBuf::from("a.png")));

        assert_eq!(h.viewer.iterator().unwrap().len(), 2);
        assert_eq!(h.viewer.current_path(), Some(Path::new("b.png")));
        assert!(h.wait_for_picture());
        assert_eq!(h.viewer.picture_size(), Some((1600, 1200)));
    }

    #[test]
    fn test_delete_declined_keeps_file() {
        let mut h = abc(ViewerMode::Full);
        h.viewer.chrome_mut().confirm_answer = false;
        h.viewer.delete_current().unwrap();
        assert!(h.deleted().is_empty());
        assert_eq!(h.viewer.iterator().unwrap().len(), 3);
        assert!(h.events.try_recv().is_err());
    }

    #[test]
    fn test_delete_failure_aborts() {
        let mut h = abc(ViewerMode::Full);
        h.fail_deletes();
        let err = h.viewer.delete_current().unwrap_err();
        assert!(matches!(err, ViewerError::FileOperation(_)));
        assert_eq!(h.viewer.iterator().unwrap().len(), 3);
        assert!(h.indexed_deletes().is_empty());
        assert!(h.viewer.picture_size().is_some());
    }

    #[test]
    fn test_delete_last_picture_closes() {
        let mut h = harness(ViewerMode::Full, &[("only.png", 800, 600)]);
        h.open_list(&["only.png"], 0);
        assert!(h.wait_for_picture());
        h.viewer.delete_current().unwrap();

        assert_eq!(h.viewer.iterator().map(|it| it.len()), None);
        assert!(!h.viewer.is_open());
        assert!(!h.viewer.chrome().viewer_visible);
        assert!(h.viewer.chrome().empty_tip);
        assert_eq!(h.viewer.chrome().title, "LC-Finder");
        assert!(!h.viewer.should_quit());
    }

    #[test]
    fn test_delete_last_picture_quits_single_mode() {
        let mut h = harness(ViewerMode::Single, &[("only.png", 800, 600)]);
        h.open_list(&["only.png"], 0);
        assert!(h.wait_for_picture());
        h.viewer.delete_current().unwrap();

        assert_eq!(h.viewer.iterator().unwrap().len(), 0);
        assert!(h.viewer.should_quit());
        assert!(h.viewer.chrome().quit);
    }

    #[test]
    fn test_back_from_single_mode_shows_browser() {
        let mut h = abc(ViewerMode::Single);
        h.viewer.back();
        assert_eq!(h.viewer.mode(), ViewerMode::Full);
        assert!(h.viewer.chrome().main_view_shown);
        assert!(!h.viewer.is_open());
        assert!(h.viewer.iterator().is_none());
    }

    #[test]
    fn test_single_mode_scans_folder() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["img1.png", "img2.png", "img10.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let opened = dir.path().join("img2.png");
        let mut h = harness(ViewerMode::Single, &[]);
        h.add_picture(&opened, 320, 240);

        h.viewer.open(&opened);
        assert!(h.viewer.iterator().is_none());
        h.pump_until(|v| v.iterator().is_some());

        let iter = h.viewer.iterator().unwrap();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.index(), 1);
        let controls = h.viewer.chrome().controls.unwrap();
        assert!(controls.prev_visible && controls.next_visible);

        h.settle();
        let requested = h.requests();
        assert!(requested.contains(&dir.path().join("img1.png")));
        assert!(requested.contains(&dir.path().join("img10.png")));
    }

    #[test]
    fn test_failed_scan_does_not_block_later_scans() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let mut h = harness(ViewerMode::Single, &[]);
        h.viewer.open(Path::new("/definitely/missing/dir/x.png"));
        assert!(h.viewer.scanning);
        assert!(h.pump_until(|v| !v.scanning));
        assert!(h.viewer.iterator().is_none());

        let opened = dir.path().join("b.png");
        h.add_picture(&opened, 320, 240);
        h.viewer.open(&opened);
        assert!(h.pump_until(|v| v.iterator().is_some()));
        let iter = h.viewer.iterator().unwrap();
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.filepath(), Some(opened.as_path()));
    }

    #[test]
    fn test_open_during_scan_rescans_new_folder() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("a.png"), b"").unwrap();
        for name in ["x.png", "y.png", "z.png"] {
            std::fs::write(second.path().join(name), b"").unwrap();
        }
        let opened = second.path().join("y.png");
        let mut h = harness(ViewerMode::Single, &[]);
        h.add_picture(&opened, 320, 240);

        h.viewer.open(&first.path().join("a.png"));
        h.viewer.open(&opened);
        assert!(h.pump_until(|v| v.iterator().is_some()));

        let iter = h.viewer.iterator().unwrap();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.index(), 1);
        assert_eq!(iter.filepath(), Some(opened.as_path()));
    }

    #[test]
    fn test_info_shows_current_path() {
        let mut h = abc(ViewerMode::Full);
        h.viewer.show_info();
        assert_eq!(h.viewer.chrome().info.as_deref(), Some(Path::new("a.png")));
    }
}

//! Collaborators the viewer drives
//!
//! The viewer never draws anything itself. Widget changes go through
//! [`ViewerChrome`], which is only ever called on the interaction thread.

use super::geometry::{Background, Point};
use crate::image_loader::DecodedImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// I18n key of the delete confirmation title
pub const CONFIRM_DELETE_KEY: &str = "browser.dialog.title.confirm_delete";

/// Icon shown on the reset-size button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetIcon {
    /// Picture rests at its fit-to-view scale
    Fit,
    /// Picture is zoomed
    Actual,
}

/// State of the viewer's buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub prev_visible: bool,
    pub next_visible: bool,
    pub zoom_in_enabled: bool,
    pub zoom_out_enabled: bool,
    pub reset_enabled: bool,
    pub reset_icon: ResetIcon,
}

/// What the labels overlay shows
#[derive(Debug, Clone, PartialEq)]
pub struct LabelsContext {
    pub path: Option<PathBuf>,
    pub focus: Point,
    pub offset: Point,
    pub scale: f64,
    pub image_size: Option<(u32, u32)>,
}

/// Display side of the picture viewer
pub trait ViewerChrome {
    fn set_title(&mut self, title: &str);

    fn show_viewer(&mut self);

    fn hide_viewer(&mut self);

    /// Bring the library browser back (single-picture mode leaving the viewer)
    fn show_main_view(&mut self) {}

    /// Set or clear the picture drawn by a slot widget
    fn set_slot_image(&mut self, slot: usize, image: Option<Arc<DecodedImage>>);

    fn set_slot_background(&mut self, slot: usize, background: &Background);

    /// Horizontal position of a slot widget; `None` puts it back at rest
    fn set_slot_offset(&mut self, slot: usize, x: Option<f64>);

    fn show_loading_tip(&mut self, visible: bool);

    fn set_loading_progress(&mut self, percent: f32);

    fn show_unsupported_tip(&mut self, visible: bool);

    fn show_empty_tip(&mut self, visible: bool);

    fn update_controls(&mut self, controls: &Controls);

    fn update_labels(&mut self, _labels: &LabelsContext) {}

    fn set_pointer_capture(&mut self, _captured: bool) {}

    fn set_touch_capture(&mut self, _point: Option<i32>) {}

    /// Blocking confirmation dialog
    fn confirm(&mut self, title_key: &str) -> bool;

    fn show_info(&mut self, path: &Path);

    /// Leave the application
    fn quit(&mut self);
}

/// The picture library's file index
pub trait FileIndex {
    fn delete_files(&mut self, paths: &[PathBuf]);
}

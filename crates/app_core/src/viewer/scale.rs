//! Scale, focus and placement of the pictures

use super::geometry::{anchor_axis, fit_scale, layout_axis, Background, Point, Size};
use super::interaction::DragAxes;
use super::{PictureViewer, ViewerChrome};

impl<C: ViewerChrome> PictureViewer<C> {
    /// Fit a slot's picture to the viewport; the fitted scale becomes the
    /// slot's minimum. No-op without a decoded picture.
    pub(super) fn reset_size(&mut self, index: usize) {
        let Some(image) = self.views[index].image_size() else {
            return;
        };
        let scale = fit_scale(image, self.viewport, &self.config);
        self.views[index].scale = scale;
        self.views[index].min_scale = scale;
        if index == self.active() {
            self.offset = self.viewport.center();
            self.origin = image.center();
        }
        self.apply_scale(index, scale);
    }

    /// Clamp to `[min_scale, max_scale]` and lay out, leaving zoom mode alone
    fn apply_scale(&mut self, index: usize, scale: f64) {
        let view = &mut self.views[index];
        view.scale = if scale <= view.min_scale {
            view.min_scale
        } else {
            scale.min(self.config.max_scale)
        };
        if view.image.is_none() {
            return;
        }
        self.update_position(index);
        if index == self.active() {
            self.update_controls();
            self.update_labels();
        }
    }

    /// Rescale the picture on screen. Zoom mode is on whenever the result is
    /// above the fit-to-view scale.
    pub fn set_scale(&mut self, scale: f64) {
        let active = self.active();
        self.zoom_mode = scale > self.views[active].min_scale;
        self.apply_scale(active, scale);
    }

    /// One zoom step in, around the current offset
    pub fn zoom_in(&mut self) {
        if self.picture_size().is_some() {
            self.set_scale(self.scale() * (1.0 + self.config.scale_step));
        }
    }

    /// One zoom step out, around the current offset
    pub fn zoom_out(&mut self) {
        if self.picture_size().is_some() {
            self.set_scale(self.scale() * (1.0 - self.config.scale_step));
        }
    }

    /// Zoom button: step in around the viewport center
    pub fn zoom_in_centered(&mut self) {
        self.reset_offset();
        self.zoom_in();
    }

    pub fn zoom_out_centered(&mut self) {
        self.reset_offset();
        self.zoom_out();
    }

    /// Toggle between fit-to-view and actual size
    pub fn toggle_reset_size(&mut self) {
        let view = &self.views[self.active()];
        if view.image.is_none() {
            return;
        }
        let scale = if view.scale != view.min_scale { view.min_scale } else { 1.0 };
        self.reset_offset();
        self.set_scale(scale);
    }

    fn reset_offset(&mut self) {
        self.offset = self.viewport.center();
        self.update_labels();
    }

    /// Lay out a slot's background. Only the CURRENT slot follows the
    /// viewer's focus; the neighbors are shown centered.
    pub(super) fn update_position(&mut self, index: usize) {
        let Some(image) = self.views[index].image_size() else {
            return;
        };
        let scale = self.views[index].scale;
        let size = image.scaled(scale);

        if index != self.active() {
            let center = self.viewport.center();
            let x = layout_axis(image.width, scale, self.viewport.width, image.width / 2.0, center.x);
            let y = layout_axis(image.height, scale, self.viewport.height, image.height / 2.0, center.y);
            self.chrome.set_slot_background(
                index,
                &Background {
                    size,
                    x: x.position,
                    y: y.position,
                },
            );
            return;
        }

        let x = layout_axis(image.width, scale, self.viewport.width, self.origin.x, self.offset.x);
        let y = layout_axis(image.height, scale, self.viewport.height, self.origin.y, self.offset.y);
        self.focus = Point::new(x.focus, y.focus);
        self.origin = Point::new(x.origin, y.origin);
        self.draggable = DragAxes {
            x: x.draggable,
            y: y.draggable,
        };
        self.chrome.set_slot_background(
            index,
            &Background {
                size,
                x: x.position,
                y: y.position,
            },
        );
        self.update_labels();
    }

    /// Move the focus (scaled coordinates) and re-clamp
    pub(super) fn set_focus_point(&mut self, focus: Point) {
        let active = self.active();
        if self.views[active].image.is_none() {
            return;
        }
        let scale = self.views[active].scale;
        self.origin = Point::new(focus.x / scale, focus.y / scale);
        self.update_position(active);
    }

    /// Pin the picture point under `pointer` so the next rescale zooms
    /// around it
    pub(super) fn anchor_at(&mut self, pointer: Point) {
        let active = self.active();
        let Some(image) = self.views[active].image_size() else {
            return;
        };
        let scale = self.views[active].scale;
        self.origin = Point::new(
            anchor_axis(image.width, scale, self.viewport.width, self.focus.x, self.offset.x, pointer.x),
            anchor_axis(image.height, scale, self.viewport.height, self.focus.y, self.offset.y, pointer.y),
        );
        self.offset = pointer;
        self.focus = Point::new(self.origin.x * scale, self.origin.y * scale);
    }

    /// New viewport size: keep the zoomed view in place, otherwise refit
    pub fn resize(&mut self, viewport: Size) {
        tracing::debug!(width = viewport.width, height = viewport.height, "Viewer resized");
        self.viewport = viewport;
        for index in 0..self.views.len() {
            if self.zoom_mode {
                self.update_position(index);
            } else {
                self.reset_size(index);
            }
        }
    }

    /// Size of the picture on screen, if one is shown
    pub fn picture_size(&self) -> Option<(u32, u32)> {
        self.views[self.active()]
            .image
            .as_ref()
            .map(|image| (image.width, image.height))
    }
}

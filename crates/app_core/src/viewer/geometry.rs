//! Picture geometry
//!
//! Pure math mapping a picture's scale and focus point onto the background
//! size and position of its slot widget. Each axis is handled on its own.
//!
//! * focus: point of the scaled picture shown at `offset`
//! * origin: the same point in unscaled picture coordinates
//! * offset: where in the viewport the focus point sits

use crate::config::ViewerConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn scaled(self, scale: f64) -> Size {
        Size::new(self.width * scale, self.height * scale)
    }
}

/// Background position on one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundPosition {
    Center,
    Px(f64),
}

/// Background of a slot widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Background {
    pub size: Size,
    pub x: BackgroundPosition,
    pub y: BackgroundPosition,
}

/// Area a picture is fitted into: the viewport minus the margin, per axis,
/// never smaller than the minimum extent
pub fn fit_area(viewport: Size, config: &ViewerConfig) -> Size {
    Size::new(
        (viewport.width - config.fit_margin).max(config.fit_min_extent),
        (viewport.height - config.fit_margin).max(config.fit_min_extent),
    )
}

/// Fit-to-view scale, in `[min_scale_floor, 1.0]`.
/// Pictures smaller than the fit area are shown at their actual size.
pub fn fit_scale(image: Size, viewport: Size, config: &ViewerConfig) -> f64 {
    if image.width <= 0.0 || image.height <= 0.0 {
        return 1.0;
    }
    let area = fit_area(viewport, config);
    if image.width < area.width && image.height < area.height {
        return 1.0;
    }
    let scale = (area.width / image.width).min(area.height / image.height);
    scale.max(config.min_scale_floor).min(1.0)
}

/// Layout of one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLayout {
    pub position: BackgroundPosition,
    /// The picture overflows the viewport, so dragging moves it
    pub draggable: bool,
    pub focus: f64,
    pub origin: f64,
}

/// Place one axis of a picture.
///
/// A picture that fits is centered. Otherwise the focus is projected from
/// `origin` and the visible window `[focus - offset, .. + viewport]` is kept
/// inside the picture. `origin` is only rewritten when that clamp moved the
/// focus, so rescaling back and forth does not drift.
pub fn layout_axis(image_len: f64, scale: f64, viewport_len: f64, origin: f64, offset: f64) -> AxisLayout {
    let scaled = image_len * scale;
    if scaled <= viewport_len {
        return AxisLayout {
            position: BackgroundPosition::Center,
            draggable: false,
            focus: scaled / 2.0,
            origin: image_len / 2.0,
        };
    }

    let focus = origin * scale;
    let start = focus - offset;
    let clamped = start.clamp(0.0, scaled - viewport_len);
    if clamped == start {
        return AxisLayout {
            position: BackgroundPosition::Px(-start),
            draggable: true,
            focus,
            origin,
        };
    }

    let focus = clamped + offset;
    AxisLayout {
        position: BackgroundPosition::Px(-clamped),
        draggable: true,
        focus,
        origin: focus / scale,
    }
}

/// Move the offset to `pointer` and return the origin of the picture point
/// currently under it, so that a following rescale keeps that point in place
pub fn anchor_axis(image_len: f64, scale: f64, viewport_len: f64, focus: f64, offset: f64, pointer: f64) -> f64 {
    let scaled = image_len * scale;
    let start = if scaled <= viewport_len {
        (scaled - viewport_len) / 2.0
    } else {
        focus - offset
    };
    (start + pointer) / scale
}

//! Shared geometric primitives and the map viewport transform.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle in screen pixels (`x`/`y` is the top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub const fn origin(self) -> ScreenPoint {
        ScreenPoint::new(self.x, self.y)
    }

    pub const fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Position on the map image in percent of its natural size, both axes in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MapPercent {
    pub x: f64,
    pub y: f64,
}

impl MapPercent {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn clamped(self) -> Self {
        Self::new(self.x.clamp(0.0, 100.0), self.y.clamp(0.0, 100.0))
    }
}

/// Translate + scale mapping from map-image pixels to container pixels.
///
/// `container = map * scale + translate`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub const fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            scale,
            translate_x,
            translate_y,
        }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Container-relative point to map-image pixels.
    pub fn container_to_map(&self, point: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(
            (point.x - self.translate_x) / self.scale,
            (point.y - self.translate_y) / self.scale,
        )
    }

    /// Map-image pixels to a container-relative point.
    pub fn map_to_container(&self, point: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(
            point.x * self.scale + self.translate_x,
            point.y * self.scale + self.translate_y,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TransformError {
    #[error("point ({x:.1}, {y:.1}) lies outside the map image")]
    OutOfBounds { x: f64, y: f64 },
}

/// Convert a screen point into a map-percent position.
///
/// The container origin is subtracted first, then translate and scale are
/// reversed. Points that land outside the image are rejected.
pub fn screen_to_map_percent(
    screen: ScreenPoint,
    container: Rect,
    transform: &Transform,
    image: Size,
) -> Result<MapPercent, TransformError> {
    let local = ScreenPoint::new(screen.x - container.x, screen.y - container.y);
    let map = transform.container_to_map(local);
    let width = if image.width > 0.0 { image.width } else { 1.0 };
    let height = if image.height > 0.0 { image.height } else { 1.0 };

    if map.x < 0.0 || map.x > width || map.y < 0.0 || map.y > height {
        return Err(TransformError::OutOfBounds { x: map.x, y: map.y });
    }

    Ok(MapPercent::new(map.x / width * 100.0, map.y / height * 100.0).clamped())
}

pub fn map_percent_to_screen(
    position: MapPercent,
    container: Rect,
    transform: &Transform,
    image: Size,
) -> ScreenPoint {
    let map = ScreenPoint::new(
        position.x / 100.0 * image.width,
        position.y / 100.0 * image.height,
    );
    let local = transform.map_to_container(map);
    ScreenPoint::new(local.x + container.x, local.y + container.y)
}

/// Translate that keeps the map point under `cursor` fixed when the scale
/// changes from `old_scale` to `new_scale`. `cursor` is container-relative.
pub fn zoom_translate_at_cursor(
    cursor: ScreenPoint,
    old_scale: f64,
    new_scale: f64,
    translate_x: f64,
    translate_y: f64,
) -> (f64, f64) {
    let map_x = (cursor.x - translate_x) / old_scale;
    let map_y = (cursor.y - translate_y) / old_scale;
    (cursor.x - map_x * new_scale, cursor.y - map_y * new_scale)
}

/// Allowed translate interval along one axis.
///
/// A map narrower than the container is pinned to the centered offset; a wider
/// one may move until `margin` pixels of container show past either edge.
pub fn clamp_span(container: f64, scaled: f64, margin: f64) -> (f64, f64) {
    if scaled <= container {
        let centered = (container - scaled) / 2.0;
        (centered, centered)
    } else {
        (container - scaled - margin, margin)
    }
}

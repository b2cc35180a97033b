//! Pan/zoom state of the map surface.

use crate::geometry::{
    clamp_span, map_percent_to_screen, screen_to_map_percent, zoom_translate_at_cursor, MapPercent,
    Rect, ScreenPoint, Size, Transform, TransformError,
};
use crate::input::PointerButton;

pub const MAX_SCALE: f64 = 4.0;
pub const DEFAULT_MIN_SCALE: f64 = 0.4;
pub const PAN_MARGIN_PX: f64 = 80.0;
pub const PAN_CLICK_THRESHOLD_PX: f64 = 5.0;
pub const BUTTON_ZOOM_FACTOR: f64 = 1.2;
const WHEEL_ZOOM_IN_FACTOR: f64 = 1.1;
const WHEEL_ZOOM_OUT_FACTOR: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanGesture {
    Idle,
    Panning {
        start_cursor: ScreenPoint,
        start_translate_x: f64,
        start_translate_y: f64,
        moved: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl PanBounds {
    pub fn contains(&self, translate_x: f64, translate_y: f64) -> bool {
        translate_x >= self.min_x
            && translate_x <= self.max_x
            && translate_y >= self.min_y
            && translate_y <= self.max_y
    }
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    container: Rect,
    image: Option<Size>,
    scale: f64,
    translate_x: f64,
    translate_y: f64,
    base_fit_scale: f64,
    min_scale: f64,
    gesture: PanGesture,
    suppress_next_click: bool,
}

impl ViewportController {
    pub fn new(container: Rect) -> Self {
        let mut viewport = Self {
            container,
            image: None,
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            base_fit_scale: 1.0,
            min_scale: DEFAULT_MIN_SCALE,
            gesture: PanGesture::Idle,
            suppress_next_click: false,
        };
        viewport.clamp_pan();
        viewport
    }

    pub const fn container(&self) -> Rect {
        self.container
    }

    pub const fn image_size(&self) -> Option<Size> {
        self.image
    }

    pub const fn scale(&self) -> f64 {
        self.scale
    }

    pub const fn min_scale(&self) -> f64 {
        self.min_scale
    }

    pub const fn base_fit_scale(&self) -> f64 {
        self.base_fit_scale
    }

    pub const fn translate(&self) -> (f64, f64) {
        (self.translate_x, self.translate_y)
    }

    pub const fn transform(&self) -> Transform {
        Transform::new(self.scale, self.translate_x, self.translate_y)
    }

    pub const fn gesture(&self) -> PanGesture {
        self.gesture
    }

    pub const fn is_panning(&self) -> bool {
        matches!(self.gesture, PanGesture::Panning { .. })
    }

    pub fn zoom_label(&self) -> String {
        format!("{}%", (self.scale * 100.0).round() as i64)
    }

    /// Unscaled size of the map layer; the container itself until an image is loaded.
    pub fn base_size(&self) -> Size {
        self.image.unwrap_or(self.container.size())
    }

    pub fn pan_bounds(&self) -> PanBounds {
        let base = self.base_size();
        let (min_x, max_x) = clamp_span(
            self.container.width.max(0.0),
            base.width * self.scale,
            PAN_MARGIN_PX,
        );
        let (min_y, max_y) = clamp_span(
            self.container.height.max(0.0),
            base.height * self.scale,
            PAN_MARGIN_PX,
        );
        PanBounds {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    fn clamp_pan(&mut self) {
        let bounds = self.pan_bounds();
        self.translate_x = self.translate_x.clamp(bounds.min_x, bounds.max_x);
        self.translate_y = self.translate_y.clamp(bounds.min_y, bounds.max_y);
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, MAX_SCALE)
    }

    pub fn set_container(&mut self, container: Rect) {
        self.container = container;
        self.clamp_pan();
    }

    /// Fit a freshly loaded map into the container.
    ///
    /// The fit scale never exceeds 1 and becomes the zoom-out floor when it is
    /// below the default 40% floor.
    pub fn load_image(&mut self, natural: Size) {
        if natural.is_empty() {
            tracing::warn!(?natural, "ignoring map image without a natural size");
            return;
        }

        let container_width = self.container.width.max(1.0);
        let container_height = self.container.height.max(1.0);
        let fit = (container_width / natural.width).min(container_height / natural.height);

        self.image = Some(natural);
        self.base_fit_scale = fit.min(1.0);
        self.min_scale = DEFAULT_MIN_SCALE.min(self.base_fit_scale);
        self.scale = self.base_fit_scale;
        self.translate_x = 0.0;
        self.translate_y = 0.0;
        self.gesture = PanGesture::Idle;
        self.clamp_pan();

        tracing::debug!(
            width = natural.width,
            height = natural.height,
            scale = self.scale,
            min_scale = self.min_scale,
            "map image fitted to container"
        );
    }

    pub fn clear_image(&mut self) {
        self.image = None;
        self.scale = 1.0;
        self.base_fit_scale = 1.0;
        self.min_scale = DEFAULT_MIN_SCALE;
        self.translate_x = 0.0;
        self.translate_y = 0.0;
        self.gesture = PanGesture::Idle;
        self.clamp_pan();
    }

    /// Returns `true` when the press started a pan. Only the middle button pans.
    pub fn begin_pan(&mut self, button: PointerButton, cursor: ScreenPoint) -> bool {
        if !button.pans_map() {
            return false;
        }
        self.gesture = PanGesture::Panning {
            start_cursor: cursor,
            start_translate_x: self.translate_x,
            start_translate_y: self.translate_y,
            moved: false,
        };
        true
    }

    pub fn pan_move(&mut self, cursor: ScreenPoint) {
        let PanGesture::Panning {
            start_cursor,
            start_translate_x,
            start_translate_y,
            moved,
        } = self.gesture
        else {
            return;
        };

        let moved = moved || cursor.distance_to(start_cursor) > PAN_CLICK_THRESHOLD_PX;
        self.gesture = PanGesture::Panning {
            start_cursor,
            start_translate_x,
            start_translate_y,
            moved,
        };
        self.translate_x = start_translate_x + (cursor.x - start_cursor.x);
        self.translate_y = start_translate_y + (cursor.y - start_cursor.y);
        self.clamp_pan();
    }

    pub fn end_pan(&mut self) {
        if let PanGesture::Panning { moved, .. } = self.gesture {
            if moved {
                self.suppress_next_click = true;
            }
            tracing::debug!(moved, "pan finished");
        }
        self.gesture = PanGesture::Idle;
    }

    pub fn clear_click_suppression(&mut self) {
        self.suppress_next_click = false;
    }

    /// Decide whether a click on the map counts as a placement click.
    ///
    /// The first click after a pan that crossed the movement threshold is
    /// swallowed.
    pub fn accept_placement_click(&mut self) -> bool {
        if self.is_panning() {
            return false;
        }
        if self.suppress_next_click {
            self.suppress_next_click = false;
            return false;
        }
        true
    }

    /// Wheel zoom anchored at `cursor` (screen coordinates). Negative deltas zoom in.
    pub fn wheel_zoom(&mut self, cursor: ScreenPoint, delta_y: f64) -> bool {
        let factor = if delta_y < 0.0 {
            WHEEL_ZOOM_IN_FACTOR
        } else {
            WHEEL_ZOOM_OUT_FACTOR
        };
        let next_scale = self.clamp_scale(self.scale * factor);
        if next_scale == self.scale {
            return false;
        }

        let local = ScreenPoint::new(cursor.x - self.container.x, cursor.y - self.container.y);
        let (translate_x, translate_y) = zoom_translate_at_cursor(
            local,
            self.scale,
            next_scale,
            self.translate_x,
            self.translate_y,
        );
        self.scale = next_scale;
        self.translate_x = translate_x;
        self.translate_y = translate_y;
        self.clamp_pan();
        true
    }

    pub fn zoom_in(&mut self) {
        self.scale = self.clamp_scale(self.scale * BUTTON_ZOOM_FACTOR);
        self.clamp_pan();
    }

    pub fn zoom_out(&mut self) {
        self.scale = self.clamp_scale(self.scale / BUTTON_ZOOM_FACTOR);
        self.clamp_pan();
    }

    pub fn reset(&mut self) {
        self.scale = self.base_fit_scale;
        self.translate_x = 0.0;
        self.translate_y = 0.0;
        self.clamp_pan();
    }

    pub fn screen_to_map_percent(&self, screen: ScreenPoint) -> Result<MapPercent, TransformError> {
        screen_to_map_percent(screen, self.container, &self.transform(), self.base_size())
    }

    pub fn map_percent_to_screen(&self, position: MapPercent) -> ScreenPoint {
        map_percent_to_screen(position, self.container, &self.transform(), self.base_size())
    }
}

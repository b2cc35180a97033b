use crate::geometry::{Rect, ScreenPoint, Size};

pub const MIN_WINDOW_WIDTH: f64 = 400.0;
pub const MIN_WINDOW_HEIGHT: f64 = 300.0;
pub const VIEWPORT_MARGIN_PX: f64 = 40.0;
pub const CASCADE_STEP_PX: f64 = 22.0;
pub const CASCADE_SLOTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeDirection {
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::South,
        Self::East,
        Self::West,
        Self::NorthEast,
        Self::NorthWest,
        Self::SouthEast,
        Self::SouthWest,
    ];

    /// Parse a compass code such as `"n"` or `"se"`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "n" => Some(Self::North),
            "s" => Some(Self::South),
            "e" => Some(Self::East),
            "w" => Some(Self::West),
            "ne" => Some(Self::NorthEast),
            "nw" => Some(Self::NorthWest),
            "se" => Some(Self::SouthEast),
            "sw" => Some(Self::SouthWest),
            _ => None,
        }
    }

    /// `Some(true)` for the east edge, `Some(false)` for the west edge.
    pub const fn horizontal_edge(self) -> Option<bool> {
        match self {
            Self::West | Self::NorthWest | Self::SouthWest => Some(false),
            Self::East | Self::NorthEast | Self::SouthEast => Some(true),
            Self::North | Self::South => None,
        }
    }

    /// `Some(true)` for the south edge, `Some(false)` for the north edge.
    pub const fn vertical_edge(self) -> Option<bool> {
        match self {
            Self::North | Self::NorthWest | Self::NorthEast => Some(false),
            Self::South | Self::SouthWest | Self::SouthEast => Some(true),
            Self::West | Self::East => None,
        }
    }
}

pub fn cascade_offset(open_index: usize) -> f64 {
    (open_index % CASCADE_SLOTS) as f64 * CASCADE_STEP_PX
}

fn clamp_dimension(value: f64, min: f64, viewport: f64) -> f64 {
    let max = (viewport - VIEWPORT_MARGIN_PX).max(0.0);
    value.max(min).min(max)
}

/// Clamp a window size to the minimum and to the viewport minus its margin.
/// On viewports too small for both, the viewport bound wins.
pub fn clamp_window_size(size: Size, viewport: Size) -> Size {
    Size::new(
        clamp_dimension(size.width, MIN_WINDOW_WIDTH, viewport.width),
        clamp_dimension(size.height, MIN_WINDOW_HEIGHT, viewport.height),
    )
}

/// Keep a window of `size` inside the viewport. A window larger than the
/// viewport is pinned to the top-left corner.
pub fn clamp_origin(origin: ScreenPoint, size: Size, viewport: Size) -> ScreenPoint {
    ScreenPoint::new(
        origin.x.min(viewport.width - size.width).max(0.0),
        origin.y.min(viewport.height - size.height).max(0.0),
    )
}

/// Bounds after dragging `direction`'s edges by `delta` from `start`.
///
/// West and north edges move the origin by the applied size change so the
/// opposite edge stays where it was.
pub fn resize_bounds(start: Rect, direction: ResizeDirection, delta: ScreenPoint, viewport: Size) -> Rect {
    let mut bounds = start;

    match direction.horizontal_edge() {
        Some(true) => {
            bounds.width = clamp_dimension(start.width + delta.x, MIN_WINDOW_WIDTH, viewport.width);
        }
        Some(false) => {
            bounds.width = clamp_dimension(start.width - delta.x, MIN_WINDOW_WIDTH, viewport.width);
            bounds.x = start.x + (start.width - bounds.width);
        }
        None => {}
    }

    match direction.vertical_edge() {
        Some(true) => {
            bounds.height =
                clamp_dimension(start.height + delta.y, MIN_WINDOW_HEIGHT, viewport.height);
        }
        Some(false) => {
            bounds.height =
                clamp_dimension(start.height - delta.y, MIN_WINDOW_HEIGHT, viewport.height);
            bounds.y = start.y + (start.height - bounds.height);
        }
        None => {}
    }

    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(1280.0, 800.0);
    const START: Rect = Rect::new(200.0, 150.0, 500.0, 400.0);

    #[test]
    fn from_code_covers_every_direction() {
        let codes = ["n", "s", "e", "w", "ne", "nw", "se", "sw"];
        let parsed = codes
            .iter()
            .filter_map(|code| ResizeDirection::from_code(code))
            .collect::<Vec<_>>();
        assert_eq!(parsed, ResizeDirection::ALL.to_vec());
        assert_eq!(ResizeDirection::from_code("up"), None);
    }

    #[test]
    fn east_and_south_grow_without_moving_origin() {
        let bounds = resize_bounds(
            START,
            ResizeDirection::SouthEast,
            ScreenPoint::new(40.0, 25.0),
            VIEWPORT,
        );
        assert_eq!(bounds, Rect::new(200.0, 150.0, 540.0, 425.0));
    }

    #[test]
    fn north_west_grow_moves_origin_with_the_edge() {
        let bounds = resize_bounds(
            START,
            ResizeDirection::NorthWest,
            ScreenPoint::new(-30.0, -50.0),
            VIEWPORT,
        );
        assert_eq!(bounds, Rect::new(170.0, 100.0, 530.0, 450.0));
    }

    #[test]
    fn single_axis_directions_leave_the_other_axis_alone() {
        let north = resize_bounds(START, ResizeDirection::North, ScreenPoint::new(90.0, 20.0), VIEWPORT);
        assert_eq!(north.width, START.width);
        assert_eq!(north.x, START.x);
        assert_eq!(north.height, 380.0);
        assert_eq!(north.y, 170.0);

        let east = resize_bounds(START, ResizeDirection::East, ScreenPoint::new(10.0, 90.0), VIEWPORT);
        assert_eq!(east.height, START.height);
        assert_eq!(east.width, 510.0);
    }

    #[test]
    fn resize_respects_minimum_and_viewport_maximum() {
        let shrunk = resize_bounds(
            START,
            ResizeDirection::SouthWest,
            ScreenPoint::new(600.0, -600.0),
            VIEWPORT,
        );
        assert_eq!(shrunk.width, MIN_WINDOW_WIDTH);
        assert_eq!(shrunk.height, MIN_WINDOW_HEIGHT);
        assert_eq!(shrunk.x + shrunk.width, START.x + START.width);

        let grown = resize_bounds(
            START,
            ResizeDirection::NorthEast,
            ScreenPoint::new(5000.0, -5000.0),
            VIEWPORT,
        );
        assert_eq!(grown.width, VIEWPORT.width - VIEWPORT_MARGIN_PX);
        assert_eq!(grown.height, VIEWPORT.height - VIEWPORT_MARGIN_PX);
        assert_eq!(grown.y + grown.height, START.y + START.height);
    }

    #[test]
    fn tiny_viewport_bound_wins_over_minimum_size() {
        let size = clamp_window_size(Size::new(520.0, 420.0), Size::new(300.0, 200.0));
        assert_eq!(size, Size::new(260.0, 160.0));
    }

    #[test]
    fn oversized_window_is_pinned_to_top_left() {
        let origin = clamp_origin(
            ScreenPoint::new(50.0, 50.0),
            Size::new(900.0, 700.0),
            Size::new(800.0, 600.0),
        );
        assert_eq!(origin, ScreenPoint::new(0.0, 0.0));
    }

    #[test]
    fn cascade_offset_wraps_every_ten_windows() {
        assert_eq!(cascade_offset(0), 0.0);
        assert_eq!(cascade_offset(9), 198.0);
        assert_eq!(cascade_offset(10), 0.0);
        assert_eq!(cascade_offset(13), 66.0);
    }
}

//!
//! This module holds the shared desktop geometry record and the coordinate helpers used to map raw window positions onto viewports.

/// An orientation axis, usable as an index into the geometry record.
///
/// Callers that lay themselves out along an edge of the screen index the record by their own orientation, so the record keeps both axes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Orientation {
    Horizontal = 0,
    Vertical = 1,
}

/// The screen dimensions shared with layout consumers.
///
/// The virtual (X screen) size covers all monitors; the screen size is the
/// current monitor's, refreshed by the Xinerama offset query. Invariant: the
/// vertical-axis values are always the horizontal-axis values swapped, so a
/// vertically-oriented caller can index by its own axis directly.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DesktopGeometry {
    x_screen_width: [i32; 2],
    x_screen_height: [i32; 2],
    screen_width: [i32; 2],
    screen_height: [i32; 2],
}

impl DesktopGeometry {
    /// Creates a record seeded from the default screen's pixel size.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let mut geometry = Self::default();
        geometry.set_virtual_size(width, height);
        geometry.set_screen_size(width, height);
        geometry
    }

    pub fn set_virtual_size(&mut self, width: i32, height: i32) {
        self.x_screen_width = [width, height];
        self.x_screen_height = [height, width];
    }

    pub fn set_screen_size(&mut self, width: i32, height: i32) {
        self.screen_width = [width, height];
        self.screen_height = [height, width];
    }

    /// Installs a freshly queried root geometry, returning whether it differed
    /// from the cached one. The record is only touched on a change.
    pub fn update_virtual_size(&mut self, width: i32, height: i32) -> bool {
        if width == self.x_screen_width[0] && height == self.x_screen_height[0] {
            return false;
        }
        self.set_virtual_size(width, height);
        // the per-monitor size is refreshed later by the Xinerama query
        self.set_screen_size(width, height);
        true
    }

    #[must_use]
    pub fn x_screen_width(&self, orientation: Orientation) -> i32 {
        self.x_screen_width[orientation as usize]
    }

    #[must_use]
    pub fn x_screen_height(&self, orientation: Orientation) -> i32 {
        self.x_screen_height[orientation as usize]
    }

    #[must_use]
    pub fn screen_width(&self, orientation: Orientation) -> i32 {
        self.screen_width[orientation as usize]
    }

    #[must_use]
    pub fn screen_height(&self, orientation: Orientation) -> i32 {
        self.screen_height[orientation as usize]
    }
}

/// A window's top-left corner and extents, in current-viewport coordinates and
/// compensated for the window manager's frame decorations.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// The `_NET_WM_STRUT_PARTIAL` reserved-area record, in the property's field order.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct StrutPartial {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
    pub left_start_y: u32,
    pub left_end_y: u32,
    pub right_start_y: u32,
    pub right_end_y: u32,
    pub top_start_x: u32,
    pub top_end_x: u32,
    pub bottom_start_x: u32,
    pub bottom_end_x: u32,
}

impl StrutPartial {
    #[must_use]
    pub fn to_cardinals(&self) -> [u32; 12] {
        [
            self.left,
            self.right,
            self.top,
            self.bottom,
            self.left_start_y,
            self.left_end_y,
            self.right_start_y,
            self.right_end_y,
            self.top_start_x,
            self.top_end_x,
            self.bottom_start_x,
            self.bottom_end_x,
        ]
    }
}

/// Wraps a raw coordinate into `[0, size)` by whole screens.
///
/// A window sitting on another viewport reports coordinates outside the
/// visible range; its position on its own viewport is the same coordinate
/// modulo the screen dimension, since all viewports share the screen's size.
#[must_use]
pub fn wrap_to_screen(value: i32, size: i32) -> i32 {
    if size <= 0 {
        return value;
    }
    value.rem_euclid(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_mirror_each_other() {
        let geometry = DesktopGeometry::new(1920, 1080);
        assert_eq!(geometry.x_screen_width(Orientation::Horizontal), 1920);
        assert_eq!(geometry.x_screen_height(Orientation::Horizontal), 1080);
        assert_eq!(geometry.x_screen_width(Orientation::Vertical), 1080);
        assert_eq!(geometry.x_screen_height(Orientation::Vertical), 1920);
        assert_eq!(geometry.screen_width(Orientation::Vertical), 1080);
        assert_eq!(geometry.screen_height(Orientation::Vertical), 1920);
    }

    #[test]
    fn update_reports_no_change_for_identical_size() {
        let mut geometry = DesktopGeometry::new(1920, 1080);
        assert!(!geometry.update_virtual_size(1920, 1080));
        assert_eq!(geometry.x_screen_width(Orientation::Horizontal), 1920);
    }

    #[test]
    fn update_installs_new_size_on_change() {
        let mut geometry = DesktopGeometry::new(1920, 1080);
        assert!(geometry.update_virtual_size(2560, 1440));
        assert_eq!(geometry.x_screen_width(Orientation::Horizontal), 2560);
        assert_eq!(geometry.x_screen_height(Orientation::Horizontal), 1440);
        assert_eq!(geometry.x_screen_width(Orientation::Vertical), 1440);
        // the per-monitor size follows until the next Xinerama refresh
        assert_eq!(geometry.screen_width(Orientation::Horizontal), 2560);
    }

    #[test]
    fn screen_size_does_not_touch_virtual_size() {
        let mut geometry = DesktopGeometry::new(3840, 1080);
        geometry.set_screen_size(1920, 1080);
        assert_eq!(geometry.x_screen_width(Orientation::Horizontal), 3840);
        assert_eq!(geometry.screen_width(Orientation::Horizontal), 1920);
    }

    #[test]
    fn wrap_lands_in_screen_range() {
        for &(value, size) in &[(-50, 1920), (0, 1920), (1919, 1920), (1920, 1920), (5000, 1920), (-4000, 1080)] {
            let wrapped = wrap_to_screen(value, size);
            assert!((0..size).contains(&wrapped), "{value} wrapped to {wrapped}");
            assert_eq!((value - wrapped).rem_euclid(size), 0, "{value} moved by a non-multiple of {size}");
        }
    }

    #[test]
    fn wrap_with_degenerate_size_is_identity() {
        assert_eq!(wrap_to_screen(42, 0), 42);
        assert_eq!(wrap_to_screen(-7, -1), -7);
    }

    #[test]
    fn strut_cardinal_order_matches_property_layout() {
        let strut = StrutPartial {
            left: 0,
            right: 0,
            top: 24,
            bottom: 0,
            top_start_x: 100,
            top_end_x: 500,
            ..StrutPartial::default()
        };
        assert_eq!(strut.to_cardinals(), [0, 0, 24, 0, 0, 0, 0, 0, 100, 500, 0, 0]);
    }
}

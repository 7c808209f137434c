//! Region structure for defining extraction area
//!
//! A Region is a rectangle in pixel coordinates where (0,0) is the top-left
//! cell of the raster. Block readers use it both for the requested window and
//! for the extent of each strip or tile.

/// Rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// X-coordinate of the top-left corner (pixels from left)
    pub x: u32,

    /// Y-coordinate of the top-left corner (pixels from top)
    pub y: u32,

    /// Width of the region in pixels
    pub width: u32,

    /// Height of the region in pixels
    pub height: u32,
}

impl Region {
    /// Create a new region
    ///
    /// # Arguments
    /// * `x` - X-coordinate of the top-left corner
    /// * `y` - Y-coordinate of the top-left corner
    /// * `width` - Width of the region in pixels
    /// * `height` - Height of the region in pixels
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Region { x, y, width, height }
    }

    /// Get the rightmost X coordinate (exclusive)
    pub fn end_x(&self) -> u32 {
        self.x + self.width
    }

    /// Get the bottommost Y coordinate (exclusive)
    pub fn end_y(&self) -> u32 {
        self.y + self.height
    }

    /// Number of cells covered
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Overlap of two regions, `None` when they do not share a cell
    pub fn intersect(&self, other: &Region) -> Option<Region> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let end_x = self.end_x().min(other.end_x());
        let end_y = self.end_y().min(other.end_y());

        if end_x <= x || end_y <= y {
            return None;
        }

        Some(Region::new(x, y, end_x - x, end_y - y))
    }
}

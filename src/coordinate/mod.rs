//! Coordinate handling for georeferenced rasters
//!
//! Map-space points, GDAL-style sampling windows and the affine transform
//! between map and pixel space.

mod point;
mod transform;
mod window;

pub use self::point::Point;
pub use self::transform::GeoTransform;
pub use self::window::SamplingWindow;

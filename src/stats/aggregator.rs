//! Window statistics
//!
//! Reduces the cells of a sampling window to mean / max / min.

use std::fmt;
use std::str::FromStr;

use log::trace;

use crate::extractor::RasterSample;

/// Which cells take part in the statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodataPolicy {
    /// Skip cells equal to the declared no-data value and NaN cells
    #[default]
    Mask,
    /// Aggregate every cell; NaN cells propagate into all three statistics
    Include,
}

impl NodataPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            NodataPolicy::Mask => "mask",
            NodataPolicy::Include => "include",
        }
    }
}

impl FromStr for NodataPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mask" => Ok(NodataPolicy::Mask),
            "include" => Ok(NodataPolicy::Include),
            other => Err(format!("Unknown no-data policy '{}', expected mask or include", other)),
        }
    }
}

impl fmt::Display for NodataPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Statistics of one window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// Number of cells that were aggregated
    pub count: usize,
}

/// No cell of the window survived the no-data policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptySample {
    /// Cells in the window before masking
    pub cells: usize,
}

impl fmt::Display for EmptySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cells == 0 {
            write!(f, "window holds no cells")
        } else {
            write!(f, "all {} cells of the window are no-data", self.cells)
        }
    }
}

impl std::error::Error for EmptySample {}

/// Aggregates the cells of `sample` under `policy`
pub fn aggregate(sample: &RasterSample, policy: NodataPolicy) -> Result<CellStats, EmptySample> {
    let keep = |value: f64| match policy {
        NodataPolicy::Include => true,
        NodataPolicy::Mask => !value.is_nan() && !sample.is_nodata(value),
    };

    aggregate_values(sample.values().iter().copied().filter(|&value| keep(value)))
        .ok_or(EmptySample { cells: sample.len() })
}

/// Mean, max and min of a value stream, `None` when it is empty
///
/// A NaN anywhere makes all three statistics NaN.
pub fn aggregate_values(values: impl Iterator<Item = f64>) -> Option<CellStats> {
    let mut sum = 0.0;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    let mut count = 0usize;
    let mut saw_nan = false;

    for value in values {
        if value.is_nan() {
            saw_nan = true;
        }
        sum += value;
        max = max.max(value);
        min = min.min(value);
        count += 1;
    }

    if count == 0 {
        return None;
    }

    trace!("Aggregated {} cells", count);

    if saw_nan {
        return Some(CellStats { mean: f64::NAN, max: f64::NAN, min: f64::NAN, count });
    }

    Some(CellStats { mean: sum / count as f64, max, min, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::GeoTransform;
    use crate::extractor::Region;

    fn sample(width: u32, height: u32, values: &[f64], nodata: Option<f64>) -> RasterSample {
        let mut sample = RasterSample::new(
            Region::new(0, 0, width, height),
            GeoTransform::new([0.0, 1.0, 0.0, 0.0, 0.0, -1.0]),
            nodata,
        );
        sample.data = values.to_vec();
        sample
    }

    #[test]
    fn constant_window() {
        let stats = aggregate(&sample(5, 5, &[10.0; 25], None), NodataPolicy::Mask).unwrap();
        assert_eq!((stats.mean, stats.max, stats.min, stats.count), (10.0, 10.0, 10.0, 25));
    }

    #[test]
    fn small_window() {
        let stats = aggregate(&sample(2, 2, &[1.0, 2.0, 3.0, 4.0], None), NodataPolicy::Mask).unwrap();
        assert_eq!((stats.mean, stats.max, stats.min), (2.5, 4.0, 1.0));
    }

    #[test]
    fn masking_skips_the_sentinel() {
        let window = sample(2, 2, &[-9999.0, 2.0, 4.0, 6.0], Some(-9999.0));

        let masked = aggregate(&window, NodataPolicy::Mask).unwrap();
        assert_eq!((masked.mean, masked.max, masked.min, masked.count), (4.0, 6.0, 2.0, 3));

        let included = aggregate(&window, NodataPolicy::Include).unwrap();
        assert_eq!((included.min, included.count), (-9999.0, 4));
    }

    #[test]
    fn nan_cells_are_masked_or_propagate() {
        let window = sample(3, 1, &[f64::NAN, 1.0, 3.0], None);

        assert_eq!(aggregate(&window, NodataPolicy::Mask).unwrap().mean, 2.0);
        assert!(aggregate(&window, NodataPolicy::Include).unwrap().max.is_nan());
    }

    #[test]
    fn all_nodata_is_empty() {
        let window = sample(2, 1, &[0.0, 0.0], Some(0.0));
        assert_eq!(aggregate(&window, NodataPolicy::Mask), Err(EmptySample { cells: 2 }));
    }

    #[test]
    fn zero_cells_is_empty() {
        assert!(aggregate_values(std::iter::empty()).is_none());
    }
}

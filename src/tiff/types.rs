//! Core TIFF data structures

use crate::tiff::constants::tags;
use crate::tiff::ifd::IFD;
use std::fmt;

/// A parsed TIFF file: its header flavour and IFD chain
#[derive(Debug)]
pub struct TIFF {
    /// Image File Directories in the TIFF file
    pub ifds: Vec<IFD>,
    /// Whether this is a BigTIFF format
    pub is_big_tiff: bool,
}

impl TIFF {
    pub fn new(is_big_tiff: bool) -> Self {
        TIFF {
            ifds: Vec::new(),
            is_big_tiff,
        }
    }

    /// Returns the full resolution raster
    ///
    /// Cloud-optimised GeoTIFFs may carry overviews and masks; the main raster
    /// is the first IFD that is not flagged as a reduced-resolution subfile.
    pub fn main_ifd(&self) -> Option<&IFD> {
        self.ifds
            .iter()
            .find(|ifd| !is_reduced_resolution(ifd))
            .or_else(|| self.ifds.first())
    }

    pub fn ifd_count(&self) -> usize {
        self.ifds.len()
    }

    /// Reduced resolution subfiles (overviews)
    pub fn overviews(&self) -> Vec<&IFD> {
        self.ifds.iter().filter(|ifd| is_reduced_resolution(ifd)).collect()
    }
}

fn is_reduced_resolution(ifd: &IFD) -> bool {
    ifd.get_tag_value(tags::NEW_SUBFILE_TYPE)
        .map(|subfile_type| subfile_type & 1 == 1)
        .unwrap_or(false)
}

impl fmt::Display for TIFF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TIFF File:")?;
        writeln!(f, "  Format: {}", if self.is_big_tiff { "BigTIFF" } else { "TIFF" })?;
        writeln!(f, "  Number of IFDs: {}", self.ifds.len())?;

        if let Some(ifd) = self.main_ifd() {
            write!(f, "{}", ifd)?;
        }

        Ok(())
    }
}

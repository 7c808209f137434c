//! GeoTIFF writing
//!
//! Encodes in-memory bands into strips or tiles and writes a georeferenced
//! TIFF through `TiffBuilder`. Used to dump sampling windows and to build
//! rasters with a known layout.

use log::{debug, info};

use crate::compression::predictor::{self, BlockGeometry};
use crate::compression::{CompressionFactory, CompressionHandler};
use crate::coordinate::GeoTransform;
use crate::extractor::RasterSample;
use crate::io::byte_order::ByteOrder;
use crate::tiff::builder::TiffBuilder;
use crate::tiff::builders::basic_tags::BasicTagsBuilder;
use crate::tiff::builders::geo_tags::GeoTagsBuilder;
use crate::tiff::builders::metadata_tags::MetadataTagsBuilder;
use crate::tiff::constants::{planar_config, predictor as predictor_codes, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::sample_type::SampleType;

/// Storage options of a written raster
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub sample_type: SampleType,
    /// Codec name as accepted by `CompressionFactory::get_handler_by_name`
    pub compression: String,
    pub predictor: u16,
    /// Tile size; strips are written when `None`
    pub tile_size: Option<(u32, u32)>,
    pub rows_per_strip: u32,
    pub planar_config: u16,
    pub byte_order: ByteOrder,
    pub big_tiff: bool,
    pub nodata: Option<f64>,
    /// Declared `(scale, offset)`, applied to every band
    pub scale_offset: Option<(f64, f64)>,
    pub epsg: Option<u16>,
    pub pixel_is_point: bool,
    /// Write a ModelTransformation even for north-up transforms
    pub model_transformation: bool,
    /// Leave blocks holding only the fill value unwritten
    pub sparse_ok: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            sample_type: SampleType::F32,
            compression: "none".to_string(),
            predictor: predictor_codes::NONE,
            tile_size: None,
            rows_per_strip: 16,
            planar_config: planar_config::CHUNKY,
            byte_order: ByteOrder::LittleEndian,
            big_tiff: false,
            nodata: None,
            scale_offset: None,
            epsg: None,
            pixel_is_point: false,
            model_transformation: false,
            sparse_ok: false,
        }
    }
}

/// Pixel extent of one block and the bands it holds
struct BlockSpec {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    bands: Vec<usize>,
}

/// Writes GeoTIFF rasters
#[derive(Debug, Clone, Default)]
pub struct GeoTiffWriter {
    options: WriteOptions,
}

impl GeoTiffWriter {
    pub fn new(options: WriteOptions) -> Self {
        GeoTiffWriter { options }
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Writes a window sample as a single band raster
    ///
    /// The sample's own no-data marker is declared unless the options set one.
    pub fn write_sample(&self, sample: &RasterSample, path: &str) -> TiffResult<()> {
        let mut writer = self.clone();
        if writer.options.nodata.is_none() {
            writer.options.nodata = sample.nodata;
        }

        writer.write_bands(path, sample.width, sample.height, std::slice::from_ref(&sample.data), &sample.transform)
    }

    /// Writes one or more bands of row-major cell values
    ///
    /// Values are stored as given; a configured scale/offset is only declared.
    ///
    /// # Arguments
    /// * `path` - Output file
    /// * `width`, `height` - Raster size in cells
    /// * `bands` - One `width * height` vector per band
    /// * `transform` - Pixel-corner based georeferencing
    pub fn write_bands(
        &self,
        path: &str,
        width: u32,
        height: u32,
        bands: &[Vec<f64>],
        transform: &GeoTransform,
    ) -> TiffResult<()> {
        self.validate(width, height, bands)?;
        let options = &self.options;

        info!("Writing {}x{} {} raster with {} band(s) to {}",
              width, height, options.sample_type, bands.len(), path);

        let codec = CompressionFactory::get_handler_by_name(&options.compression)?;
        let mut builder = TiffBuilder::new(options.byte_order, options.big_tiff);
        let ifd = builder.add_ifd();

        BasicTagsBuilder::add_image_structure(
            &mut builder, ifd, width, height, options.sample_type, bands.len() as u16, options.planar_config,
        )?;
        BasicTagsBuilder::add_compression(&mut builder, ifd, codec.code(), options.predictor)?;

        let (offsets_tag, byte_counts_tag) = match options.tile_size {
            Some((tile_width, tile_height)) => {
                BasicTagsBuilder::add_tile_layout(&mut builder, ifd, tile_width, tile_height)?;
                (tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS)
            }
            None => {
                BasicTagsBuilder::add_strip_layout(&mut builder, ifd, options.rows_per_strip.min(height))?;
                (tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)
            }
        };

        GeoTagsBuilder::add_georeferencing(
            &mut builder, ifd, transform, options.pixel_is_point, options.model_transformation,
        )?;
        GeoTagsBuilder::add_geo_key_directory(&mut builder, ifd, options.epsg, options.pixel_is_point)?;

        if let Some(nodata) = options.nodata {
            MetadataTagsBuilder::add_nodata(&mut builder, ifd, nodata)?;
        }
        if let Some(scaling) = options.scale_offset {
            MetadataTagsBuilder::add_band_scaling(&mut builder, ifd, &vec![scaling; bands.len()])?;
        }

        let mut blocks = Vec::new();
        for spec in self.block_specs(width, height, bands.len()) {
            blocks.push(self.encode_block(&builder, &spec, width, height, bands, codec.as_ref())?);
        }
        debug!("Encoded {} blocks with {}", blocks.len(), codec.name());

        builder.set_blocks(ifd, offsets_tag, byte_counts_tag, blocks)?;
        builder.write(path)
    }

    fn validate(&self, width: u32, height: u32, bands: &[Vec<f64>]) -> TiffResult<()> {
        if width == 0 || height == 0 {
            return Err(TiffError::MissingDimensions);
        }
        if bands.is_empty() {
            return Err(TiffError::GenericError("At least one band is required".to_string()));
        }

        let cells = width as usize * height as usize;
        if let Some(band) = bands.iter().position(|band| band.len() != cells) {
            return Err(TiffError::GenericError(format!(
                "Band {} holds {} values, expected {}", band + 1, bands[band].len(), cells
            )));
        }

        if self.options.predictor == predictor_codes::FLOATING_POINT && !self.options.sample_type.is_float() {
            return Err(TiffError::GenericError(format!(
                "Floating point predictor needs a float sample type, not {}", self.options.sample_type
            )));
        }

        if let Some((tile_width, tile_height)) = self.options.tile_size {
            if tile_width == 0 || tile_height == 0 || tile_width % 16 != 0 || tile_height % 16 != 0 {
                return Err(TiffError::GenericError(format!(
                    "Tile size {}x{} must be a non-zero multiple of 16", tile_width, tile_height
                )));
            }
        } else if self.options.rows_per_strip == 0 {
            return Err(TiffError::GenericError("Rows per strip must be positive".to_string()));
        }

        Ok(())
    }

    /// Blocks in offsets-table order: plane by plane for planar rasters
    fn block_specs(&self, width: u32, height: u32, band_count: usize) -> Vec<BlockSpec> {
        let planar = self.options.planar_config == planar_config::PLANAR && band_count > 1;
        let planes: Vec<Vec<usize>> = if planar {
            (0..band_count).map(|band| vec![band]).collect()
        } else {
            vec![(0..band_count).collect()]
        };

        let mut specs = Vec::new();
        for bands in planes {
            match self.options.tile_size {
                Some((tile_width, tile_height)) => {
                    for row in 0..height.div_ceil(tile_height) {
                        for col in 0..width.div_ceil(tile_width) {
                            specs.push(BlockSpec {
                                x: col * tile_width,
                                y: row * tile_height,
                                width: tile_width,
                                height: tile_height,
                                bands: bands.clone(),
                            });
                        }
                    }
                }
                None => {
                    let rows_per_strip = self.options.rows_per_strip.min(height);
                    for strip in 0..height.div_ceil(rows_per_strip) {
                        let y = strip * rows_per_strip;
                        specs.push(BlockSpec {
                            x: 0,
                            y,
                            width,
                            height: rows_per_strip.min(height - y),
                            bands: bands.clone(),
                        });
                    }
                }
            }
        }

        specs
    }

    fn encode_block(
        &self,
        builder: &TiffBuilder,
        spec: &BlockSpec,
        width: u32,
        height: u32,
        bands: &[Vec<f64>],
        codec: &dyn CompressionHandler,
    ) -> TiffResult<Vec<u8>> {
        let options = &self.options;
        let fill = options.nodata.unwrap_or(0.0);
        let handler = builder.handler();

        let mut data = Vec::with_capacity(
            spec.width as usize * spec.height as usize * spec.bands.len() * options.sample_type.size()
        );
        let mut only_fill = true;

        for y in spec.y..spec.y + spec.height {
            for x in spec.x..spec.x + spec.width {
                for &band in &spec.bands {
                    let value = if x < width && y < height {
                        bands[band][y as usize * width as usize + x as usize]
                    } else {
                        fill
                    };
                    if value != fill && !(value.is_nan() && fill.is_nan()) {
                        only_fill = false;
                    }
                    options.sample_type.encode(value, &mut data, handler);
                }
            }
        }

        if options.sparse_ok && only_fill {
            return Ok(Vec::new());
        }

        let geometry = BlockGeometry {
            width: spec.width as usize,
            stride: spec.bands.len(),
            sample_size: options.sample_type.size(),
        };
        predictor::apply_predictor(&mut data, options.predictor, &geometry, options.byte_order)?;

        codec.compress(&data)
    }
}

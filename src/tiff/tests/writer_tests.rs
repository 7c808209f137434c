//! Tests for the TIFF layout writer and tag builders

use crate::coordinate::GeoTransform;
use crate::io::byte_order::ByteOrder;
use crate::tiff::builders::geo_tags::GeoTagsBuilder;
use crate::tiff::builders::metadata_tags::MetadataTagsBuilder;
use crate::tiff::constants::tags;
use crate::tiff::geo_key_parser::GeoKeyParser;
use crate::tiff::reader::TiffReader;

use super::test_utils::{new_builder, write_to_buffer};

#[test]
fn header_carries_marker_and_version() {
    let mut builder = new_builder(ByteOrder::BigEndian, false);
    let ifd = builder.add_ifd();
    builder.add_long(ifd, tags::IMAGE_WIDTH, 1).unwrap();

    let bytes = write_to_buffer(&builder).into_inner();
    assert_eq!(&bytes[..4], &[b'M', b'M', 0, 42]);
}

#[test]
fn bigtiff_header_layout() {
    let mut builder = new_builder(ByteOrder::LittleEndian, true);
    let ifd = builder.add_ifd();
    builder.add_long(ifd, tags::IMAGE_WIDTH, 1).unwrap();

    let bytes = write_to_buffer(&builder).into_inner();
    assert_eq!(&bytes[..8], &[b'I', b'I', 43, 0, 8, 0, 0, 0]);
    assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 16);
}

#[test]
fn block_offsets_point_at_block_bytes() {
    let mut builder = new_builder(ByteOrder::LittleEndian, false);
    let ifd = builder.add_ifd();
    builder.add_long(ifd, tags::IMAGE_WIDTH, 4).unwrap();
    builder.set_blocks(ifd, tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS,
                       vec![vec![1, 2, 3], vec![4, 5, 6, 7, 8]]).unwrap();

    let mut cursor = write_to_buffer(&builder);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = &tiff.ifds[0];

    let offsets = reader.read_tag_values(&mut cursor, ifd, tags::STRIP_OFFSETS).unwrap();
    let counts = reader.read_tag_values(&mut cursor, ifd, tags::STRIP_BYTE_COUNTS).unwrap();
    assert_eq!(counts, vec![3, 5]);

    let bytes = cursor.get_ref();
    assert_eq!(&bytes[offsets[0] as usize..][..3], &[1, 2, 3]);
    assert_eq!(&bytes[offsets[1] as usize..][..5], &[4, 5, 6, 7, 8]);
    assert_eq!(offsets[1] % 4, 0);
}

#[test]
fn single_block_offset_is_stored_inline() {
    let mut builder = new_builder(ByteOrder::BigEndian, false);
    let ifd = builder.add_ifd();
    builder.set_blocks(ifd, tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS, vec![vec![9; 6]]).unwrap();

    let mut cursor = write_to_buffer(&builder);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    let offset = tiff.ifds[0].get_tag_value(tags::STRIP_OFFSETS).unwrap() as usize;
    assert_eq!(&cursor.get_ref()[offset..][..6], &[9; 6]);
}

#[test]
fn duplicate_tags_keep_the_last_value() {
    let mut builder = new_builder(ByteOrder::LittleEndian, false);
    let ifd = builder.add_ifd();
    builder.add_long(ifd, tags::IMAGE_WIDTH, 1).unwrap();
    builder.add_long(ifd, tags::IMAGE_WIDTH, 7).unwrap();

    let mut cursor = write_to_buffer(&builder);
    let tiff = TiffReader::new().read(&mut cursor).unwrap();
    assert_eq!(tiff.ifds[0].entries.len(), 1);
    assert_eq!(tiff.ifds[0].get_tag_value(tags::IMAGE_WIDTH), Some(7));
}

#[test]
fn georeferencing_reads_back() {
    let transform = GeoTransform::new([500000.0, 0.5, 0.0, 4600000.0, 0.0, -0.5]);

    for force_matrix in [false, true] {
        let mut builder = new_builder(ByteOrder::LittleEndian, false);
        let ifd = builder.add_ifd();
        GeoTagsBuilder::add_georeferencing(&mut builder, ifd, &transform, false, force_matrix).unwrap();
        GeoTagsBuilder::add_geo_key_directory(&mut builder, ifd, Some(25832), false).unwrap();

        let mut cursor = write_to_buffer(&builder);
        let mut reader = TiffReader::new();
        let tiff = reader.read(&mut cursor).unwrap();

        let info = GeoKeyParser::extract_geo_info(&reader, &mut cursor, &tiff.ifds[0]).unwrap();
        assert_eq!(info.transform, transform);
        assert_eq!(info.epsg, Some(25832));
        assert!(!info.pixel_is_point);
    }
}

#[test]
fn pixel_is_point_rasters_read_with_corner_origin() {
    let transform = GeoTransform::new([100.0, 2.0, 0.0, 200.0, 0.0, -2.0]);

    let mut builder = new_builder(ByteOrder::LittleEndian, false);
    let ifd = builder.add_ifd();
    GeoTagsBuilder::add_georeferencing(&mut builder, ifd, &transform, true, false).unwrap();
    GeoTagsBuilder::add_geo_key_directory(&mut builder, ifd, Some(4326), true).unwrap();

    let mut cursor = write_to_buffer(&builder);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    let tiepoint = reader.read_f64_values(&mut cursor, &tiff.ifds[0], tags::MODEL_TIEPOINT_TAG).unwrap();
    assert_eq!(tiepoint[3..5], [101.0, 199.0]);

    let info = GeoKeyParser::extract_geo_info(&reader, &mut cursor, &tiff.ifds[0]).unwrap();
    assert!(info.pixel_is_point);
    assert_eq!(info.epsg, Some(4326));
    assert_eq!(info.transform, transform);
}

#[test]
fn band_scaling_reads_back_per_band() {
    let mut builder = new_builder(ByteOrder::LittleEndian, false);
    let ifd = builder.add_ifd();
    MetadataTagsBuilder::add_band_scaling(&mut builder, ifd, &[(1.0, 0.0), (0.01, -5.0)]).unwrap();
    MetadataTagsBuilder::add_nodata(&mut builder, ifd, f64::NAN).unwrap();

    let mut cursor = write_to_buffer(&builder);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = &tiff.ifds[0];

    assert_eq!(GeoKeyParser::read_band_scaling(&reader, &mut cursor, ifd, 2).unwrap(), (0.01, -5.0));
    assert_eq!(GeoKeyParser::read_band_scaling(&reader, &mut cursor, ifd, 1).unwrap(), (1.0, 0.0));
    assert!(GeoKeyParser::read_nodata(&reader, &mut cursor, ifd).unwrap().unwrap().is_nan());
}

#[test]
fn missing_georeference_is_reported() {
    let mut builder = new_builder(ByteOrder::LittleEndian, false);
    let ifd = builder.add_ifd();
    builder.add_long(ifd, tags::IMAGE_WIDTH, 1).unwrap();

    let mut cursor = write_to_buffer(&builder);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    assert!(matches!(
        GeoKeyParser::extract_geo_info(&reader, &mut cursor, &tiff.ifds[0]),
        Err(crate::tiff::errors::TiffError::MissingGeoreference)
    ));
}

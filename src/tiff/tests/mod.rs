//! Unit tests for TIFF reading and writing

mod test_utils;
mod byte_order_tests;
mod writer_tests;

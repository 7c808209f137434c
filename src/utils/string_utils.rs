//! String utility functions

/// Trims trailing NUL terminators from an ASCII tag buffer
pub fn trim_trailing_nulls(buffer: &mut Vec<u8>) {
    while buffer.last() == Some(&0) {
        buffer.pop();
    }
}

//! TIFF writing utilities
//!
//! Layout helpers for the TIFF writer: word alignment and the tag order
//! an IFD must be written in.

use crate::tiff::ifd::IFDEntry;
use std::collections::HashSet;

/// Align an offset to a 4-byte boundary
///
/// TIFF specification recommends aligning data on word boundaries.
/// This function returns the next 4-byte aligned position given a current offset.
pub fn align_to_4_bytes(offset: u64) -> u64 {
    let remainder = offset % 4;
    if remainder == 0 {
        offset
    } else {
        offset + (4 - remainder)
    }
}

/// Get a list of IFD entries sorted by tag number with duplicates removed
///
/// The TIFF specification requires tags to be sorted by ID and ensures
/// each tag appears only once. If multiple entries have the same tag ID,
/// only the last occurrence is kept.
pub fn get_unique_sorted_entries(entries: &[IFDEntry]) -> Vec<IFDEntry> {
    // First sort by tag number
    let mut sorted_entries = entries.to_vec();
    sorted_entries.sort_by_key(|entry| entry.tag);

    // Then ensure uniqueness (keep last occurrence of each tag)
    let mut unique_entries = Vec::new();
    let mut seen_tags = HashSet::new();

    // Process in reverse to keep the last occurrence of each tag
    for entry in sorted_entries.iter().rev() {
        if !seen_tags.contains(&entry.tag) {
            seen_tags.insert(entry.tag);
            unique_entries.push(entry.clone());
        }
    }

    // Reverse back to ascending order by tag ID
    unique_entries.reverse();
    unique_entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiff::constants::field_types;

    #[test]
    fn aligns_up_to_word_boundary() {
        assert_eq!(align_to_4_bytes(8), 8);
        assert_eq!(align_to_4_bytes(9), 12);
        assert_eq!(align_to_4_bytes(11), 12);
    }

    #[test]
    fn entries_are_sorted_and_last_duplicate_wins() {
        let entries = vec![
            IFDEntry::new(257, field_types::LONG, 1, 10),
            IFDEntry::new(256, field_types::LONG, 1, 20),
            IFDEntry::new(257, field_types::LONG, 1, 30),
        ];

        let unique = get_unique_sorted_entries(&entries);
        assert_eq!(unique.iter().map(|e| e.tag).collect::<Vec<_>>(), vec![256, 257]);
        assert_eq!(unique[1].value_offset, 30);
    }
}

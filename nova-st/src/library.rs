//! Generated-book library listing
//!
//! The published listing is merged into the locally known list rather than
//! replacing it, so books the studio already knows about survive a partial
//! or stale upstream listing.

use nova_common::models::BookEntry;

/// Merge fetched entries into the known list, keyed by `path`
///
/// An entry with a known path replaces the stored one; new paths append in
/// fetch order.
pub fn merge_entries(known: &mut Vec<BookEntry>, fetched: Vec<BookEntry>) {
    for entry in fetched {
        match known.iter_mut().find(|e| e.path == entry.path) {
            Some(existing) => *existing = entry,
            None => known.push(entry),
        }
    }
}

//! Diffs between a layout and the ids already stored for it.
//!
//! Saving upserts every current row and then deletes whatever the store
//! holds that the layout no longer has. Blocks are diffed across the whole
//! manual so a block moved between pages is never deleted.

use std::collections::HashSet;

use crate::model::ManualLayout;

/// Ids in `stored` that are absent from `current`, in stored order.
pub fn stale_ids<'a>(stored: &'a [String], current: &HashSet<&str>) -> Vec<&'a str> {
    stored
        .iter()
        .map(String::as_str)
        .filter(|id| !current.contains(id))
        .collect()
}

/// Stored block ids no page of the layout still holds.
pub fn blocks_to_delete<'a>(layout: &ManualLayout, stored: &'a [String]) -> Vec<&'a str> {
    stale_ids(stored, &layout.block_ids())
}

/// Stored page ids the layout no longer has.
pub fn pages_to_delete<'a>(layout: &ManualLayout, stored: &'a [String]) -> Vec<&'a str> {
    stale_ids(stored, &layout.page_ids())
}

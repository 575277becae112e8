//! Page arithmetic shared by the in-memory index and list endpoints.

use std::ops::Range;

/// Number of pages needed for `total` records at `per_page` per page.
pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

/// Index range of page `page` (zero-based), or `None` when the page is past
/// the end of the result set.
pub fn page_bounds(total: usize, page: usize, per_page: usize) -> Option<Range<usize>> {
    if per_page == 0 {
        return None;
    }
    let start = page.checked_mul(per_page)?;
    if start >= total {
        return None;
    }
    let end = start.saturating_add(per_page).min(total);
    Some(start..end)
}

/// Records on page `page` (zero-based); empty past the last page.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Vec<T> {
    page_bounds(items.len(), page, per_page)
        .map(|range| items[range].to_vec())
        .unwrap_or_default()
}

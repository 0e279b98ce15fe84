//! Seam de-duplication for freshly fetched pages.
//!
//! Remote pagination sometimes shifts by an item or two between requests, so
//! the first items of a new page repeat items already shown next to the seam.

/// Default number of items on each side of a seam that are checked
pub const CHECK_DUPLICATE_RANGE: usize = 50;

/// Drop the leading run of `new_items` that duplicates anything in `window`.
///
/// Scanning stops at the first item with no duplicate; later items are kept
/// even if they repeat something already held.
pub fn drop_leading_duplicates<E, F>(new_items: Vec<E>, window: &[E], is_duplicate: F) -> Vec<E>
where
    F: Fn(&E, &E) -> bool,
{
    if window.is_empty() {
        return new_items;
    }
    let leading = new_items
        .iter()
        .take_while(|item| window.iter().any(|held| is_duplicate(*item, held)))
        .count();
    if leading == 0 {
        return new_items;
    }
    new_items.into_iter().skip(leading).collect()
}

/// Mirror of [`drop_leading_duplicates`] for pages inserted before the window,
/// where the overlap shows up at the end of the fetched page.
pub fn drop_trailing_duplicates<E, F>(mut new_items: Vec<E>, window: &[E], is_duplicate: F) -> Vec<E>
where
    F: Fn(&E, &E) -> bool,
{
    if window.is_empty() {
        return new_items;
    }
    let trailing = new_items
        .iter()
        .rev()
        .take_while(|item| window.iter().any(|held| is_duplicate(*item, held)))
        .count();
    new_items.truncate(new_items.len() - trailing);
    new_items
}

/// Slice of `items` within `range` items of `seam` on either side, clamped to bounds
pub fn seam_window<E>(items: &[E], seam: usize, range: usize) -> &[E] {
    let start = seam.saturating_sub(range).min(items.len());
    let end = seam.saturating_add(range).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same(a: &u32, b: &u32) -> bool {
        a == b
    }

    #[test]
    fn test_drops_only_leading_run() {
        let held = vec![8, 9, 10];
        let fetched = vec![9, 10, 11, 9, 12];
        assert_eq!(drop_leading_duplicates(fetched, &held, same), vec![11, 9, 12]);
    }

    #[test]
    fn test_keeps_everything_without_overlap() {
        let held = vec![1, 2, 3];
        let fetched = vec![4, 5, 6];
        assert_eq!(drop_leading_duplicates(fetched.clone(), &held, same), fetched);
    }

    #[test]
    fn test_all_duplicates_yields_empty() {
        let held = vec![1, 2, 3];
        assert!(drop_leading_duplicates(vec![3, 2], &held, same).is_empty());
    }

    #[test]
    fn test_empty_window() {
        assert_eq!(drop_leading_duplicates(vec![1, 2], &[], same), vec![1, 2]);
    }

    #[test]
    fn test_custom_predicate() {
        let held = vec![(1, "a"), (2, "b")];
        let fetched = vec![(2, "changed"), (3, "c")];
        let kept = drop_leading_duplicates(fetched, &held, |a, b| a.0 == b.0);
        assert_eq!(kept, vec![(3, "c")]);
    }

    #[test]
    fn test_trailing_run_for_prepended_pages() {
        let held = vec![10, 11, 12];
        let fetched = vec![10, 7, 8, 9, 10, 11];
        assert_eq!(drop_trailing_duplicates(fetched, &held, same), vec![10, 7, 8, 9]);
        assert!(drop_trailing_duplicates(vec![11, 12], &held, same).is_empty());
    }

    #[test]
    fn test_seam_window_clamps() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(seam_window(&items, 10, 3), &[7, 8, 9]);
        assert_eq!(seam_window(&items, 0, 3), &[0, 1, 2]);
        assert_eq!(seam_window(&items, 5, 2), &[3, 4, 5, 6]);
        assert_eq!(seam_window(&items, 5, 50), &items[..]);
        assert!(seam_window(&items[..0], 0, 50).is_empty());
    }
}

//! Merged region index
//!
//! Regions are grouped by anchor row and keyed by anchor column inside each
//! group. Two regions anchored in the same row cannot share a column, so per
//! anchor row at most one region can contain a given column. A lookup only
//! visits anchor rows within reach of the queried row, where the reach is
//! the tallest region's height, kept in a multiset of heights.
//!
//! Memory is proportional to the number of regions, not to their area.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellRange, CellStore};
use crate::geometry::Axis;

type AnchorRow = BTreeMap<u32, CellRange>;

/// Index of merged regions
///
/// Invariant: regions never overlap, and every region spans more than one
/// cell.
#[derive(Debug, Default)]
pub struct MergedRegionIndex {
    rows: BTreeMap<u32, AnchorRow>,
    heights: BTreeMap<u32, usize>,
    len: usize,
}

impl MergedRegionIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// The merged range covering an address, if any
    pub fn region_at(&self, row: u32, col: u32) -> Option<&CellRange> {
        self.within_reach(row, row).find_map(|(_, anchors)| {
            anchors
                .range(..=col)
                .next_back()
                .map(|(_, range)| range)
                .filter(|range| range.end.row >= row && range.end.col >= col)
        })
    }

    /// Anchor of the merge covering an address, if any
    pub fn anchor_of(&self, row: u32, col: u32) -> Option<CellAddress> {
        self.region_at(row, col).map(|range| range.start)
    }

    /// Whether an address is the anchor of a merge
    pub fn is_anchor(&self, row: u32, col: u32) -> bool {
        self.get(CellAddress::new(row, col)).is_some()
    }

    /// Merged regions in anchor order
    pub fn regions(&self) -> impl Iterator<Item = &CellRange> {
        self.rows.values().flat_map(|anchors| anchors.values())
    }

    /// Merged regions sharing at least one address with `range`, in no
    /// particular order
    pub fn overlapping<'a>(&'a self, range: &CellRange) -> impl Iterator<Item = &'a CellRange> + 'a {
        let range = *range;
        self.within_reach(range.start.row, range.end.row)
            .flat_map(move |(_, anchors)| {
                // Column spans in one anchor row are disjoint, so sorted by
                // start they are sorted by end as well
                anchors
                    .range(..=range.end.col)
                    .rev()
                    .map(|(_, region)| region)
                    .take_while(move |region| region.end.col >= range.start.col)
            })
            .filter(move |region| region.end.row >= range.start.row)
    }

    /// Number of merged regions
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no region is merged
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `range` overlaps a differently shaped region
    pub fn conflicts_with(&self, range: &CellRange) -> bool {
        self.overlapping(range).any(|existing| existing != range)
    }

    /// Merge `range` into a single cell anchored at its top-left address
    ///
    /// Returns `false` without mutating anything if `range` overlaps a merged
    /// region of different extent. Merging a 1×1 range, or a range that is
    /// already merged exactly, succeeds without change. On success the
    /// anchor cell is materialized in `cells` with span `range` and every
    /// other stored cell inside `range` is dropped.
    pub fn merge(&mut self, cells: &mut CellStore, range: &CellRange) -> bool {
        if range.is_single() || self.get(range.start) == Some(range) {
            return true;
        }
        if self.conflicts_with(range) {
            return false;
        }

        cells.clear_within(range, range.start);
        cells.materialize_anchor(*range);
        self.insert_region(*range);
        true
    }

    /// Remove the merge covering `(row, col)`
    ///
    /// The anchor keeps its content as a 1×1 cell; every other covered
    /// address reverts to a default cell. Returns the removed region, or
    /// `None` if the address was not merged.
    pub fn split(&mut self, cells: &mut CellStore, row: u32, col: u32) -> Option<CellRange> {
        let anchor = self.anchor_of(row, col)?;
        let range = self.remove_region(anchor)?;
        cells.set_span(anchor, CellRange::single(anchor));
        Some(range)
    }

    /// Add a region known not to overlap any other
    pub(crate) fn insert_region(&mut self, range: CellRange) {
        let previous = self
            .rows
            .entry(range.start.row)
            .or_default()
            .insert(range.start.col, range);
        if let Some(previous) = previous {
            self.forget(&previous);
        }
        *self.heights.entry(range.row_count()).or_default() += 1;
        self.len += 1;
    }

    /// Remove and return every region whose span on `axis` ends at or after
    /// `from`
    ///
    /// Regions ending before `from` are untouched by a structural edit at
    /// `from`; the rest are handed to the editor to be reshaped and inserted
    /// again.
    pub(crate) fn take_from(&mut self, axis: Axis, from: u32) -> Vec<CellRange> {
        let mut taken = Vec::new();
        match axis {
            Axis::Row => {
                let reach = self.max_height().saturating_sub(1);
                let reaching: Vec<CellAddress> = self
                    .rows
                    .range(from.saturating_sub(reach)..from)
                    .flat_map(|(_, anchors)| anchors.values())
                    .filter(|range| range.end.row >= from)
                    .map(|range| range.start)
                    .collect();
                for anchor in reaching {
                    let removed = self
                        .rows
                        .get_mut(&anchor.row)
                        .and_then(|anchors| anchors.remove(&anchor.col));
                    taken.extend(removed);
                }
                let tail = self.rows.split_off(&from);
                taken.extend(tail.into_values().flat_map(|anchors| anchors.into_values()));
            }
            Axis::Column => {
                for anchors in self.rows.values_mut() {
                    let first = anchors
                        .range(..from)
                        .next_back()
                        .filter(|(_, range)| range.end.col >= from)
                        .map_or(from, |(&col, _)| col);
                    taken.extend(anchors.split_off(&first).into_values());
                }
            }
        }

        self.rows.retain(|_, anchors| !anchors.is_empty());
        for range in &taken {
            self.forget(range);
        }
        taken
    }

    fn get(&self, anchor: CellAddress) -> Option<&CellRange> {
        self.rows.get(&anchor.row)?.get(&anchor.col)
    }

    fn remove_region(&mut self, anchor: CellAddress) -> Option<CellRange> {
        let anchors = self.rows.get_mut(&anchor.row)?;
        let range = anchors.remove(&anchor.col)?;
        if anchors.is_empty() {
            self.rows.remove(&anchor.row);
        }
        self.forget(&range);
        Some(range)
    }

    /// Drop a removed region from the height multiset and the count
    fn forget(&mut self, range: &CellRange) {
        let height = range.row_count();
        if let Some(n) = self.heights.get_mut(&height) {
            *n -= 1;
            if *n == 0 {
                self.heights.remove(&height);
            }
        }
        self.len -= 1;
    }

    fn max_height(&self) -> u32 {
        self.heights.keys().next_back().copied().unwrap_or(0)
    }

    /// Anchor rows from which a region could reach rows `first..=last`
    fn within_reach(&self, first: u32, last: u32) -> btree_map::Range<'_, u32, AnchorRow> {
        let reach = self.max_height().saturating_sub(1);
        self.rows.range(first.saturating_sub(reach)..=last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, CellValue};

    fn range(s: &str) -> CellRange {
        CellRange::parse(s).unwrap()
    }

    #[test]
    fn test_merge_registers_coverage() {
        let mut cells = CellStore::default();
        let mut merges = MergedRegionIndex::new();

        assert!(merges.merge(&mut cells, &range("C3:D5")));

        assert_eq!(merges.len(), 1);
        assert_eq!(merges.region_at(3, 2), Some(&range("C3:D5")));
        assert_eq!(merges.anchor_of(4, 3), Some(CellAddress::new(2, 2)));
        assert!(merges.is_anchor(2, 2));
        assert!(merges.region_at(5, 2).is_none());
        assert!(merges.region_at(3, 4).is_none());
        assert!(merges.region_at(1, 2).is_none());

        // Anchor is materialized with the merged span
        assert_eq!(cells.get(2, 2).unwrap().range, range("C3:D5"));
    }

    #[test]
    fn test_merge_drops_covered_content() {
        let mut cells = CellStore::default();
        cells.insert(Cell::single(2, 2, "anchor", "base"));
        cells.insert(Cell::single(3, 3, "covered", "base"));
        cells.insert(Cell::single(9, 9, "outside", "base"));
        let mut merges = MergedRegionIndex::new();

        assert!(merges.merge(&mut cells, &range("C3:D5")));

        assert_eq!(cells.cell_count(), 2);
        assert_eq!(
            cells.get(2, 2).unwrap().value,
            CellValue::string("anchor")
        );
        assert!(cells.get(3, 3).is_none());
    }

    #[test]
    fn test_merge_conflicts() {
        let mut cells = CellStore::default();
        let mut merges = MergedRegionIndex::new();
        assert!(merges.merge(&mut cells, &range("B2:D4")));

        // Partial overlap
        assert!(!merges.merge(&mut cells, &range("C3:E6")));
        // Containing an existing merge
        assert!(!merges.merge(&mut cells, &range("A1:F9")));
        // Same extent again
        assert!(merges.merge(&mut cells, &range("B2:D4")));
        // Adjacent
        assert!(merges.merge(&mut cells, &range("E2:E4")));

        assert_eq!(merges.len(), 2);
        assert_eq!(merges.region_at(2, 2), Some(&range("B2:D4")));
    }

    #[test]
    fn test_lookup_reaches_tall_regions_past_other_anchor_rows() {
        let mut cells = CellStore::default();
        let mut merges = MergedRegionIndex::new();
        assert!(merges.merge(&mut cells, &range("A1:A100")));
        assert!(merges.merge(&mut cells, &range("B50:C51")));
        assert!(merges.merge(&mut cells, &range("D60:E60")));

        assert_eq!(merges.anchor_of(79, 0), Some(CellAddress::new(0, 0)));
        assert_eq!(merges.anchor_of(50, 2), Some(CellAddress::new(49, 1)));
        assert_eq!(merges.anchor_of(59, 4), Some(CellAddress::new(59, 3)));
        assert!(merges.region_at(79, 1).is_none());
        assert!(merges.region_at(100, 0).is_none());

        let mut hits: Vec<CellRange> = merges.overlapping(&range("A60:D60")).copied().collect();
        hits.sort_by_key(|r| r.start);
        assert_eq!(hits, vec![range("A1:A100"), range("D60:E60")]);
        assert!(!merges.conflicts_with(&range("B100:B101")));
        assert!(merges.conflicts_with(&range("A100:B100")));
    }

    #[test]
    fn test_huge_merge_is_stored_once() {
        let mut cells = CellStore::default();
        let mut merges = MergedRegionIndex::new();
        let huge = CellRange::from_indices(0, 0, 1_999_999, 9);
        assert!(merges.merge(&mut cells, &huge));

        assert_eq!(merges.len(), 1);
        assert_eq!(merges.region_at(1_500_000, 7), Some(&huge));
        assert!(merges.region_at(1_500_000, 10).is_none());
        assert!(merges.take_from(Axis::Column, 15).is_empty());
        assert_eq!(merges.take_from(Axis::Row, 5), vec![huge]);
        assert!(merges.is_empty());
    }

    #[test]
    fn test_take_from_leaves_regions_before_the_edit() {
        let mut cells = CellStore::default();
        let mut merges = MergedRegionIndex::new();
        for r in ["A1:B2", "D1:E3", "A5:C6", "F8:G9"] {
            assert!(merges.merge(&mut cells, &range(r)));
        }

        let mut taken = merges.take_from(Axis::Row, 2);
        taken.sort_by_key(|r| r.start);
        assert_eq!(taken, vec![range("D1:E3"), range("A5:C6"), range("F8:G9")]);
        assert_eq!(merges.regions().copied().collect::<Vec<_>>(), vec![range("A1:B2")]);

        for r in taken {
            merges.insert_region(r);
        }
        // A5:C6 starts before column 2 but reaches it
        let mut taken = merges.take_from(Axis::Column, 2);
        taken.sort_by_key(|r| r.start);
        assert_eq!(taken, vec![range("D1:E3"), range("A5:C6"), range("F8:G9")]);
        assert_eq!(merges.len(), 1);
        assert_eq!(merges.region_at(1, 1), Some(&range("A1:B2")));
    }

    #[test]
    fn test_single_cell_merge_is_noop() {
        let mut cells = CellStore::default();
        let mut merges = MergedRegionIndex::new();
        assert!(merges.merge(&mut cells, &range("C3")));
        assert!(merges.is_empty());
        assert!(cells.is_empty());
    }

    #[test]
    fn test_split_from_covered_address() {
        let mut cells = CellStore::default();
        cells.insert(Cell::single(2, 2, "anchor", "base"));
        let mut merges = MergedRegionIndex::new();
        merges.merge(&mut cells, &range("C3:D5"));

        assert_eq!(merges.split(&mut cells, 4, 3), Some(range("C3:D5")));

        assert!(merges.is_empty());
        assert!(merges.anchor_of(4, 3).is_none());
        let anchor = cells.get(2, 2).unwrap();
        assert!(!anchor.is_merged());
        assert_eq!(anchor.value, CellValue::string("anchor"));

        // Splitting an unmerged address is a no-op
        assert_eq!(merges.split(&mut cells, 4, 3), None);
    }
}

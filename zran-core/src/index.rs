//! The access-point table: an ordered, append-only sequence of [`AccessPoint`]s.

use crate::access_point::AccessPoint;

/// Fixed DEFLATE sliding window size, carried on the index for serialisation
/// (version >= 1 of the on-disk format records it explicitly).
pub const WINDOW_SIZE: u32 = 32 * 1024;

/// Ordered table of access points plus the policy parameters under which it
/// was built.
///
/// Points are appended only (never mutated or removed); callers obtain
/// shared references into the table, never owned copies of the whole list.
#[derive(Debug, Clone)]
pub struct Index {
    points: Vec<AccessPoint>,
    spacing: u64,
    total_uncompressed: Option<u64>,
    built_complete: bool,
    multi_member_seen: bool,
}

impl Index {
    /// Create an empty index with the given point spacing.
    pub fn new(spacing: u64) -> Self {
        Self {
            points: Vec::new(),
            spacing,
            total_uncompressed: None,
            built_complete: false,
            multi_member_seen: false,
        }
    }

    /// Minimum uncompressed distance between adjacent points.
    pub fn spacing(&self) -> u64 {
        self.spacing
    }

    /// Total uncompressed length of the stream, if a full pass has been made.
    pub fn total_uncompressed(&self) -> Option<u64> {
        self.total_uncompressed
    }

    /// Whether a full decode pass recorded points across the entire stream.
    pub fn built_complete(&self) -> bool {
        self.built_complete
    }

    /// Whether more than one gzip member has been observed.
    pub fn multi_member_seen(&self) -> bool {
        self.multi_member_seen
    }

    /// Number of access points currently recorded.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the table has no access points yet.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the points in increasing offset order.
    pub fn iter(&self) -> impl Iterator<Item = &AccessPoint> {
        self.points.iter()
    }

    /// Append a new access point.
    ///
    /// # Panics
    ///
    /// Panics (via `debug_assert!`) if the invariant that the table is
    /// strictly increasing in both offsets is violated; the driver's
    /// placement policy is responsible for only ever calling this with a
    /// point that extends the table.
    pub(crate) fn append(&mut self, point: AccessPoint) {
        if let Some(last) = self.points.last() {
            debug_assert!(point.uncompressed_offset > last.uncompressed_offset);
            debug_assert!(point.compressed_offset >= last.compressed_offset);
        }
        if point.is_stream_start && !self.points.is_empty() {
            self.multi_member_seen = true;
        }
        self.points.push(point);
    }

    /// Record the stream's total uncompressed length once known (after a
    /// full decode pass).
    pub(crate) fn set_total_uncompressed(&mut self, total: u64) {
        self.total_uncompressed = Some(total);
    }

    /// Mark the index as covering the whole stream.
    pub(crate) fn set_built_complete(&mut self, complete: bool) {
        self.built_complete = complete;
    }

    /// Remove all points and reset derived state, keeping `spacing`.
    pub fn clear(&mut self) {
        self.points.clear();
        self.total_uncompressed = None;
        self.built_complete = false;
        self.multi_member_seen = false;
    }

    /// The greatest point with `uncompressed_offset <= off`, if any.
    pub fn find_by_uncompressed(&self, off: u64) -> Option<&AccessPoint> {
        let idx = self
            .points
            .partition_point(|p| p.uncompressed_offset <= off);
        idx.checked_sub(1).map(|i| &self.points[i])
    }

    /// The greatest point with `compressed_offset <= off`, if any.
    pub fn find_by_compressed(&self, off: u64) -> Option<&AccessPoint> {
        let idx = self.points.partition_point(|p| p.compressed_offset <= off);
        idx.checked_sub(1).map(|i| &self.points[i])
    }

    /// `(compressed_offset, uncompressed_offset)` for every point, in order.
    pub fn seek_points(&self) -> Vec<(u64, u64)> {
        self.points
            .iter()
            .map(|p| (p.compressed_offset, p.uncompressed_offset))
            .collect()
    }

    pub(crate) fn points(&self) -> &[AccessPoint] {
        &self.points
    }

    pub(crate) fn from_points(points: Vec<AccessPoint>, spacing: u64) -> Self {
        let multi_member_seen = points.iter().filter(|p| p.is_stream_start).count() > 1;
        Self {
            points,
            spacing,
            total_uncompressed: None,
            built_complete: false,
            multi_member_seen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(u: u64, c: u64) -> AccessPoint {
        AccessPoint::block_boundary(u, c, 0, vec![0u8; 32 * 1024])
    }

    #[test]
    fn empty_index_finds_nothing() {
        let idx = Index::new(1024);
        assert!(idx.find_by_uncompressed(0).is_none());
        assert!(idx.find_by_compressed(0).is_none());
    }

    #[test]
    fn find_by_uncompressed_picks_greatest_leq() {
        let mut idx = Index::new(1024);
        idx.append(pt(0, 0));
        idx.append(pt(1000, 100));
        idx.append(pt(2000, 200));

        assert_eq!(idx.find_by_uncompressed(1999).unwrap().uncompressed_offset, 1000);
        assert_eq!(idx.find_by_uncompressed(2000).unwrap().uncompressed_offset, 2000);
        assert_eq!(idx.find_by_uncompressed(50_000).unwrap().uncompressed_offset, 2000);
    }

    #[test]
    fn find_by_compressed_picks_greatest_leq() {
        let mut idx = Index::new(1024);
        idx.append(pt(0, 0));
        idx.append(pt(1000, 100));

        assert_eq!(idx.find_by_compressed(50).unwrap().compressed_offset, 0);
        assert_eq!(idx.find_by_compressed(100).unwrap().compressed_offset, 100);
    }

    #[test]
    fn seek_points_matches_appended_points() {
        let mut idx = Index::new(1024);
        idx.append(pt(0, 0));
        idx.append(pt(1000, 100));
        assert_eq!(idx.seek_points(), vec![(0, 0), (100, 1000)]);
    }

    #[test]
    fn clear_resets_everything_but_spacing() {
        let mut idx = Index::new(4096);
        idx.append(pt(0, 0));
        idx.set_total_uncompressed(9000);
        idx.set_built_complete(true);
        idx.clear();
        assert_eq!(idx.len(), 0);
        assert_eq!(idx.spacing(), 4096);
        assert!(idx.total_uncompressed().is_none());
        assert!(!idx.built_complete());
    }
}

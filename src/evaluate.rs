//! Assembly of pitch-control surfaces from a pointwise [`ControlModel`].
//!
//! Every cell is independent, so cells are evaluated in parallel. The result is collected in
//! row-major order regardless of scheduling, making surfaces bit-for-bit reproducible.

use std::ops::AddAssign;
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::control::ControlModel;
use crate::domain::EventSnapshot;
use crate::field::FieldGrid;
use crate::surface::Surface;

/// Evaluates the attacking team's control probability at every cell centre of `grid`.
pub fn evaluate<M: ControlModel + ?Sized>(model: &M, snapshot: &EventSnapshot, grid: &FieldGrid) -> Surface {
    let values = (0..grid.len())
        .into_par_iter()
        .map(|index| model.attacking_control(snapshot, grid.centre_at(index)))
        .collect();
    Surface::from_values(grid, values)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}
impl CacheStats {
    pub fn lookups(&self) -> usize {
        self.hits + self.misses
    }
}

impl AddAssign<bool> for CacheStats {
    fn add_assign(&mut self, cache_hit: bool) {
        if cache_hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }
}

type SnapshotKey = Vec<u64>;

/// Memoises surfaces by exact snapshot contents. A cache is meant to live for one analysis call;
/// it is tied to the model and grid it was first used with.
#[derive(Debug, Default)]
pub struct SurfaceCache {
    surfaces: FxHashMap<SnapshotKey, Arc<Surface>>,
    stats: CacheStats,
}
impl SurfaceCache {
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn evaluate<M: ControlModel + ?Sized>(
        &mut self,
        model: &M,
        snapshot: &EventSnapshot,
        grid: &FieldGrid,
    ) -> Arc<Surface> {
        let key = snapshot.cache_key();
        let cache_hit = self.surfaces.contains_key(&key);
        self.stats += cache_hit;
        self.surfaces
            .entry(key)
            .or_insert_with(|| Arc::new(evaluate(model, snapshot, grid)))
            .clone()
    }

    /// Evaluates a batch of snapshots, computing the distinct uncached ones in parallel. Surfaces
    /// are returned in the order of `snapshots`.
    pub fn evaluate_all<M: ControlModel + ?Sized>(
        &mut self,
        model: &M,
        snapshots: &[EventSnapshot],
        grid: &FieldGrid,
    ) -> Vec<Arc<Surface>> {
        let keys: Vec<_> = snapshots.iter().map(EventSnapshot::cache_key).collect();
        let mut pending = FxHashMap::default();
        for (index, key) in keys.iter().enumerate() {
            let cache_hit = self.surfaces.contains_key(key) || pending.contains_key(key);
            self.stats += cache_hit;
            if !cache_hit {
                pending.insert(key.clone(), index);
            }
        }

        let computed: Vec<_> = pending
            .into_par_iter()
            .map(|(key, index)| (key, Arc::new(evaluate(model, &snapshots[index], grid))))
            .collect();
        self.surfaces.extend(computed);

        keys.iter().map(|key| self.surfaces[key].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::VoronoiModel;
    use crate::counterfactual::{generate, Modification};
    use crate::field::PitchBounds;
    use crate::testing::{duel, small_grid, CountingModel, HOME_4};

    #[test]
    fn evaluate_duel() {
        let grid = small_grid();
        let surface = evaluate(&VoronoiModel::default(), &duel(), &grid);
        assert_eq!(grid.len(), surface.len());
        // away attacks from the right half
        for row in 0..surface.rows() {
            for col in 0..surface.cols() {
                let expected = if grid.x(col) < 0.0 { 0.0 } else { 1.0 };
                assert_eq!(expected, surface[(row, col)], "row {row}, col {col}");
            }
        }
    }

    #[test]
    fn evaluate_calls_model_once_per_cell() {
        let grid = small_grid();
        let model = CountingModel::new(VoronoiModel::default());
        evaluate(&model, &duel(), &grid);
        assert_eq!(grid.len(), model.calls());
    }

    #[test]
    fn evaluate_is_reproducible() {
        let grid = small_grid();
        let model = VoronoiModel::with_lookahead(0.5);
        assert_eq!(evaluate(&model, &duel(), &grid), evaluate(&model, &duel(), &grid));
    }

    #[test]
    fn cache_hits_on_identical_snapshots() {
        let grid = small_grid();
        let model = CountingModel::new(VoronoiModel::default());
        let mut cache = SurfaceCache::default();
        let first = cache.evaluate(&model, &duel(), &grid);
        let second = cache.evaluate(&model, &duel(), &grid);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(CacheStats { hits: 1, misses: 1 }, cache.stats());
        assert_eq!(grid.len(), model.calls());
    }

    #[test]
    fn cache_batch() {
        let grid = small_grid();
        let model = CountingModel::new(VoronoiModel::default());
        let bounds = PitchBounds::new(grid.dimensions(), 0.0);
        let baseline = duel();
        let absent = generate(&baseline, HOME_4, &Modification::Presence, &bounds).unwrap();

        let mut cache = SurfaceCache::default();
        cache.evaluate(&model, &baseline, &grid);
        let surfaces = cache.evaluate_all(&model, &[absent.clone(), baseline.clone(), absent], &grid);
        assert_eq!(3, surfaces.len());
        assert!(Arc::ptr_eq(&surfaces[0], &surfaces[2]));
        assert!(surfaces[0].values().iter().all(|&value| value == 1.0));
        assert_eq!(2, cache.len());
        assert_eq!(CacheStats { hits: 2, misses: 2 }, cache.stats());
        assert_eq!(4, cache.stats().lookups());
        assert_eq!(2 * grid.len(), model.calls());
    }
}

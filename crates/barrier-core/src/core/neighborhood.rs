use crate::core::models::conformation::angular_difference;
use crate::core::models::model::Model;
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::DVector;
use std::ops::Range;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Rows of the upper triangle computed per progress step.
const NEIGHBOR_ROW_BATCH: usize = 64;

/// A distance policy over models and the adjacency it induces.
///
/// Implementors only need [`distance`](Neighborhood::distance) and
/// [`maximum_distance`](Neighborhood::maximum_distance); the adjacency computation is provided.
pub trait Neighborhood<M: Model>: Send + Sync {
    /// Distance between two models. Must be symmetric and non-negative.
    fn distance(&self, a: &M, b: &M) -> f64;

    /// Largest distance any model of the same shape as `model` can have from it.
    fn maximum_distance(&self, model: &M) -> f64;

    /// Computes, for every model, the ascending indices of all other models within
    /// `max_distance` (inclusive).
    ///
    /// The result is symmetric: `j` is in list `i` iff `i` is in list `j`.
    fn calculate_neighbors(
        &self,
        models: &[M],
        max_distance: f64,
        reporter: &ProgressReporter,
    ) -> Vec<Vec<usize>> {
        let n = models.len();
        reporter.report(Progress::TaskStart {
            total_steps: n as u64,
        });

        let batches: Vec<Range<usize>> = (0..n)
            .step_by(NEIGHBOR_ROW_BATCH)
            .map(|start| start..(start + NEIGHBOR_ROW_BATCH).min(n))
            .collect();
        let upper_rows = |rows: Range<usize>| -> Vec<Vec<usize>> {
            let steps = rows.len() as u64;
            let batch = rows
                .map(|i| {
                    ((i + 1)..n)
                        .filter(|&j| self.distance(&models[i], &models[j]) <= max_distance)
                        .collect()
                })
                .collect();
            reporter.report(Progress::TaskAdvance { steps });
            batch
        };

        #[cfg(not(feature = "parallel"))]
        let upper: Vec<Vec<usize>> = batches.into_iter().flat_map(upper_rows).collect();

        #[cfg(feature = "parallel")]
        let upper: Vec<Vec<usize>> = batches
            .into_par_iter()
            .map(upper_rows)
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();

        reporter.report(Progress::TaskFinish);

        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, row) in upper.into_iter().enumerate() {
            for j in row {
                neighbors[i].push(j);
                neighbors[j].push(i);
            }
        }
        neighbors
    }
}

/// How per-angle differences are reduced to a single distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TorsionMetric {
    /// Largest absolute wrapped angle difference.
    #[default]
    MaxAbsolute,
    /// Euclidean norm of the wrapped angle differences.
    Euclidean,
}

/// Periodic distance over torsion angles given in degrees.
///
/// Models are compared angle by angle over their common length; every difference is taken
/// along the shorter arc, so the distance between 179 and -179 degrees is 2.
#[derive(Debug, Clone, Copy, Default)]
pub struct TorsionNeighborhood {
    metric: TorsionMetric,
}

impl TorsionNeighborhood {
    pub fn new(metric: TorsionMetric) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> TorsionMetric {
        self.metric
    }

    fn differences<M: Model>(a: &M, b: &M) -> DVector<f64> {
        let n = a.size().min(b.size());
        DVector::from_iterator(
            n,
            (0..n).map(|i| angular_difference(a.angle(i), b.angle(i))),
        )
    }
}

impl<M: Model> Neighborhood<M> for TorsionNeighborhood {
    fn distance(&self, a: &M, b: &M) -> f64 {
        let differences = Self::differences(a, b);
        if differences.is_empty() {
            return 0.0;
        }
        match self.metric {
            TorsionMetric::MaxAbsolute => differences.amax(),
            TorsionMetric::Euclidean => differences.norm(),
        }
    }

    fn maximum_distance(&self, model: &M) -> f64 {
        match self.metric {
            TorsionMetric::MaxAbsolute => 180.0,
            TorsionMetric::Euclidean => 180.0 * (model.size() as f64).sqrt(),
        }
    }
}

/// Computes the neighbor lists with logging, for use by the construction workflows.
#[instrument(skip_all, name = "neighbor_calculation")]
pub fn neighbor_lists<M: Model>(
    neighborhood: &dyn Neighborhood<M>,
    models: &[M],
    max_distance: f64,
    reporter: &ProgressReporter,
) -> Vec<Vec<usize>> {
    let lists = reporter.phase("Neighbor calculation", || {
        neighborhood.calculate_neighbors(models, max_distance, reporter)
    });
    let edges: usize = lists.iter().map(Vec::len).sum::<usize>() / 2;
    debug!(
        models = models.len(),
        edges,
        max_distance,
        "Neighbor lists computed."
    );
    lists
}

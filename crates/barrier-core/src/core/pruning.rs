//! Removal of near-duplicate models before a forest is built.
//!
//! Two models closer than the pruning distance describe the same basin for the purpose of a
//! barrier forest; keeping both only inflates the quadratic construction phases. Of such a
//! pair the model with the higher fitness is dropped.

use crate::core::models::model::Model;
use crate::core::neighborhood::Neighborhood;
use crate::core::utils::compare::{definitely_greater, definitely_less};
use crate::engine::error::{EngineError, ensure_threshold};
use tracing::{debug, instrument, trace};

/// Removes models closer than `min_distance` to an earlier survivor.
///
/// Every unordered pair that has not been discarded yet is compared. If the pair is closer
/// than `min_distance`, the model with the higher fitness is discarded; on a tie the later one
/// is. Survivors keep their relative input order, and every surviving pair is at least
/// `min_distance` apart.
///
/// # Errors
///
/// Returns [`EngineError::InvalidThreshold`] for a negative or NaN `min_distance`.
#[instrument(skip_all, name = "batch_pruning")]
pub fn prune<M: Model>(
    models: Vec<M>,
    neighborhood: &dyn Neighborhood<M>,
    min_distance: f64,
) -> Result<Vec<M>, EngineError> {
    ensure_threshold("pruning_threshold", min_distance)?;

    let n = models.len();
    let mut discarded = vec![false; n];

    for i in 0..n {
        if discarded[i] {
            continue;
        }
        for j in (i + 1)..n {
            if discarded[j] {
                continue;
            }
            if neighborhood.distance(&models[i], &models[j]) < min_distance {
                if definitely_greater(models[i].evaluate(), models[j].evaluate()) {
                    trace!(kept = j, dropped = i, "Pruned duplicate model.");
                    discarded[i] = true;
                    break;
                }
                trace!(kept = i, dropped = j, "Pruned duplicate model.");
                discarded[j] = true;
            }
        }
    }

    let survivors: Vec<M> = models
        .into_iter()
        .zip(discarded)
        .filter_map(|(model, dropped)| (!dropped).then_some(model))
        .collect();

    debug!(
        input = n,
        survivors = survivors.len(),
        min_distance,
        "Batch pruning finished."
    );
    Ok(survivors)
}

/// What happened to a model offered to a [`StreamingPruner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneOutcome {
    /// Appended as a new accepted model at this index.
    Accepted(usize),
    /// Replaced the higher-fitness accepted model at this index.
    Replaced(usize),
    /// Close to at least one sampled accepted model, none of which it improves on.
    Rejected,
}

/// Single-pass pruning for trajectories too large to re-scan.
///
/// A candidate is compared only against a logarithmic sample of the accepted models: the most
/// recent one, then those 1, 2, 4, 8, ... positions before it, and finally the first one.
/// Trajectories are temporally correlated, so near-duplicates are almost always recent; the
/// sample keeps the whole pass at O(n log n) distance evaluations at the cost of occasionally
/// keeping a distant duplicate.
pub struct StreamingPruner<'a, M: Model> {
    neighborhood: &'a dyn Neighborhood<M>,
    min_distance: f64,
    accepted: Vec<M>,
    offered: usize,
}

impl<'a, M: Model> StreamingPruner<'a, M> {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidThreshold`] for a negative or NaN `min_distance`.
    pub fn new(
        neighborhood: &'a dyn Neighborhood<M>,
        min_distance: f64,
    ) -> Result<Self, EngineError> {
        ensure_threshold("pruning_threshold", min_distance)?;
        Ok(Self {
            neighborhood,
            min_distance,
            accepted: Vec::new(),
            offered: 0,
        })
    }

    /// Offers `candidate` to the pruner.
    ///
    /// The candidate replaces the first sampled model that is close to it and has a higher
    /// fitness. Close models it does not improve on keep the scan going, so an older worse
    /// duplicate can still be replaced. It is appended only when no sampled model is close.
    pub fn offer(&mut self, candidate: M) -> PruneOutcome {
        self.offered += 1;

        let mut isolated = true;
        for index in probe_indices(self.accepted.len()) {
            let existing = &self.accepted[index];
            if self.neighborhood.distance(&candidate, existing) < self.min_distance {
                if definitely_less(candidate.evaluate(), existing.evaluate()) {
                    self.accepted[index] = candidate;
                    return PruneOutcome::Replaced(index);
                }
                isolated = false;
            }
        }

        if !isolated {
            return PruneOutcome::Rejected;
        }
        self.accepted.push(candidate);
        PruneOutcome::Accepted(self.accepted.len() - 1)
    }

    pub fn accepted(&self) -> &[M] {
        &self.accepted
    }

    pub fn offered(&self) -> usize {
        self.offered
    }

    pub fn finish(self) -> Vec<M> {
        debug!(
            offered = self.offered,
            accepted = self.accepted.len(),
            min_distance = self.min_distance,
            "Streaming pruning finished."
        );
        self.accepted
    }
}

/// Streams `models` through a [`StreamingPruner`] and returns the accepted ones.
pub fn prune_streaming<M: Model>(
    models: impl IntoIterator<Item = M>,
    neighborhood: &dyn Neighborhood<M>,
    min_distance: f64,
) -> Result<Vec<M>, EngineError> {
    let mut pruner = StreamingPruner::new(neighborhood, min_distance)?;
    for model in models {
        pruner.offer(model);
    }
    Ok(pruner.finish())
}

/// Indices `k, k-1, k-2, k-4, ...` for `k = len - 1`, always ending with `0`.
fn probe_indices(len: usize) -> Vec<usize> {
    let Some(last) = len.checked_sub(1) else {
        return Vec::new();
    };

    let mut indices = vec![last];
    let mut offset = 1;
    while offset <= last {
        indices.push(last - offset);
        offset *= 2;
    }
    if indices.last() != Some(&0) {
        indices.push(0);
    }
    indices
}

use crate::core::utils::compare::compare_values;
use std::cmp::Ordering;
use std::fmt;

/// A single configuration of a molecular system together with its fitness.
///
/// Implementors describe the configuration as an ordered list of angles and expose a scalar
/// fitness ("energy"), where lower is better. The fitness must be cached by the implementor
/// and invalidated whenever an angle changes. `Clone` is expected to produce a deep,
/// independent copy.
pub trait Model: Clone + Send + Sync + fmt::Debug {
    /// Number of angles describing the configuration.
    fn size(&self) -> usize;

    /// Returns the angle at `index`, in degrees.
    fn angle(&self, index: usize) -> f64;

    /// Sets the angle at `index`, in degrees, invalidating the cached fitness.
    fn set_angle(&mut self, index: usize, value: f64);

    /// Returns the (cached) fitness of this configuration.
    fn evaluate(&self) -> f64;

    /// Optional external identifier, e.g. the frame index in a trajectory.
    fn id(&self) -> Option<usize> {
        None
    }

    fn set_id(&mut self, _id: usize) {}
}

/// Orders two models by fitness with the crate-wide tolerance.
pub fn compare_models<M: Model>(a: &M, b: &M) -> Ordering {
    compare_values(a.evaluate(), b.evaluate())
}

/// Returns `true` when `models` is sorted strictly ascending by fitness.
pub fn is_strictly_ascending<M: Model>(models: &[M]) -> bool {
    models
        .windows(2)
        .all(|pair| compare_models(&pair[0], &pair[1]) == Ordering::Less)
}

/// Sorts models ascending by fitness, keeping the input order of equal values.
///
/// Sorting uses the exact IEEE total order rather than the tolerance comparison, because the
/// tolerance comparison is not transitive.
pub fn sort_by_fitness<M: Model>(models: &mut [M]) {
    models.sort_by(|a, b| a.evaluate().total_cmp(&b.evaluate()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::conformation::Conformation;

    #[test]
    fn compare_models_uses_tolerance() {
        let a = Conformation::recorded(vec![0.0], 1.0);
        let b = Conformation::recorded(vec![10.0], 1.0 + 1e-12);
        let c = Conformation::recorded(vec![20.0], 2.0);

        assert_eq!(compare_models(&a, &b), Ordering::Equal);
        assert_eq!(compare_models(&a, &c), Ordering::Less);
        assert_eq!(compare_models(&c, &a), Ordering::Greater);
    }

    #[test]
    fn ascending_check_rejects_ties_and_inversions() {
        let ascending: Vec<_> = [0.0, 1.0, 2.0]
            .iter()
            .map(|&e| Conformation::recorded(vec![e], e))
            .collect();
        let tied: Vec<_> = [0.0, 1.0, 1.0]
            .iter()
            .map(|&e| Conformation::recorded(vec![e], e))
            .collect();
        let inverted: Vec<_> = [1.0, 0.0]
            .iter()
            .map(|&e| Conformation::recorded(vec![e], e))
            .collect();

        assert!(is_strictly_ascending(&ascending));
        assert!(!is_strictly_ascending(&tied));
        assert!(!is_strictly_ascending(&inverted));
    }

    #[test]
    fn sort_by_fitness_is_stable() {
        let mut models = vec![
            Conformation::recorded(vec![0.0], 3.0).with_id(0),
            Conformation::recorded(vec![1.0], 1.0).with_id(1),
            Conformation::recorded(vec![2.0], 3.0).with_id(2),
            Conformation::recorded(vec![3.0], -1.0).with_id(3),
        ];
        sort_by_fitness(&mut models);

        let ids: Vec<_> = models.iter().map(|m| m.id().unwrap()).collect();
        assert_eq!(ids, vec![3, 1, 0, 2]);
    }
}

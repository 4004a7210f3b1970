use crate::core::models::conformation::angular_difference;
use crate::core::models::model::Model;
use crate::core::utils::compare::definitely_greater;

/// Synthesizes the highest point on a transition between two models.
///
/// The returned model is the barrier between `from` and `to`: its fitness is what has to be
/// overcome to move from one to the other along whatever path the connector explores.
pub trait Connector<M: Model>: Send + Sync {
    fn connect(&self, from: &M, to: &M) -> M;
}

/// Walks the straight (shortest periodic arc) line between two models.
///
/// The transition is sampled at `steps` equal increments. Both endpoints are part of the
/// walk, so the returned barrier is never lower than either of them.
#[derive(Debug, Clone, Copy)]
pub struct LinearConnector {
    steps: usize,
}

impl LinearConnector {
    pub const DEFAULT_STEPS: usize = 32;

    pub fn new(steps: usize) -> Self {
        Self {
            steps: steps.max(1),
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl Default for LinearConnector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEPS)
    }
}

impl<M: Model> Connector<M> for LinearConnector {
    fn connect(&self, from: &M, to: &M) -> M {
        let mut worst = if definitely_greater(from.evaluate(), to.evaluate()) {
            from.clone()
        } else {
            to.clone()
        };

        let n = from.size().min(to.size());
        let deltas: Vec<f64> = (0..n)
            .map(|i| angular_difference(from.angle(i), to.angle(i)))
            .collect();

        for step in 1..self.steps {
            let t = step as f64 / self.steps as f64;
            let mut candidate = from.clone();
            for (i, delta) in deltas.iter().enumerate() {
                candidate.set_angle(i, from.angle(i) + t * delta);
            }
            if definitely_greater(candidate.evaluate(), worst.evaluate()) {
                worst = candidate;
            }
        }
        worst
    }
}

use super::model::Model;
use nalgebra::DVector;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Computes the fitness of a set of torsion angles (in degrees).
///
/// This is the seam where a force field or any other scoring function plugs in. Closures of
/// the form `Fn(&[f64]) -> f64` implement it directly.
pub trait EnergyFunction: Send + Sync {
    fn energy(&self, angles: &[f64]) -> f64;
}

impl<F> EnergyFunction for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn energy(&self, angles: &[f64]) -> f64 {
        self(angles)
    }
}

/// A torsion-angle configuration with a lazily evaluated, cached energy.
///
/// A conformation either owns a shared [`EnergyFunction`] (and can be re-evaluated after its
/// angles change), or it is *recorded*: its energy was read from external data, e.g. a
/// trajectory frame. Changing an angle of a recorded conformation leaves it without a known
/// energy, and [`Model::evaluate`] then returns NaN.
#[derive(Clone)]
pub struct Conformation {
    /// Torsion angles in degrees.
    angles: DVector<f64>,
    /// Cached energy, cleared on every mutation.
    energy: OnceLock<f64>,
    /// Scoring function, absent for recorded conformations.
    function: Option<Arc<dyn EnergyFunction>>,
    /// Optional external identifier (e.g. the trajectory frame).
    id: Option<usize>,
}

impl Conformation {
    /// Creates a conformation scored by `function`.
    ///
    /// # Arguments
    ///
    /// * `angles` - Torsion angles in degrees.
    /// * `function` - The shared energy function used to evaluate this conformation and every
    ///   copy derived from it.
    pub fn new(angles: Vec<f64>, function: Arc<dyn EnergyFunction>) -> Self {
        Self {
            angles: DVector::from_vec(angles),
            energy: OnceLock::new(),
            function: Some(function),
            id: None,
        }
    }

    /// Creates a conformation with an already known energy.
    ///
    /// # Arguments
    ///
    /// * `angles` - Torsion angles in degrees.
    /// * `energy` - The recorded energy of this configuration.
    pub fn recorded(angles: Vec<f64>, energy: f64) -> Self {
        let cache = OnceLock::new();
        let _ = cache.set(energy);
        Self {
            angles: DVector::from_vec(angles),
            energy: cache,
            function: None,
            id: None,
        }
    }

    pub fn with_id(mut self, id: usize) -> Self {
        self.id = Some(id);
        self
    }

    pub fn angles(&self) -> &DVector<f64> {
        &self.angles
    }

    pub fn is_recorded(&self) -> bool {
        self.function.is_none()
    }
}

impl Model for Conformation {
    fn size(&self) -> usize {
        self.angles.len()
    }

    fn angle(&self, index: usize) -> f64 {
        self.angles[index]
    }

    fn set_angle(&mut self, index: usize, value: f64) {
        self.angles[index] = value;
        self.energy = OnceLock::new();
    }

    fn evaluate(&self) -> f64 {
        *self.energy.get_or_init(|| match &self.function {
            Some(function) => function.energy(self.angles.as_slice()),
            None => f64::NAN,
        })
    }

    fn id(&self) -> Option<usize> {
        self.id
    }

    fn set_id(&mut self, id: usize) {
        self.id = Some(id);
    }
}

impl fmt::Debug for Conformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conformation")
            .field("id", &self.id)
            .field("angles", &self.angles.as_slice())
            .field("energy", &self.energy.get())
            .field("recorded", &self.is_recorded())
            .finish()
    }
}

/// Wraps an angle in degrees into the half-open interval `(-180, 180]`.
pub fn wrap_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Signed shortest rotation from `from` to `to`, in degrees.
pub fn angular_difference(from: f64, to: f64) -> f64 {
    wrap_angle(to - from)
}

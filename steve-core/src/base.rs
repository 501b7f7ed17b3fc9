//! Core functionalities.
mod env;
mod policy;
mod step;
pub use env::Env;
pub use policy::Policy;
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
pub trait Obs: Clone + Debug {
    /// Returns a placeholder observation of the given length.
    ///
    /// The values of a placeholder are all zero and carry no information.
    fn dummy(len: usize) -> Self;

    /// Returns the number of elements of the observation.
    fn len(&self) -> usize;
}

/// An action of an environment.
pub trait Act: Clone + Debug {}

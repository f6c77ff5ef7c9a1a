//! Hyperparameter adaptation mechanisms
//!
//! Adaptive control in Eiben et al.'s classification: parameters change in
//! response to feedback from the search process, here population diversity.

pub mod adaptive;

pub use adaptive::AdaptiveRateControl;

pub mod prelude {
    pub use super::adaptive::*;
}

//! hpa-fleet — simulated pods of one deployment.
//!
//! A [`Deployment`] owns its pods and walks each of them through
//!
//! ```text
//! Starting --(startup elapsed)--> Running --(excess)--> Terminating --(shutdown elapsed)--> removed
//! ```
//!
//! once per call to [`Deployment::reconcile`]. A scale-up is not capacity
//! until the startup delay passes, and a scale-down keeps pods around for
//! their grace period.

pub mod deployment;
pub mod pod;

pub use deployment::{Deployment, ReconcileReport};
pub use pod::Pod;

//! Filesystem shell around `roverseg-pipeline`.
//!
//! The pipeline crate is pure and sans-IO; everything that touches the
//! filesystem lives here: reading images, writing masks or debug
//! composites, and the parallel batch evaluation harness.

pub mod eval;
pub mod run;

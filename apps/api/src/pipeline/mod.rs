// CV processing pipeline: stage sequencing, run state, artifact auditing
// and the filename conventions that tie a run's artifacts together.

pub mod error;
pub mod naming;
pub mod orchestrator;
pub mod run;
pub mod stage;
pub mod tracker;

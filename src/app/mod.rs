// logclean - app/mod.rs
//
// Application layer: discovery, backup, scheduling, and the orchestration
// that ties the pure core to the filesystem.

pub mod backup;
pub mod discovery;
pub mod run;
pub mod schedule;

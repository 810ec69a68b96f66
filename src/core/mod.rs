// logclean - core/mod.rs
//
// Pure logic: statement matching, rewriting, log segmentation, retention.
// Nothing in this layer touches the filesystem.

pub mod matcher;
pub mod model;
pub mod retention;
pub mod rewriter;
pub mod segment;

// logclean - lib.rs
//
// Library root. Layering:
//   core     - pure logic (matching, rewriting, segmentation, retention)
//   app      - orchestration and filesystem effects
//   platform - OS paths and configuration
//   util     - constants, errors, logging

pub mod app;
pub mod core;
pub mod platform;
pub mod util;

// logclean - platform/mod.rs
//
// Platform specifics: directory resolution and configuration loading.

pub mod config;

//! Cross-crate scenario and property tests for the Shadowy wallet engine.
//!
//! Scenarios drive the full create/load, select, build, sign and broadcast
//! path against an in-process node double.

pub mod helpers;

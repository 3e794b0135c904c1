//! Shared utilities for the showcase runtime.

pub mod frame_timing;

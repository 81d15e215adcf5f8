//! Background Tasks Module
//!
//! Contains tasks spawned on the tokio runtime.
//!
//! # Tasks
//! - Demonstration: scripted cache reads and writes on timers

mod demo;

pub use demo::{
    demo_config, register_log_listeners, spawn_demo_task, DemoTimings, SharedCache, StatsReport,
};

//! # Workflows Module
//!
//! Top-level entry points that tie the engine to the input and output layers.
//!
//! - **Optimization Workflow** ([`optimize`]) - one recorded run: minimize,
//!   then persist the energy log and the final spin table
//! - **Benchmark Workflow** ([`benchmark`]) - several update rules over
//!   repeated trials, compared against the input configuration and summarized
//!   in one table

pub mod benchmark;
pub mod optimize;

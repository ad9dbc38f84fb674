//! # Core Module
//!
//! The computational foundation of spinmin: how a spin lattice is represented,
//! how its energy is evaluated, and how its tables move in and out of files.
//!
//! - **Lattice Representation** ([`models`]) - Spin sites, coupling records and the assembled `SpinSystem`
//! - **Energy Evaluation** ([`hamiltonian`]) - Energy breakdown, per-term kernels and the `Hamiltonian`
//! - **File I/O** ([`io`]) - UppASD-style input tables, CSV spin tables and run-log artifacts
//! - **Analysis** ([`analysis`]) - Angular comparison of two spin configurations

pub mod analysis;
pub mod hamiltonian;
pub mod io;
pub mod models;

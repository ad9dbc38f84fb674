//! # spinmin Core Library
//!
//! Energy evaluation and constraint-preserving minimization of classical spin
//! lattices under a generalized Heisenberg Hamiltonian (exchange,
//! Dzyaloshinskii-Moriya, single-ion anisotropy and Zeeman terms).
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`SpinSystem`), the pure
//!   Hamiltonian with its analytic gradient, table readers/writers and the
//!   post-hoc comparison metric.
//!
//! - **[`engine`]: The Logic Core.** The stateful optimization loop: update rules
//!   (SGD, Adam, AdamW, RMSprop, Adagrad, L-BFGS), the normalized objective, the
//!   iteration history, configuration and error types.
//!
//! - **[`workflows`]: The Public API.** Complete procedures that tie `engine` and
//!   `core` together: a single recorded optimization run and the multi-rule
//!   benchmark.

pub mod core;
pub mod engine;
pub mod workflows;

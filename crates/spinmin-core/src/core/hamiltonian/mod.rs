//! # Hamiltonian Module
//!
//! Energy evaluation for a lattice of classical spins under the generalized
//! Heisenberg Hamiltonian
//!
//! ```text
//! E = - sum_ij J_ij (s_i . s_j)
//!     - sum_ij D_ij . (s_i x s_j)
//!     - sum_i  K1_i (s_i . e_i)^2
//!     - sum_i  B . s_i
//! ```
//!
//! ## Key Components
//!
//! - [`term`] - The additive [`term::EnergyBreakdown`] returned by every evaluation
//! - [`potentials`] - Per-pair and per-site energy kernels with their analytic gradients
//! - [`evaluator`] - The [`evaluator::Hamiltonian`], which owns the validated coupling tables
//!
//! ## Usage
//!
//! ```ignore
//! use spinmin::core::hamiltonian::evaluator::{ExchangePair, Hamiltonian};
//!
//! let hamiltonian = Hamiltonian::new(2, vec![ExchangePair::new(0, 1, 1.0)], None, None)?;
//! let energy = hamiltonian.evaluate(&spins, None)?;
//! assert_eq!(energy.total(), energy.heisenberg);
//! ```

pub mod evaluator;
pub(crate) mod potentials;
pub mod term;

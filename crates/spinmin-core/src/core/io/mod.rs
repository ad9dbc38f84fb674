//! Reading lattice descriptions and writing optimization artifacts.
//!
//! UppASD-style whitespace tables are parsed through the [`traits::TableFile`]
//! interface, spin configurations travel as CSV, and finished runs are
//! persisted by the [`run_log`] emitter.

pub mod discovery;
pub mod run_log;
pub mod spin_table;
pub mod traits;
pub mod uppasd;

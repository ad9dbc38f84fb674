//! Data structures describing a classical spin lattice.
//!
//! A lattice is a table of spin sites (keyed by an integer site identifier)
//! plus sparse coupling lists that reference those sites. The [`system`]
//! module assembles them into a [`system::SpinSystem`] whose couplings are
//! resolved to a dense `0..N` index order.

pub mod coupling;
pub mod spin;
pub mod system;

//! # Engine Module
//!
//! The stateful side of spin minimization: the optimization loop and
//! everything it carries from one step to the next.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - update-rule selection, learning rate,
//!   step count and rule-specific parameters, validated by a builder
//! - **Objective** - the Hamiltonian as a function of raw, unnormalized
//!   parameters, with the gradient chained through normalization
//! - **Update rules** ([`rules`]) - SGD, Adam, AdamW, RMSprop, Adagrad and
//!   fixed-step L-BFGS, dispatched through one tagged enum
//! - **Optimizer** ([`optimizer`]) - the normalize / evaluate / step / project
//!   loop
//! - **State Tracking** ([`state`]) - the append-only iteration history and
//!   the final result
//! - **Progress Monitoring** ([`progress`]) - callback-based progress events
//! - **Error Handling** ([`error`]) - engine error taxonomy

pub mod config;
pub mod error;
pub(crate) mod objective;
pub mod optimizer;
pub mod progress;
pub mod rules;
pub mod state;

//! Formulas, sequents and the tableau decision procedure

pub use ansi_term;

pub mod config;
#[macro_use]
pub mod macros;
pub mod output;
#[macro_use]
pub mod memory;
pub mod formula;
pub mod sequent;
pub mod tableau;
pub mod input;
pub mod parser;
pub mod claims;

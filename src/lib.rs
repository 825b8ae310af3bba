//! foxi - Theorem prover in the theory of meadows
//!
//! A meadow is a commutative ring with a total inverse where `0⁻¹ = 0`.
//! This library decides equations between meadow expressions:
//! - Parsing expressions into standard meadow forms
//! - Case splitting on free variables being zero or nonzero
//! - Reporting a counterexample when an equation fails

pub mod algebra;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod parser;
pub mod progress;
pub mod prover;
pub mod repl;
pub mod runner;

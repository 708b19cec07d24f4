//! Rules about conditional statements and expressions.

pub mod if_to_ternary;

pub use if_to_ternary::IfToTernary;

//! Lint rules organized by category.

pub mod conditional;

pub use conditional::IfToTernary;

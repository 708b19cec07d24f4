//! Newtypes for working with text sizes and ranges in a Java source file.
//!
//! Offsets are UTF-8 byte offsets stored as `u32`, which matches what the
//! tree-sitter parser reports and keeps ranges small.
//!
//! Modelled on [ruff_text_size](https://github.com/astral-sh/ruff)
//! by Astral Software Inc., licensed under MIT.

mod range;
mod size;
mod traits;

pub use crate::{range::TextRange, size::TextSize, traits::Ranged};

#[cfg(target_pointer_width = "16")]
compile_error!("text-size assumes usize >= u32 and does not work on 16-bit targets");

//! Command implementations for the swup CLI
//!
//! Each command is a thin wrapper: it builds the content source and hands off to the
//! matching operation in [`crate::operations`], then prints the outcome.

pub mod bundle_add;
pub mod bundle_list;
pub mod bundle_remove;
pub mod completions;
pub mod helpers;

//! swup - bundle management core of an OS software updater
//!
//! A bundle is a named set of files shipped by the OS vendor. For the current OS version
//! the Manifest of Manifests (MoM) lists every bundle; each bundle manifest lists its files
//! and the bundles it includes. This crate resolves dependency closures from the MoM,
//! tracks which bundles are installed, and installs or removes bundles safely:
//! new content is staged next to its target and renamed into place only after every file
//! staged, and a bundle is removed only when no other installed bundle needs it.

pub mod cli;
pub mod commands;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod exit_codes;
pub mod hash;
pub mod lock;
pub mod manifest;
pub mod operations;
pub mod progress;
pub mod registry;
pub mod resolver;
pub mod scripts;
pub mod source;
pub mod staging;
pub mod version;

#[cfg(test)]
mod test_fixtures;

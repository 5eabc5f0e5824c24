//! CLI definitions using clap derive API
//!
//! Each command's arguments live in a submodule:
//! - bundle: bundle-list, bundle-add and bundle-remove arguments
//! - completions: completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;

pub mod bundle;
pub mod completions;

pub use bundle::{BundleAddArgs, BundleListArgs, BundleRemoveArgs};
pub use completions::CompletionsArgs;

/// swup - OS bundle manager
///
/// Install and remove software bundles on an image-based OS.
#[derive(Parser, Debug)]
#[command(
    name = "swup",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Manage software bundles on an image-based OS",
    long_about = "swup installs and removes bundles (named sets of files) on an image-based OS. \
                  Each bundle's dependencies are resolved from the release manifest and only \
                  files no other installed bundle ships are ever deleted.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  swup bundle-list                      \x1b[90m# Bundles available at this version\x1b[0m\n   \
                  swup bundle-list --installed          \x1b[90m# Bundles installed on this system\x1b[0m\n   \
                  swup bundle-add editor python         \x1b[90m# Install bundles and their includes\x1b[0m\n   \
                  swup bundle-remove editor             \x1b[90m# Remove a bundle\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Root of the system to manage
    #[arg(long = "path", short = 'p', global = true, value_name = "DIR")]
    pub path_prefix: Option<PathBuf>,

    /// State directory for the lock file and staged content
    #[arg(long = "statedir", short = 'S', global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Local content mirror holding manifests and files
    #[arg(long = "content", short = 'c', global = true, value_name = "DIR")]
    pub content_dir: Option<PathBuf>,

    /// Configuration file (defaults to $SWUP_CONFIG, then /etc/swup/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Directory flags, to be applied over the loaded configuration
    pub fn overrides(&self) -> Overrides {
        Overrides {
            path_prefix: self.path_prefix.clone(),
            state_dir: self.state_dir.clone(),
            content_dir: self.content_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List bundles available at the current version
    #[command(name = "bundle-list")]
    BundleList(BundleListArgs),

    /// Install bundles and everything they include
    #[command(name = "bundle-add")]
    BundleAdd(BundleAddArgs),

    /// Remove a bundle
    #[command(name = "bundle-remove")]
    BundleRemove(BundleRemoveArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

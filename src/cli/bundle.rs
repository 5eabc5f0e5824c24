use clap::Parser;

/// Arguments for the bundle-list command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List bundles available at the current version:\n    swup bundle-list\n\n\
                  List installed bundles:\n    swup bundle-list --installed")]
pub struct BundleListArgs {
    /// List installed bundles instead of available ones
    #[arg(long, short = 'i')]
    pub installed: bool,
}

/// Arguments for the bundle-add command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Install a bundle:\n    swup bundle-add editor\n\n\
                  Install several bundles at once:\n    swup bundle-add editor python\n\n\
                  Install into an alternate root:\n    swup bundle-add editor --path /mnt/target")]
pub struct BundleAddArgs {
    /// Bundles to install
    #[arg(required = true, num_args = 1.., value_name = "BUNDLE")]
    pub bundles: Vec<String>,
}

/// Arguments for the bundle-remove command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Remove a bundle:\n    swup bundle-remove editor")]
pub struct BundleRemoveArgs {
    /// Bundle to remove
    #[arg(value_name = "BUNDLE")]
    pub bundle: String,
}

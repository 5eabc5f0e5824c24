//! bundle-list command
//!
//! Bundle names go to stdout one per line; the summary goes to stderr.

use console::style;

use super::helpers::content_source;
use crate::cli::BundleListArgs;
use crate::config::Config;
use crate::error::Result;
use crate::operations::ListOperation;

/// Run bundle-list command
pub fn run(config: &Config, args: &BundleListArgs) -> Result<()> {
    let source = content_source(config);
    let mut operation = ListOperation::new(config, &source);

    let names = if args.installed {
        operation.installed()?
    } else {
        operation.available()?
    };

    for name in &names {
        println!("{name}");
    }

    let what = if args.installed {
        "installed"
    } else {
        "available"
    };
    eprintln!(
        "{} {} bundle(s) {what}",
        style("::").cyan().bold(),
        names.len()
    );
    Ok(())
}

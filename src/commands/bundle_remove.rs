//! bundle-remove command

use console::style;

use super::helpers::content_source;
use crate::cli::BundleRemoveArgs;
use crate::config::Config;
use crate::error::Result;
use crate::operations::RemoveOperation;

/// Run bundle-remove command
pub fn run(config: &Config, args: &BundleRemoveArgs) -> Result<()> {
    let source = content_source(config);
    let report = RemoveOperation::new(config, &source).execute(&args.bundle)?;

    println!(
        "{} Removed {} ({} path(s) deleted)",
        style("::").cyan().bold(),
        style(&args.bundle).yellow(),
        report.deleted
    );
    if report.kept_dirs > 0 {
        println!(
            "   {} director(ies) kept because they still hold other files",
            report.kept_dirs
        );
    }
    Ok(())
}

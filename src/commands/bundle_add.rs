//! bundle-add command

use console::style;

use super::helpers::content_source;
use crate::cli::BundleAddArgs;
use crate::config::Config;
use crate::error::Result;
use crate::operations::{InstallOperation, InstallOutcome};
use crate::progress::InteractiveProgress;
use crate::scripts::CommandScripts;

/// Run bundle-add command
pub fn run(config: &Config, args: &BundleAddArgs) -> Result<()> {
    let source = content_source(config);
    let scripts = CommandScripts::new(
        config.post_install_scripts.clone(),
        config.path_prefix.clone(),
    );
    let mut progress = InteractiveProgress::new();

    let mut operation = InstallOperation::new(config, &source, &scripts);
    match operation.execute(&args.bundles, &mut progress)? {
        InstallOutcome::AlreadyInstalled => {
            println!("Nothing to install.");
        }
        InstallOutcome::Installed {
            bundles,
            files,
            script_failures,
        } => {
            for bundle in &bundles {
                println!("  {} {}", style("+").green().bold(), style(bundle).yellow());
            }
            println!(
                "{} Installed {} bundle(s), {} file(s)",
                style("::").cyan().bold(),
                bundles.len(),
                files
            );
            if script_failures > 0 {
                eprintln!(
                    "{} {} post-install script(s) failed",
                    style("warning:").yellow().bold(),
                    script_failures
                );
            }
        }
    }
    Ok(())
}

//! Running the package manager and gulp tasks.

use crate::context::{CommandContext, GulpTask, ToolCommand};
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Install the dependencies listed in `package.json`.
pub fn install_dependencies(ctx: &CommandContext) -> Result<()> {
    let command = ctx.package_manager.install_command();
    if ctx.skip_install {
        println!("Skipped install. Run `{command}` to install dependencies.");
        return Ok(());
    }
    println!("Installing dependencies with `{command}`...");
    run(&ctx.root, &command)
}

/// Run a gulp task of the project.
pub fn run_task(ctx: &CommandContext, task: GulpTask) -> Result<()> {
    run(&ctx.root, &ctx.package_manager.gulp_command(task))
}

fn run(root: &Path, command: &ToolCommand) -> Result<()> {
    debug!(%command, root = %root.display(), "running");

    let status = Command::new(program_name(command.program))
        .args(&command.args)
        .current_dir(root)
        .status()
        .with_context(|| format!("Failed to run `{command}`. Is {} installed?", command.program))?;

    if !status.success() {
        bail!("`{command}` failed with {status}");
    }
    Ok(())
}

/// Node tools are batch scripts on Windows.
fn program_name(program: &str) -> String {
    if cfg!(windows) {
        format!("{program}.cmd")
    } else {
        program.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PackageManager;
    use serein_pkg::CatalogConfig;
    use tempfile::TempDir;

    #[test]
    fn test_skip_install_does_not_spawn() {
        let tmp = TempDir::new().unwrap();
        let ctx = CommandContext::new(
            tmp.path().to_path_buf(),
            Some(PackageManager::Npm),
            true,
            CatalogConfig::with_registry("http://localhost"),
        );
        assert!(install_dependencies(&ctx).is_ok());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_program_name() {
        assert_eq!(program_name("npx"), "npx");
    }
}

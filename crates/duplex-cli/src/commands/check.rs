//! Check command implementation.
//!
//! Runs everything up to packaging for both targets: configuration
//! validation, graph resolution and the compile stage's environment
//! check. Nothing is written. This is the fast gate to run before a
//! deploy, mirroring a lint/type-check pass.

use duplex_bundler::compile::compile_module;
use duplex_config::DuplexConfig;
use duplex_graph::GraphWalker;
use duplex_profile::TargetProfile;

use crate::cli::CheckArgs;
use crate::commands::resolve_root;
use crate::error::{CliError, Result};
use crate::ui;

pub async fn execute(args: CheckArgs) -> Result<()> {
    let root = resolve_root(args.root)?;
    let config = DuplexConfig::load(args.config.as_deref(), &root)?;
    config.validate()?;
    config.validate_paths(&root)?;
    ui::info("Configuration OK");

    let profiles = vec![config.browser_profile()?, config.host_profile()?];
    let total = profiles.len();

    let mut failed = 0usize;
    for profile in &profiles {
        match check_profile(profile, &root) {
            Ok(modules) => {
                ui::success(&format!("{}: {modules} modules resolve and compile", profile.kind));
            }
            Err(err) => {
                failed += 1;
                ui::error(&format!("{}: {err}", profile.kind));
            }
        }
    }

    if failed > 0 {
        return Err(CliError::TargetsFailed { failed, total });
    }
    Ok(())
}

fn check_profile(profile: &TargetProfile, root: &std::path::Path) -> Result<usize> {
    let graph = GraphWalker::new(profile, root).walk()?;
    for module in graph.modules() {
        compile_module(module, profile)?;
    }
    Ok(graph.len())
}

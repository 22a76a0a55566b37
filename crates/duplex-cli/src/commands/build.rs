//! Build command implementation.

use std::time::Instant;

use duplex_bundler::build_profile;
use duplex_config::DuplexConfig;
use duplex_profile::{TargetKind, TargetProfile};

use crate::cli::BuildArgs;
use crate::commands::resolve_root;
use crate::error::{CliError, Result};
use crate::ui;

/// Execute the build command.
///
/// # Build Process
///
/// 1. Load and validate configuration
/// 2. Construct the requested target profiles
/// 3. Run each profile's pipeline on its own blocking worker
/// 4. Report per-target outcomes independently
///
/// The two pipelines share no mutable state; a failure in one does not
/// stop the other.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let start_time = Instant::now();

    let root = resolve_root(args.root)?;
    let config = DuplexConfig::load(args.config.as_deref(), &root)?;
    config.validate()?;
    config.validate_paths(&root)?;

    let profiles: Vec<TargetProfile> = match args.target {
        Some(TargetKind::Browser) => vec![config.browser_profile()?],
        Some(TargetKind::HostScript) => vec![config.host_profile()?],
        None => vec![config.browser_profile()?, config.host_profile()?],
    };
    let total = profiles.len();

    let mut handles = Vec::with_capacity(total);
    for profile in profiles {
        let worker_root = root.clone();
        let kind = profile.kind;
        handles.push((
            kind,
            tokio::task::spawn_blocking(move || build_profile(&profile, &worker_root)),
        ));
    }

    let mut failed = 0usize;
    for (kind, handle) in handles {
        match handle.await {
            Ok(Ok(artifact)) => {
                ui::success(&format!(
                    "{kind}: {} ({}, {} modules)",
                    artifact.path.display(),
                    ui::format_bytes(artifact.bytes),
                    artifact.module_count
                ));
            }
            Ok(Err(err)) => {
                failed += 1;
                ui::error(&format!("{kind}: {err}"));
            }
            Err(join_err) => {
                failed += 1;
                ui::error(&format!("{kind}: build worker panicked: {join_err}"));
            }
        }
    }

    if failed > 0 {
        return Err(CliError::TargetsFailed { failed, total });
    }

    ui::success(&format!(
        "Build completed in {}",
        ui::format_duration(start_time.elapsed())
    ));
    Ok(())
}

use anyhow::Result;

use crate::application::{Context, UninstallUseCase};
use crate::provider::PackageManager;
use crate::runtime::Runtime;

/// Uninstall declared packages and drop their declarations
#[tracing::instrument(skip(runtime, manager))]
pub async fn uninstall<R: Runtime, P: PackageManager>(
    runtime: R,
    manager: P,
    ctx: &Context,
    names: &[String],
) -> Result<()> {
    let outcome = UninstallUseCase::new(ctx, &runtime, &manager)
        .execute(names)
        .await?;

    if outcome.is_empty() {
        println!("Nothing to uninstall.");
        return Ok(());
    }

    println!("Uninstalled {}.", outcome.removed.join(", "));
    if ctx.dry_run {
        println!("(dry run, nothing was changed)");
    }
    Ok(())
}

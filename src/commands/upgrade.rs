use anyhow::Result;

use crate::application::{Context, UpgradeUseCase};
use crate::package::UpgradeTarget;
use crate::provider::PackageManager;
use crate::runtime::Runtime;

/// Retarget declared constraints to newer versions
#[tracing::instrument(skip(runtime, manager))]
pub async fn upgrade<R: Runtime, P: PackageManager>(
    runtime: R,
    manager: P,
    ctx: &Context,
    names: &[String],
    target: UpgradeTarget,
) -> Result<()> {
    let outcome = UpgradeUseCase::new(ctx, &runtime, &manager)
        .execute(names, target)
        .await?;

    if outcome.is_empty() {
        println!("Nothing to upgrade.");
        return Ok(());
    }

    for change in &outcome.changes {
        let from = change.from.as_deref().unwrap_or("(none)");
        if change.is_noop() {
            println!("{}: {} (up to date)", change.name, from);
        } else {
            println!("{}: {} -> {}", change.name, from, change.to);
        }
    }
    if ctx.dry_run {
        println!("(dry run, nothing was changed)");
    }
    println!("Run `develarms install` to apply the new versions.");
    Ok(())
}

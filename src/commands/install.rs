use anyhow::Result;

use crate::application::{Context, InstallOptions, InstallUseCase};
use crate::package::Resolution;
use crate::provider::PackageManager;
use crate::runtime::Runtime;

/// Declare `names` (if any) and install every unsatisfied declaration
#[tracing::instrument(skip(runtime, manager))]
pub async fn install<R: Runtime, P: PackageManager>(
    runtime: R,
    manager: P,
    ctx: &Context,
    names: &[String],
    global: bool,
) -> Result<()> {
    let outcome = InstallUseCase::new(ctx, &runtime, &manager)
        .execute(names, InstallOptions { global })
        .await?;

    for (name, constraint) in &outcome.declared {
        println!("Added {}@{} to '{}'.", name, constraint, ctx.config_key);
    }

    match &outcome.resolution {
        Resolution::NoDependencies => println!("No dependencies."),
        Resolution::NothingToInstall => println!("Nothing to install."),
        Resolution::Install(requests) => {
            let list: Vec<String> = requests.iter().map(ToString::to_string).collect();
            println!("Installed {}.", list.join(", "));
            println!("Installation complete.");
        }
    }
    if ctx.dry_run {
        println!("(dry run, nothing was changed)");
    }
    println!("Setup complete.");
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use develarms::application::{Context, DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_KEY};
use develarms::commands;
use develarms::package::UpgradeTarget;
use develarms::provider::{DEFAULT_PROGRAM, Npm};
use develarms::runtime::{DryRun, RealRuntime, Runtime};
use std::path::PathBuf;

/// develarms - Development dependency resolver
///
/// Keeps the packages declared under a key of a JSON file (package.json by
/// default) installed, without touching the file's regular dependencies.
///
/// Examples:
///   develarms                    # Install whatever is declared but missing
///   develarms install rimraf     # Declare rimraf@^latest and install it
///   develarms upgrade -t minor   # Bump declared constraints within their major
#[derive(Parser, Debug)]
#[command(author, version = env!("DEVELARMS_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON file holding the declarations
    #[arg(
        long = "config",
        short = 'c',
        env = "DEVELARMS_CONFIG",
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_FILE,
        global = true
    )]
    pub config: PathBuf,

    /// Top-level key of the declaration section
    #[arg(
        long = "config-key",
        visible_alias = "configKey",
        env = "DEVELARMS_CONFIG_KEY",
        value_name = "KEY",
        default_value = DEFAULT_CONFIG_KEY,
        global = true
    )]
    pub config_key: String,

    /// Report what would change without writing the file or installing anything
    #[arg(long = "dry-run", short = 'n', visible_alias = "dryRun", global = true)]
    pub dry_run: bool,

    /// Print debug logs
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Package manager executable
    #[arg(long, env = "DEVELARMS_NPM", value_name = "PATH", default_value = DEFAULT_PROGRAM, global = true)]
    pub npm: PathBuf,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List declared dependencies and their installed state
    List,

    /// Declare packages (optional) and install missing dependencies
    Install(InstallArgs),

    /// Uninstall packages and remove their declarations
    Uninstall(UninstallArgs),

    /// Bump declared constraints to newer published versions
    Upgrade(UpgradeArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct InstallArgs {
    /// Packages to declare before installing (e.g. "rimraf", "chalk@4")
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Install into the global scope
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UninstallArgs {
    /// Declared packages to uninstall
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpgradeArgs {
    /// Declared packages to upgrade (default: all)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// How far versions may move
    #[arg(long, short = 't', value_enum, default_value_t = UpgradeTarget::Major)]
    pub target: UpgradeTarget,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let ctx = Context::new(cli.config, cli.config_key, cli.dry_run);
    let manager = Npm::new(cli.npm);

    if ctx.dry_run {
        run(DryRun::new(RealRuntime), manager, &ctx, cli.command).await
    } else {
        run(RealRuntime, manager, &ctx, cli.command).await
    }
}

async fn run<R: Runtime>(
    runtime: R,
    manager: Npm,
    ctx: &Context,
    command: Option<Commands>,
) -> Result<()> {
    match command.unwrap_or_else(|| Commands::Install(InstallArgs::default())) {
        Commands::List => commands::list(runtime, manager, ctx).await,
        Commands::Install(args) => {
            commands::install(runtime, manager, ctx, &args.names, args.global).await
        }
        Commands::Uninstall(args) => commands::uninstall(runtime, manager, ctx, &args.names).await,
        Commands::Upgrade(args) => {
            commands::upgrade(runtime, manager, ctx, &args.names, args.target).await
        }
    }
}

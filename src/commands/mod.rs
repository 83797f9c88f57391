//! Command entry points: run a use case and report its outcome on stdout.

mod install;
mod list;
mod uninstall;
mod upgrade;

pub use install::install;
pub use list::list;
pub use uninstall::uninstall;
pub use upgrade::upgrade;

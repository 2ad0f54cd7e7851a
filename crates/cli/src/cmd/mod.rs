mod build;
mod clean;
mod list;
mod watch;

pub use build::cmd_build;
pub use clean::cmd_clean;
pub use list::cmd_list;
pub use watch::cmd_watch;

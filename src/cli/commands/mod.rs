//! CLI command implementations.

mod bank;
mod check;
mod init;
mod matches;
mod run;
mod status;
mod submit;

pub use bank::cmd_bank_stats;
pub use check::cmd_check;
pub use init::cmd_init;
pub use matches::cmd_match;
pub use run::cmd_run;
pub use status::cmd_status;
pub use submit::cmd_submit;

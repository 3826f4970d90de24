//! Local commit collection using git2-rs.

pub mod commits;
pub mod window;

pub use commits::{CollectOptions, collect_commits, open_repository};
pub use window::{day_window, previous_working_day};

//! Local CLI command handlers.

pub mod import;
pub mod info;
pub mod scan;

pub use import::run_import;
pub use info::run_info;
pub use scan::run_scan;

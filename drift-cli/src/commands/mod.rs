mod abstract_schema;
mod check_table;
mod report;
mod scan;
mod status;

// Offline commands
pub use abstract_schema::run_abstract;
pub use check_table::run_check_table;

// Report commands
pub use report::{run_report, run_track};

// Scan commands
pub use scan::run_scan;

// Status commands
pub use status::run_status;

// Handler modules
pub mod parse;
pub mod scan;
pub mod utils;

// Re-export all handler functions
pub use parse::{handle_analyze, handle_parse, handle_validate};
pub use scan::{handle_list_files, handle_scan};
pub use utils::{report, to_json, write_state};

//! Input discovery: explicit list files and recursive folder scans

pub mod scanner;

pub use scanner::{discover, duplicate_outputs, read_list, scan_folder, scan_inputs};

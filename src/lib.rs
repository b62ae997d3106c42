//! Library crate for banner-scan-rs exposing the scan engine and its
//! supporting modules.
pub mod config;
pub mod output;
pub mod scanner;
pub mod targets;
pub mod types;

pub use config::ScanConfig;
pub use scanner::{run_scan, run_scan_with_cancel};
pub use targets::PortRange;
pub use types::{ScanReport, ScanResult, ScanTask};

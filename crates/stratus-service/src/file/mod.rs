//! File content services — preview and download.

pub mod download;
pub mod preview;

pub use download::DownloadService;
pub use preview::PreviewService;

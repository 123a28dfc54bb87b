//! Shared Utilities for the gif-mp4 tools
//!
//! This crate provides the pieces of a batch conversion that are not
//! specific to one encoder:
//! - File discovery and order-independent batch results
//! - Worker-count policy
//! - Progress bar and summary reporting
//! - Logging initialisation
//! - External transcoder process execution
//! - Filter helpers for 4:2:0-safe scaling

pub mod batch;
pub mod errors;
pub mod ffmpeg_process;
pub mod logging;
pub mod progress;
pub mod report;
pub mod thread_manager;
pub mod video;

pub use batch::{collect_files, has_extension, BatchResult};
pub use errors::{BatchError, ConvertError};
pub use ffmpeg_process::{run_to_completion, FfmpegProcess};
pub use progress::{create_hidden_progress_bar, create_progress_bar, format_duration};
pub use report::print_summary_report;
pub use video::build_video_filter_chain;

//! gif-mp4: batch conversion of animated GIFs into H.264 MP4 files.
//!
//! A run goes through four phases, each finishing before the next begins:
//! discovery of `*.gif` files directly inside an input directory, creation
//! of the output directory and one [`ConversionTask`] per source, parallel
//! execution on a fixed-size worker pool, and a final report.
//!
//! ```no_run
//! use gif_mp4::{BatchConfig, BatchCoordinator, EncodingParameters, FfmpegConverter};
//!
//! let config = BatchConfig::new("gifs", "videos", EncodingParameters::default());
//! let report = BatchCoordinator::new(config, FfmpegConverter::new()).run()?;
//! report.print();
//! # Ok::<(), shared_utils::BatchError>(())
//! ```

pub mod converter;
pub mod coordinator;
pub mod task;

pub use converter::{FfmpegConverter, Transcode};
pub use coordinator::{BatchConfig, BatchCoordinator, BatchReport};
pub use task::{ConversionOutcome, ConversionTask, EncodingParameters};

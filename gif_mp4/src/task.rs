//! Conversion task model.

use shared_utils::ConvertError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const DEFAULT_FPS: u32 = 15;
pub const DEFAULT_CRF: u8 = 18;
pub const DEFAULT_MAX_WIDTH: u32 = 960;
pub const DEFAULT_MAX_HEIGHT: u32 = 540;
/// Upper end of the x264 CRF scale (lower is better quality).
pub const MAX_CRF: u8 = 51;

/// Encoder settings shared read-only by every task in a run.
///
/// Ranges are enforced where the values enter the program (CLI parsing);
/// nothing downstream re-validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingParameters {
    pub fps: u32,
    pub crf: u8,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for EncodingParameters {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            crf: DEFAULT_CRF,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

/// `<output_dir>/<stem>.<extension>`. Only the last extension of the
/// source is replaced, so `a.b.gif` becomes `a.b.mp4`.
pub fn destination_for(source: &Path, output_dir: &Path, extension: &str) -> PathBuf {
    let mut name: OsString = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(extension);
    output_dir.join(name)
}

/// One source file to convert. Built before dispatch, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    /// Original file name, used to identify the task in reports.
    pub source_name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub params: EncodingParameters,
}

impl ConversionTask {
    pub fn new(
        source: PathBuf,
        output_dir: &Path,
        output_extension: &str,
        params: EncodingParameters,
    ) -> Self {
        let source_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());
        let destination = destination_for(&source, output_dir, output_extension);
        Self {
            source_name,
            source,
            destination,
            params,
        }
    }
}

/// Result of exactly one task, produced by the worker that ran it.
#[derive(Debug)]
pub struct ConversionOutcome {
    pub source_name: String,
    pub result: Result<(), ConvertError>,
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

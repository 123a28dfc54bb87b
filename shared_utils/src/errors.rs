use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single transcode invocation.
///
/// `Launch` means the tool never ran; `Exit` means it ran and declined.
/// `Wait` means it started but its exit status could not be collected.
/// All are per-task failures and never abort a batch.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("could not launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", describe_exit(.code, .stderr))]
    Exit { code: Option<i32>, stderr: String },

    #[error("lost track of {program} after it started: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

fn describe_exit(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(c) => format!("exited with status {}", c),
        None => "terminated by signal".to_string(),
    };
    match stderr.trim().lines().last() {
        Some(last) if !last.is_empty() => format!("transcoder {}: {}", status, last),
        _ => format!("transcoder {}", status),
    }
}

impl ConvertError {
    /// Captured diagnostic text, verbatim. Empty unless the tool exited.
    pub fn stderr(&self) -> &str {
        match self {
            ConvertError::Exit { stderr, .. } => stderr,
            ConvertError::Launch { .. } | ConvertError::Wait { .. } => "",
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ConvertError::Exit { code, .. } => *code,
            ConvertError::Launch { .. } | ConvertError::Wait { .. } => None,
        }
    }
}

/// Pre-flight failures. Any of these aborts the run before dispatch.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Input folder '{}' does not exist.", .0.display())]
    InputNotFound(PathBuf),

    #[error("Input folder '{}' is not a directory.", .0.display())]
    NotADirectory(PathBuf),

    #[error("No {} files found in '{}'.", .extension.to_uppercase(), .dir.display())]
    NoInputFiles { dir: PathBuf, extension: String },

    #[error("Failed to create output folder '{}': {source}", .dir.display())]
    CreateOutputDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create worker pool: {0}")]
    ThreadPool(String),
}

impl BatchError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;

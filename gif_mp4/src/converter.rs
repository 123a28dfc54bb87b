//! Animated GIF → H.264 MP4 conversion via ffmpeg.
//!
//! One call converts one file. The encoder settings are fixed except for
//! the values carried in [`EncodingParameters`]:
//! - yuv420p pixel format and libx264 for broad player support
//! - `+faststart` layout so the file can start playing before it is fully downloaded
//! - fps filter followed by an aspect-preserving lanczos scale

use crate::task::{ConversionTask, EncodingParameters};
use shared_utils::ffmpeg_process::run_to_completion;
use shared_utils::video::build_video_filter_chain;
use shared_utils::ConvertError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_PROGRAM: &str = "ffmpeg";
pub const VIDEO_CODEC: &str = "libx264";
pub const PIXEL_FORMAT: &str = "yuv420p";
pub const PRESET: &str = "medium";

/// Anything that can execute one conversion task.
///
/// Implemented by [`FfmpegConverter`] and by plain closures, which is how
/// tests inject failures without a real encoder.
pub trait Transcode: Sync {
    fn transcode(&self, task: &ConversionTask) -> Result<(), ConvertError>;
}

impl<F> Transcode for F
where
    F: Fn(&ConversionTask) -> Result<(), ConvertError> + Sync,
{
    fn transcode(&self, task: &ConversionTask) -> Result<(), ConvertError> {
        self(task)
    }
}

#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    program: PathBuf,
}

impl Default for FfmpegConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegConverter {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    pub fn with_program<P: AsRef<Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
        }
    }

    /// Whether the configured program resolves to an executable.
    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    /// Argument list for one conversion, program name excluded.
    pub fn build_args(
        &self,
        source: &Path,
        destination: &Path,
        params: &EncodingParameters,
    ) -> Vec<OsString> {
        let filter = build_video_filter_chain(params.fps, params.max_width, params.max_height);
        vec![
            "-y".into(),
            "-i".into(),
            source.as_os_str().to_os_string(),
            "-movflags".into(),
            "faststart".into(),
            "-pix_fmt".into(),
            PIXEL_FORMAT.into(),
            "-vf".into(),
            filter.into(),
            "-c:v".into(),
            VIDEO_CODEC.into(),
            "-preset".into(),
            PRESET.into(),
            "-crf".into(),
            params.crf.to_string().into(),
            destination.as_os_str().to_os_string(),
        ]
    }

    pub fn build_command(
        &self,
        source: &Path,
        destination: &Path,
        params: &EncodingParameters,
    ) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.build_args(source, destination, params));
        cmd
    }

    /// Convert `source` into `destination`.
    ///
    /// `Ok` iff ffmpeg exited with status zero. A failed run may leave a
    /// partial file at `destination`; it is not cleaned up here.
    pub fn convert(
        &self,
        source: &Path,
        destination: &Path,
        params: &EncodingParameters,
    ) -> Result<(), ConvertError> {
        let mut cmd = self.build_command(source, destination, params);
        run_to_completion(&mut cmd)
    }
}

impl Transcode for FfmpegConverter {
    fn transcode(&self, task: &ConversionTask) -> Result<(), ConvertError> {
        self.convert(&task.source, &task.destination, &task.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_as_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn test_build_args_default_parameters() {
        let converter = FfmpegConverter::new();
        let args = converter.build_args(
            Path::new("in/clip.gif"),
            Path::new("out/clip.mp4"),
            &EncodingParameters::default(),
        );
        assert_eq!(
            args_as_strings(&args),
            vec![
                "-y",
                "-i",
                "in/clip.gif",
                "-movflags",
                "faststart",
                "-pix_fmt",
                "yuv420p",
                "-vf",
                "fps=15,scale='if(gt(iw/960,ih/540),960,-2)':'if(gt(iw/960,ih/540),-2,540)':flags=lanczos",
                "-c:v",
                "libx264",
                "-preset",
                "medium",
                "-crf",
                "18",
                "out/clip.mp4",
            ]
        );
    }

    #[test]
    fn test_build_args_custom_parameters() {
        let params = EncodingParameters {
            fps: 30,
            crf: 28,
            max_width: 481,
            max_height: 271,
        };
        let args = args_as_strings(&FfmpegConverter::new().build_args(
            Path::new("a.gif"),
            Path::new("a.mp4"),
            &params,
        ));
        let vf = &args[args.iter().position(|a| a == "-vf").unwrap() + 1];
        assert!(vf.starts_with("fps=30,"));
        assert!(vf.contains("iw/480,ih/270"));
        let crf = &args[args.iter().position(|a| a == "-crf").unwrap() + 1];
        assert_eq!(crf, "28");
        assert_eq!(args.last().map(String::as_str), Some("a.mp4"));
    }

    #[test]
    fn test_command_uses_configured_program() {
        let converter = FfmpegConverter::with_program("/opt/ffmpeg/bin/ffmpeg");
        let cmd = converter.build_command(
            Path::new("a.gif"),
            Path::new("a.mp4"),
            &EncodingParameters::default(),
        );
        assert_eq!(cmd.get_program(), "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(cmd.get_args().count(), 16);
    }

    #[test]
    fn test_missing_program_is_launch_failure() {
        let converter = FfmpegConverter::with_program("/nonexistent/ffmpeg-for-tests");
        assert!(!converter.is_available());
        let err = converter
            .convert(
                Path::new("a.gif"),
                Path::new("a.mp4"),
                &EncodingParameters::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ConvertError::Launch { .. }));
    }

    #[test]
    fn test_closure_transcoder() {
        let fake = |task: &ConversionTask| {
            if task.source_name.starts_with("bad") {
                Err(ConvertError::Exit {
                    code: Some(1),
                    stderr: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        };
        let good = ConversionTask::new(
            PathBuf::from("good.gif"),
            Path::new("out"),
            "mp4",
            EncodingParameters::default(),
        );
        let bad = ConversionTask::new(
            PathBuf::from("bad.gif"),
            Path::new("out"),
            "mp4",
            EncodingParameters::default(),
        );
        assert!(fake.transcode(&good).is_ok());
        assert_eq!(fake.transcode(&bad).unwrap_err().stderr(), "boom");
    }

    #[cfg(unix)]
    mod fake_ffmpeg {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        fn write_script(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-ffmpeg");
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn test_success_writes_destination() {
            let dir = tempfile::tempdir().unwrap();
            let script = write_script(
                dir.path(),
                r#"for last; do :; done; printf '%s\n' "$@" > "$last""#,
            );
            let source = dir.path().join("clip.gif");
            let destination = dir.path().join("clip.mp4");
            fs::write(&source, b"GIF89a").unwrap();

            FfmpegConverter::with_program(&script)
                .convert(&source, &destination, &EncodingParameters::default())
                .unwrap();

            let recorded = fs::read_to_string(&destination).unwrap();
            let lines: Vec<&str> = recorded.lines().collect();
            assert_eq!(lines[0], "-y");
            assert!(lines.contains(&"faststart"));
            assert!(lines.contains(&"libx264"));
        }

        #[test]
        fn test_failure_surfaces_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let script = write_script(
                dir.path(),
                "echo 'clip.gif: Invalid data found when processing input' >&2; exit 1",
            );
            let err = FfmpegConverter::with_program(&script)
                .convert(
                    &dir.path().join("clip.gif"),
                    &dir.path().join("clip.mp4"),
                    &EncodingParameters::default(),
                )
                .unwrap_err();
            assert_eq!(err.exit_code(), Some(1));
            assert_eq!(
                err.stderr(),
                "clip.gif: Invalid data found when processing input\n"
            );
        }
    }
}

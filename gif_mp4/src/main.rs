use clap::Parser;
use gif_mp4::task::{DEFAULT_CRF, DEFAULT_FPS, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, MAX_CRF};
use gif_mp4::{BatchConfig, BatchCoordinator, EncodingParameters, FfmpegConverter};
use shared_utils::logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{warn, Level};

#[derive(Parser)]
#[command(name = "gif-mp4")]
#[command(version, about = "Batch convert animated GIFs to H.264 MP4 videos", long_about = None)]
struct Cli {
    /// Folder containing the GIF files (not searched recursively)
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Folder the MP4 files are written to (created if missing)
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Output frame rate
    #[arg(
        long,
        default_value_t = DEFAULT_FPS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    fps: u32,

    /// x264 constant rate factor, 0 (lossless) to 51 (worst)
    #[arg(
        long,
        default_value_t = DEFAULT_CRF,
        value_parser = clap::value_parser!(u8).range(0..=MAX_CRF as i64)
    )]
    crf: u8,

    /// Maximum output width; aspect ratio is preserved
    #[arg(
        long = "max_width",
        visible_alias = "max-width",
        default_value_t = DEFAULT_MAX_WIDTH,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_width: u32,

    /// Maximum output height; aspect ratio is preserved
    #[arg(
        long = "max_height",
        visible_alias = "max-height",
        default_value_t = DEFAULT_MAX_HEIGHT,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_height: u32,

    /// ffmpeg executable to invoke
    #[arg(long, value_name = "PATH", env = "GIF_MP4_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Exit with status 2 if any file failed to convert
    #[arg(long)]
    strict: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn params(&self) -> EncodingParameters {
        EncodingParameters {
            fps: self.fps,
            crf: self.crf,
            max_width: self.max_width,
            max_height: self.max_height,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    if let Err(e) = init_logging("gif_mp4", LogConfig::new().with_level(level)) {
        eprintln!("⚠️  Logging disabled: {:#}", e);
    }

    let converter = FfmpegConverter::with_program(&cli.ffmpeg);
    if !converter.is_available() {
        warn!(
            "⚠️  '{}' not found on PATH; every conversion will fail to launch",
            cli.ffmpeg.display()
        );
    }

    let config = BatchConfig::new(&cli.input_dir, &cli.output_dir, cli.params());
    match BatchCoordinator::new(config, converter).run() {
        Ok(report) => {
            report.print();
            ExitCode::from(report.exit_code(cli.strict))
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

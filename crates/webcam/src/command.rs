//! External command lines for capture, recording and device probing.
//!
//! Builders here are pure: they only assemble argv vectors. Spawning is left
//! to [`run_command`], [`run_detached`] and the recording supervisor in the server crate.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output, Stdio};

use crate::types::{CaptureOptions, ImageFormat, RecordingOptions, WebcamError, WebcamResult};

/// Program and arguments of one external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// A tokio command with stdin and stdout detached. Stdout of this process
    /// carries protocol frames, so children must never inherit it.
    pub fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Map a spawn failure to the error taxonomy.
pub fn spawn_error(program: &str, err: std::io::Error) -> WebcamError {
    if err.kind() == std::io::ErrorKind::NotFound {
        WebcamError::DeviceUnavailable(format!("{program} is not installed or not on PATH"))
    } else {
        WebcamError::ExternalProcessFailure {
            program: program.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Map a non-zero exit to the error taxonomy, using stderr to tell a busy or
/// missing device apart from any other failure.
pub fn classify_failure(program: &str, stderr: &str) -> WebcamError {
    let detail = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .unwrap_or("exited with an error")
        .to_string();
    let lower = stderr.to_ascii_lowercase();

    if lower.contains("device or resource busy") || lower.contains("resource busy") {
        WebcamError::DeviceBusy(detail)
    } else if lower.contains("no such file or directory")
        || lower.contains("no such device")
        || lower.contains("permission denied")
        || lower.contains("could not find video device")
    {
        WebcamError::DeviceUnavailable(detail)
    } else {
        WebcamError::ExternalProcessFailure {
            program: program.to_string(),
            reason: detail,
        }
    }
}

/// Run to completion, returning the output of a successful exit.
pub async fn run_command(line: &CommandLine) -> WebcamResult<Output> {
    tracing::debug!(command = %line, "Running external command");
    let output = line
        .to_command()
        .output()
        .await
        .map_err(|e| spawn_error(&line.program, e))?;

    if output.status.success() {
        Ok(output)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(classify_failure(&line.program, &stderr))
    }
}

/// Run with all stdio closed and wait only for the exit status.
///
/// For launchers such as `xdg-open` that may leave a child holding inherited
/// pipes long after they exit.
pub async fn run_detached(line: &CommandLine) -> WebcamResult<ExitStatus> {
    tracing::debug!(command = %line, "Running detached command");
    let status = line
        .to_command()
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| spawn_error(&line.program, e))?;

    if status.success() {
        Ok(status)
    } else {
        Err(WebcamError::ExternalProcessFailure {
            program: line.program.clone(),
            reason: format!("exited with {status}"),
        })
    }
}

/// ffmpeg demuxer used to open a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    V4l2,
    AvFoundation,
    DShow,
}

impl InputFormat {
    pub fn demuxer(self) -> &'static str {
        match self {
            InputFormat::V4l2 => "v4l2",
            InputFormat::AvFoundation => "avfoundation",
            InputFormat::DShow => "dshow",
        }
    }

    /// The `-i` argument addressing a device.
    pub fn input_spec(self, device: &str) -> String {
        match self {
            InputFormat::DShow if !device.starts_with("video=") => format!("video={device}"),
            _ => device.to_string(),
        }
    }
}

/// Map JPEG quality 1–100 onto ffmpeg's `-q:v` scale (31 worst, 2 best).
pub fn jpeg_qscale(quality: u8) -> u32 {
    let quality = u32::from(quality.clamp(1, 100));
    31 - ((quality - 1) * 29 + 49) / 99
}

/// Recording invocation builder.
#[derive(Debug, Clone)]
pub struct RecordingCommand {
    program: String,
    input_format: InputFormat,
    device: String,
    framerate: u32,
    video_size: String,
    codec: String,
    duration_secs: u32,
    output_path: PathBuf,
}

impl RecordingCommand {
    pub fn new(input_format: InputFormat, device: &str, output_path: &Path) -> Self {
        let defaults = RecordingOptions::default();
        Self {
            program: "ffmpeg".to_string(),
            input_format,
            device: device.to_string(),
            framerate: defaults.fps,
            video_size: "1280x720".to_string(),
            codec: defaults.codec,
            duration_secs: defaults.duration_secs,
            output_path: output_path.to_path_buf(),
        }
    }

    pub fn with_options(mut self, options: &RecordingOptions) -> Self {
        self.framerate = options.fps;
        self.codec = options.codec.clone();
        self.duration_secs = options.duration_secs;
        self
    }

    pub fn with_video_size(mut self, width: u32, height: u32) -> Self {
        self.video_size = format!("{width}x{height}");
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn build(&self) -> CommandLine {
        CommandLine::new(&self.program).args([
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-f".to_string(),
            self.input_format.demuxer().to_string(),
            "-framerate".to_string(),
            self.framerate.to_string(),
            "-video_size".to_string(),
            self.video_size.clone(),
            "-i".to_string(),
            self.input_format.input_spec(&self.device),
            "-c:v".to_string(),
            self.codec.clone(),
            "-t".to_string(),
            self.duration_secs.to_string(),
            self.output_path.to_string_lossy().into_owned(),
        ])
    }
}

/// Single-frame capture invocation builder.
#[derive(Debug, Clone)]
pub struct CaptureCommand {
    program: String,
    input_format: InputFormat,
    device: String,
    width: u32,
    height: u32,
    quality: u8,
    format: ImageFormat,
    output_path: PathBuf,
}

impl CaptureCommand {
    pub fn new(input_format: InputFormat, device: &str, output_path: &Path) -> Self {
        let defaults = CaptureOptions::default();
        Self {
            program: "ffmpeg".to_string(),
            input_format,
            device: device.to_string(),
            width: defaults.width,
            height: defaults.height,
            quality: defaults.quality,
            format: defaults.format,
            output_path: output_path.to_path_buf(),
        }
    }

    pub fn with_options(mut self, options: &CaptureOptions) -> Self {
        self.width = options.width;
        self.height = options.height;
        self.quality = options.quality;
        self.format = options.format;
        self
    }

    pub fn build(&self) -> CommandLine {
        let mut line = CommandLine::new(&self.program).args([
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-f".to_string(),
            self.input_format.demuxer().to_string(),
            "-video_size".to_string(),
            format!("{}x{}", self.width, self.height),
            "-i".to_string(),
            self.input_format.input_spec(&self.device),
            "-frames:v".to_string(),
            "1".to_string(),
        ]);
        if self.format == ImageFormat::Jpeg {
            line = line.arg("-q:v").arg(jpeg_qscale(self.quality).to_string());
        }
        line.arg(self.output_path.to_string_lossy().into_owned())
    }
}

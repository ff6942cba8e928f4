//! FFmpeg-backed frame source.
//!
//! Frames are decoded by an `ffmpeg` child process writing raw RGB24 to a
//! pipe. Rewinding kills the process and starts a new one.
//!
//! End of stream is only clean when the decoder exits successfully on a frame
//! boundary. A non-zero exit or a partial frame is an error, so a decoder that
//! dies mid-file never yields a shortened stream.

use image::RgbImage;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

use super::FrameSource;
use crate::error::{MediaError, MediaResult};
use crate::frame::VideoProperties;
use crate::probe::probe_video;

/// Sequential decoder over a video file.
pub struct FfmpegFrameSource {
    path: PathBuf,
    properties: VideoProperties,
    child: Option<Child>,
    reader: Option<BufReader<ChildStdout>>,
    stderr: Option<JoinHandle<String>>,
    finished: bool,
    buffer: Vec<u8>,
}

impl FfmpegFrameSource {
    /// Probe and open a video file.
    ///
    /// Fails with [`MediaError::InvalidVideo`] if the file cannot be probed or
    /// has no decodable video stream.
    pub fn open(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref().to_path_buf();
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let info = probe_video(&path).map_err(|e| match e {
            MediaError::FfprobeFailed { message, .. } => MediaError::invalid_video(message),
            other => other,
        })?;

        let properties = VideoProperties {
            fps: info.fps,
            frame_count: info.frame_count,
            width: info.width,
            height: info.height,
        };
        info!(
            path = %path.display(),
            width = properties.width,
            height = properties.height,
            fps = properties.fps,
            frames = properties.frame_count,
            codec = %info.codec,
            "Opened video"
        );

        let frame_bytes = properties.width as usize * properties.height as usize * 3;
        Ok(Self {
            path,
            properties,
            child: None,
            reader: None,
            stderr: None,
            finished: false,
            buffer: vec![0; frame_bytes],
        })
    }

    fn spawn(&mut self) -> MediaResult<()> {
        let mut child = Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-i"])
            .arg(&self.path)
            .args(["-map", "0:v:0", "-pix_fmt", "rgb24", "-f", "rawvideo", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MediaError::ffmpeg_failed(format!("Failed to spawn FFmpeg: {}", e), None, None))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            MediaError::ffmpeg_failed("Failed to capture FFmpeg stdout", None, None)
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| {
            MediaError::ffmpeg_failed("Failed to capture FFmpeg stderr", None, None)
        })?;
        // Drained on its own thread so a chatty decoder cannot block on a full pipe.
        self.stderr = Some(std::thread::spawn(move || {
            let mut log = String::new();
            if let Err(e) = stderr.read_to_string(&mut log) {
                debug!("Failed to read FFmpeg stderr: {}", e);
            }
            log
        }));

        debug!(path = %self.path.display(), "Started FFmpeg decoder");
        self.reader = Some(BufReader::with_capacity(self.buffer.len().max(8192), stdout));
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        self.reader = None;
        self.stderr = None;
        self.finished = false;
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                debug!("FFmpeg already exited: {}", e);
            }
            if let Err(e) = child.wait() {
                warn!("Failed to reap FFmpeg process: {}", e);
            }
        }
    }

    /// Reap the decoder after its stdout closed.
    fn finish(&mut self) -> MediaResult<()> {
        self.reader = None;
        self.finished = true;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait()?;
        let stderr = self
            .stderr
            .take()
            .map(|handle| handle.join().unwrap_or_default())
            .unwrap_or_default();
        check_exit(status, stderr)?;
        debug!(path = %self.path.display(), "FFmpeg decoder finished");
        Ok(())
    }

    /// Fill the internal buffer with the next frame. Returns `false` at end of stream.
    fn fill_buffer(&mut self) -> MediaResult<bool> {
        if self.finished {
            return Ok(false);
        }
        if self.reader.is_none() {
            self.spawn()?;
        }
        let Some(reader) = self.reader.as_mut() else {
            return Ok(false);
        };

        match read_frame(reader, &mut self.buffer) {
            Ok(true) => Ok(true),
            Ok(false) => {
                self.finish()?;
                Ok(false)
            }
            Err(e) => {
                // A decoder failure explains the short read better than the read itself.
                self.finish()?;
                Err(e)
            }
        }
    }
}

/// Read exactly one frame into `buffer`.
///
/// Returns `false` when the stream ends before the first byte of a frame and
/// an error when it ends inside one.
fn read_frame(reader: &mut impl Read, buffer: &mut [u8]) -> MediaResult<bool> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(MediaError::Io(e)),
        }
    }
    match filled {
        0 => Ok(false),
        n if n == buffer.len() => Ok(true),
        n => Err(MediaError::invalid_video(format!(
            "Decoder stream ended inside a frame ({} of {} bytes)",
            n,
            buffer.len()
        ))),
    }
}

/// Map a decoder exit status to an error unless it succeeded.
fn check_exit(status: ExitStatus, stderr: String) -> MediaResult<()> {
    if status.success() {
        return Ok(());
    }
    let stderr = stderr.trim();
    Err(MediaError::ffmpeg_failed(
        format!("FFmpeg exited with {}", status),
        (!stderr.is_empty()).then(|| stderr.to_string()),
        status.code(),
    ))
}

impl FrameSource for FfmpegFrameSource {
    fn properties(&self) -> VideoProperties {
        self.properties
    }

    fn read_raw(&mut self) -> MediaResult<Option<RgbImage>> {
        if !self.fill_buffer()? {
            return Ok(None);
        }
        let image = RgbImage::from_raw(
            self.properties.width,
            self.properties.height,
            self.buffer.clone(),
        )
        .ok_or_else(|| MediaError::invalid_video("Decoded frame has unexpected size"))?;
        Ok(Some(image))
    }

    fn skip_raw(&mut self) -> MediaResult<bool> {
        self.fill_buffer()
    }

    fn rewind(&mut self) -> MediaResult<()> {
        self.stop();
        Ok(())
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}

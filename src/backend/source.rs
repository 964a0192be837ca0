//! Velocity sources and the transport pump
//!
//! A [`VelocitySource`] yields raw frames until the link ends. [`pump`]
//! decodes them and forwards samples onto the pipeline's command queue.
//! The end of a source is a disconnect, so the pump finishes by sending
//! `Reset`.

use crate::backend::frame::decode_velocity_frame;
use crate::error::{Result, VtiError};
use crate::pipeline::PipelineCommand;
use crossbeam_channel::Sender;
use std::io::BufRead;

/// Anything that delivers sensor frames
#[cfg_attr(test, mockall::automock)]
pub trait VelocitySource {
    /// Next raw frame, or `None` once the link has ended
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>>;
}

/// One frame per line from any buffered reader (stdin, a file, a serial
/// device exposed as a stream)
pub struct LineSource<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(32),
        }
    }
}

impl<R: BufRead> VelocitySource for LineSource<R> {
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            let line = self.buf.trim_ascii();
            if !line.is_empty() {
                return Ok(Some(line.to_vec()));
            }
        }
    }
}

/// Counters for one run of [`pump`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Frames read from the source
    pub frames: u64,
    /// Samples forwarded to the pipeline
    pub forwarded: u64,
    /// Frames that failed to decode
    pub skipped: u64,
}

/// Drain `source` into the pipeline until it ends.
///
/// Undecodable frames are logged and skipped. When the source ends, or
/// fails, a `Reset` is queued behind the last sample. Fails with
/// `Channel` if the worker has gone away.
pub fn pump<S>(source: &mut S, commands: &Sender<PipelineCommand>) -> Result<PumpStats>
where
    S: VelocitySource + ?Sized,
{
    let mut stats = PumpStats::default();

    let outcome = loop {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        };
        stats.frames += 1;

        match decode_velocity_frame(&frame) {
            Ok(velocity) => {
                tracing::trace!("Frame decoded: {} m/s", velocity);
                send(commands, PipelineCommand::Sample(velocity))?;
                stats.forwarded += 1;
            }
            Err(e) => {
                stats.skipped += 1;
                tracing::warn!("Skipping frame {}: {}", stats.frames, e);
            }
        }
    };

    match &outcome {
        Ok(()) => tracing::info!(
            "Source ended after {} frames ({} skipped)",
            stats.frames,
            stats.skipped
        ),
        Err(e) => tracing::warn!("Source failed after {} frames: {}", stats.frames, e),
    }
    send(commands, PipelineCommand::Reset)?;

    outcome.map(|()| stats)
}

fn send(commands: &Sender<PipelineCommand>, cmd: PipelineCommand) -> Result<()> {
    commands
        .send(cmd)
        .map_err(|_| VtiError::Channel("Pipeline worker is not running".to_string()))
}

//! Append-only journal of ledger envelopes.
//!
//! On-disk format: `[u32 LE length][protobuf ProtoEventEnvelope]` repeated.
//! Sequences in a journal run 1, 2, 3, ... with no gaps. Every append is
//! fsynced before it is acknowledged.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use prost::Message;
use tracing::{debug, warn};

use crate::proto_types::ProtoEventEnvelope;

/// Frames larger than this are treated as corruption.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

pub struct EventStore {
    path: PathBuf,
    last_sequence: u64,
}

impl EventStore {
    /// Open or create the journal at `path`, scanning it for the last sequence.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let last_sequence = if path.exists() {
            read_frames(path)?.last().map_or(0, |e| e.sequence)
        } else {
            0
        };
        debug!(path = %path.display(), last_sequence, "journal opened");

        Ok(Self {
            path: path.to_path_buf(),
            last_sequence,
        })
    }

    /// Append one frame. The sequence must be exactly `last_sequence + 1`.
    pub fn append(&mut self, event: &ProtoEventEnvelope) -> io::Result<()> {
        let expected = self.last_sequence + 1;
        if event.sequence != expected {
            return Err(invalid_input(format!(
                "journal sequence: expected {}, got {}",
                expected, event.sequence
            )));
        }

        let body = event.encode_to_vec();
        let len = u32::try_from(body.len())
            .ok()
            .filter(|n| (*n as usize) <= MAX_FRAME_LEN)
            .ok_or_else(|| invalid_input(format!("frame of {} bytes too large", body.len())))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let start = file.metadata()?.len();
        if let Err(e) = write_frame(&mut file, len, &body) {
            // Cut the partial frame so the journal stays readable.
            if let Err(trunc) = file.set_len(start) {
                warn!(path = %self.path.display(), error = %trunc, "could not truncate partial frame");
            }
            return Err(e);
        }

        self.last_sequence = event.sequence;
        Ok(())
    }

    /// Every frame in journal order.
    pub fn load_all(&self) -> io::Result<Vec<ProtoEventEnvelope>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        read_frames(&self.path)
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_frames(path: &Path) -> io::Result<Vec<ProtoEventEnvelope>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut frames = Vec::new();
    let mut len_buf = [0u8; 4];

    loop {
        match reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        }

        let len = u32::from_le_bytes(len_buf) as usize;
        if len == 0 || len > MAX_FRAME_LEN {
            return Err(invalid_data(format!(
                "frame {}: invalid length {}",
                frames.len() + 1,
                len
            )));
        }

        let mut body = vec![0u8; len];
        reader
            .read_exact(&mut body)
            .map_err(|e| invalid_data(format!("frame {}: truncated ({})", frames.len() + 1, e)))?;

        let frame = ProtoEventEnvelope::decode(body.as_slice())
            .map_err(|e| invalid_data(format!("frame {}: {}", frames.len() + 1, e)))?;

        let expected = frames.len() as u64 + 1;
        if frame.sequence != expected {
            return Err(invalid_data(format!(
                "frame {}: sequence {} out of order",
                expected, frame.sequence
            )));
        }
        frames.push(frame);
    }

    Ok(frames)
}

fn write_frame(file: &mut File, len: u32, body: &[u8]) -> io::Result<()> {
    {
        let mut writer = BufWriter::new(&mut *file);
        writer.write_all(&len.to_le_bytes())?;
        writer.write_all(body)?;
        writer.flush()?;
    }
    file.sync_all()
}

fn invalid_input(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

fn invalid_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

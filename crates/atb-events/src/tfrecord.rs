//! TFRecord framing.
//!
//! Each record on disk is laid out as:
//!
//! ```text
//! u64 length (LE) | u32 masked_crc32c(length) | payload | u32 masked_crc32c(payload)
//! ```
//!
//! [`RecordReader`] keeps the byte offset of the last fully consumed record,
//! so repeated calls to [`RecordReader::read_available`] only return records
//! appended since the previous call.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use crate::error::RecordError;

const LENGTH_LEN: usize = 8;
const CRC_LEN: usize = 4;
const HEADER_LEN: usize = LENGTH_LEN + CRC_LEN;
const MASK_DELTA: u32 = 0xa282_ead8;

/// Computes the masked CRC32C used by TFRecord framing.
pub fn masked_crc(data: &[u8]) -> u32 {
    crc32c::crc32c(data).rotate_right(15).wrapping_add(MASK_DELTA)
}

/// Frames `payload` as a single TFRecord.
pub fn encode_record(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + CRC_LEN);
    let len = (payload.len() as u64).to_le_bytes();
    out.extend_from_slice(&len);
    out.extend_from_slice(&masked_crc(&len).to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&masked_crc(payload).to_le_bytes());
    out
}

/// Incremental reader over a single TFRecord file.
#[derive(Debug)]
pub struct RecordReader {
    path: PathBuf,
    offset: u64,
}

impl RecordReader {
    /// Creates a reader positioned at the start of `path`.
    ///
    /// The file is not opened until the first read.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
        }
    }

    /// Byte offset just past the last fully consumed record.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the payloads of all complete records appended since the last
    /// call.
    ///
    /// A partially written trailing record is left unconsumed. A corrupt
    /// record stops the pass: if records were read before it they are
    /// returned and the corruption is reported on the next call, otherwise
    /// the error is returned immediately. The offset never moves past a
    /// corrupt record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] if the file cannot be read,
    /// [`RecordError::Truncated`] if it shrank below the committed offset,
    /// and [`RecordError::Corrupt`] on a checksum mismatch.
    pub fn read_available(&mut self) -> Result<Vec<Vec<u8>>, RecordError> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let len = file.metadata().map_err(|e| self.io_error(e))?.len();
        if len < self.offset {
            return Err(RecordError::Truncated {
                len,
                offset: self.offset,
            });
        }

        let mut reader = BufReader::new(file);
        reader
            .seek(SeekFrom::Start(self.offset))
            .map_err(|e| self.io_error(e))?;

        let mut records = Vec::new();
        loop {
            match read_record(&mut reader, self.offset, len - self.offset) {
                Ok(Some((payload, consumed))) => {
                    self.offset += consumed;
                    records.push(payload);
                }
                Ok(None) => break,
                Err(ReadFailure::Io(e)) => return Err(self.io_error(e)),
                Err(ReadFailure::Corrupt(err)) => {
                    if records.is_empty() {
                        return Err(err);
                    }
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %err,
                        "stopping at corrupt record"
                    );
                    break;
                }
            }
        }

        Ok(records)
    }

    fn io_error(&self, source: io::Error) -> RecordError {
        RecordError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

enum ReadFailure {
    Io(io::Error),
    Corrupt(RecordError),
}

/// Reads one record starting at the reader's position (`offset` in the file),
/// with `remaining` bytes left before the end of the file.
///
/// Returns `Ok(None)` when the remaining bytes do not hold a complete record.
/// The payload buffer is only allocated once the file is known to hold it.
fn read_record<R: Read>(
    reader: &mut R,
    offset: u64,
    remaining: u64,
) -> Result<Option<(Vec<u8>, u64)>, ReadFailure> {
    let mut header = [0u8; HEADER_LEN];
    if read_full(reader, &mut header).map_err(ReadFailure::Io)? < HEADER_LEN {
        return Ok(None);
    }

    let (len_bytes, crc_bytes) = header.split_at(LENGTH_LEN);
    if masked_crc(len_bytes) != le_u32(crc_bytes) {
        return Err(ReadFailure::Corrupt(RecordError::Corrupt {
            offset,
            reason: "length checksum mismatch",
        }));
    }

    let mut len_buf = [0u8; LENGTH_LEN];
    len_buf.copy_from_slice(len_bytes);
    let payload_len = u64::from_le_bytes(len_buf);
    let framed_len = payload_len.saturating_add((HEADER_LEN + CRC_LEN) as u64);
    if framed_len > remaining {
        return Ok(None);
    }
    let Ok(payload_size) = usize::try_from(payload_len) else {
        return Err(ReadFailure::Corrupt(RecordError::Corrupt {
            offset,
            reason: "record length exceeds addressable memory",
        }));
    };

    let mut payload = vec![0u8; payload_size];
    if read_full(reader, &mut payload).map_err(ReadFailure::Io)? < payload_size {
        return Ok(None);
    }

    let mut footer = [0u8; CRC_LEN];
    if read_full(reader, &mut footer).map_err(ReadFailure::Io)? < CRC_LEN {
        return Ok(None);
    }
    if masked_crc(&payload) != le_u32(&footer) {
        return Err(ReadFailure::Corrupt(RecordError::Corrupt {
            offset,
            reason: "payload checksum mismatch",
        }));
    }

    let consumed = (HEADER_LEN + CRC_LEN) as u64 + payload_len;
    Ok(Some((payload, consumed)))
}

/// Like `read_exact`, but reports a short read instead of failing on EOF.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn le_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; CRC_LEN];
    buf.copy_from_slice(&bytes[..CRC_LEN]);
    u32::from_le_bytes(buf)
}

/// Writes TFRecord-framed payloads to any byte sink.
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    inner: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Appends one framed record.
    pub fn write_record(&mut self, payload: &[u8]) -> io::Result<()> {
        self.inner.write_all(&encode_record(payload))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

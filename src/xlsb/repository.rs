//! Skip-and-recapture repository for lossless editing.
//!
//! When a part is opened for update, every record the structural reader
//! skips is copied (descriptor and raw payload) into a spooled temporary
//! store. The reader groups the copies into batches by calling
//! [`RecordRepository::push_current`] at fixed points; the writer later calls
//! [`RecordRepository::write_poll`] at the matching points of its own
//! output, replaying one batch per call in capture order.
//!
//! The repository knows nothing about record semantics: pairing push and
//! poll points is the reader/writer's job. Count mismatches are detected:
//! polling an empty queue fails with [`XlsbError::RepositoryExhausted`] and
//! closing with batches left fails with [`XlsbError::UnreplayedBatches`].

use crate::xlsb::error::{XlsbError, XlsbResult};
use crate::xlsb::processor::RecordProcessor;
use crate::xlsb::records::RecordDescriptor;
use std::collections::VecDeque;
use std::io::{self, Read, Seek, SeekFrom, Write};
use tempfile::SpooledTempFile;

/// How a part is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Skipped records are discarded
    #[default]
    ReadOnly,
    /// Skipped records are captured for write-back
    ForUpdate,
}

/// Configuration for a [`RecordRepository`].
///
/// # Examples
///
/// ```rust
/// use xlsb_stream::xlsb::{OpenMode, RecordRepository, RepositoryOptions};
///
/// let options = RepositoryOptions::new()
///     .with_mode(OpenMode::ForUpdate)
///     .with_spool_threshold(64 * 1024);
/// let repository = RecordRepository::new(&options);
/// assert!(repository.is_capturing());
/// ```
#[derive(Debug, Clone)]
pub struct RepositoryOptions {
    /// Whether skipped records are captured
    pub mode: OpenMode,
    /// Captured bytes kept in memory before the spool moves to a temporary file
    pub spool_threshold: usize,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            mode: OpenMode::ReadOnly,
            spool_threshold: 1024 * 1024,
        }
    }
}

impl RepositoryOptions {
    /// Create options with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the open mode.
    #[inline]
    pub fn with_mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the in-memory spool threshold in bytes.
    #[inline]
    pub fn with_spool_threshold(mut self, bytes: usize) -> Self {
        self.spool_threshold = bytes;
        self
    }
}

/// One captured record: its descriptor and where its payload lives in the spool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordCopy {
    pub descriptor: RecordDescriptor,
    pub len: u32,
    pub offset: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Capturing,
    Replaying,
    Closed,
}

/// Backing state of a capturing repository.
#[derive(Debug)]
pub struct CaptureStore {
    spool: Option<SpooledTempFile>,
    spool_len: u64,
    spool_threshold: usize,
    current: Vec<RecordCopy>,
    batches: VecDeque<Vec<RecordCopy>>,
    phase: Phase,
    replayed: usize,
}

impl CaptureStore {
    fn new(spool_threshold: usize) -> Self {
        CaptureStore {
            spool: None,
            spool_len: 0,
            spool_threshold,
            current: Vec::new(),
            batches: VecDeque::new(),
            phase: Phase::Capturing,
            replayed: 0,
        }
    }

    fn store<R: Read>(&mut self, descriptor: RecordDescriptor, reader: &mut R) -> XlsbResult<()> {
        if self.phase != Phase::Capturing {
            return Err(XlsbError::RepositoryState("store after begin_write"));
        }
        let threshold = self.spool_threshold;
        let spool = self
            .spool
            .get_or_insert_with(|| tempfile::spooled_tempfile(threshold));
        let offset = self.spool_len;
        spool.seek(SeekFrom::Start(offset))?;
        let copied = io::copy(&mut reader.take(descriptor.size as u64), spool)?;
        if copied != descriptor.size as u64 {
            return Err(XlsbError::UnexpectedEndOfStream("skipped record payload"));
        }
        self.spool_len += copied;
        self.current.push(RecordCopy {
            descriptor,
            len: descriptor.size,
            offset,
        });
        log::trace!("captured {} at spool offset {}", descriptor, offset);
        Ok(())
    }

    fn push_current(&mut self) -> XlsbResult<()> {
        if self.phase != Phase::Capturing {
            return Err(XlsbError::RepositoryState("push_current after begin_write"));
        }
        let batch = std::mem::take(&mut self.current);
        log::debug!(
            "pushed batch {} with {} record(s)",
            self.batches.len(),
            batch.len()
        );
        self.batches.push_back(batch);
        Ok(())
    }

    fn begin_write(&mut self) -> XlsbResult<()> {
        match self.phase {
            Phase::Capturing if !self.current.is_empty() => Err(XlsbError::RepositoryState(
                "records captured after the last push_current",
            )),
            Phase::Capturing => {
                self.phase = Phase::Replaying;
                log::debug!("replaying {} captured batch(es)", self.batches.len());
                Ok(())
            },
            Phase::Replaying => Err(XlsbError::RepositoryState("begin_write called twice")),
            Phase::Closed => Err(XlsbError::RepositoryState("begin_write after close")),
        }
    }

    fn write_poll<W: Write>(&mut self, processor: &mut RecordProcessor<W>) -> XlsbResult<()> {
        if self.phase != Phase::Replaying {
            return Err(XlsbError::RepositoryState("write_poll outside the write phase"));
        }
        let batch = self
            .batches
            .pop_front()
            .ok_or(XlsbError::RepositoryExhausted)?;
        for copy in &batch {
            processor.write_descriptor(&copy.descriptor)?;
            if copy.len == 0 {
                continue;
            }
            let spool = self
                .spool
                .as_mut()
                .ok_or(XlsbError::RepositoryState("captured payload without a spool"))?;
            spool.seek(SeekFrom::Start(copy.offset))?;
            processor.copy_from(spool, copy.len as u64)?;
        }
        log::debug!("replayed batch {} ({} record(s))", self.replayed, batch.len());
        self.replayed += 1;
        Ok(())
    }

    fn close(&mut self) -> XlsbResult<()> {
        let was = self.phase;
        self.phase = Phase::Closed;
        self.spool = None;
        self.current.clear();
        let remaining = self.batches.len();
        self.batches.clear();
        if was == Phase::Replaying && remaining != 0 {
            return Err(XlsbError::UnreplayedBatches { remaining });
        }
        Ok(())
    }
}

impl Drop for CaptureStore {
    fn drop(&mut self) {
        if self.phase == Phase::Replaying && !self.batches.is_empty() {
            log::warn!(
                "record repository dropped with {} unreplayed batch(es)",
                self.batches.len()
            );
        }
    }
}

/// Side-store for records skipped by structural readers.
///
/// [`RecordRepository::Passthrough`] is the read-only / fresh-creation
/// variant: skipping just advances the stream and every other operation
/// is a no-op.
#[derive(Debug)]
pub enum RecordRepository {
    /// Discard skipped records
    Passthrough,
    /// Capture skipped records for replay
    Capture(CaptureStore),
}

impl Default for RecordRepository {
    fn default() -> Self {
        RecordRepository::Passthrough
    }
}

impl RecordRepository {
    /// Create a repository for the given options.
    pub fn new(options: &RepositoryOptions) -> Self {
        match options.mode {
            OpenMode::ReadOnly => RecordRepository::Passthrough,
            OpenMode::ForUpdate => {
                RecordRepository::Capture(CaptureStore::new(options.spool_threshold))
            },
        }
    }

    /// Create a repository for the given mode with default options.
    pub fn with_mode(mode: OpenMode) -> Self {
        Self::new(&RepositoryOptions::new().with_mode(mode))
    }

    /// A no-op repository.
    #[inline]
    pub fn passthrough() -> Self {
        RecordRepository::Passthrough
    }

    /// Whether skipped records are being captured.
    #[inline]
    pub fn is_capturing(&self) -> bool {
        matches!(self, RecordRepository::Capture(_))
    }

    /// Number of pushed batches not yet replayed.
    pub fn pending_batches(&self) -> usize {
        match self {
            RecordRepository::Passthrough => 0,
            RecordRepository::Capture(store) => store.batches.len(),
        }
    }

    /// Copy the payload of `descriptor` from `reader` into the current batch.
    ///
    /// The passthrough variant reads and discards the payload.
    pub fn store<R: Read>(&mut self, descriptor: RecordDescriptor, reader: &mut R) -> XlsbResult<()> {
        match self {
            RecordRepository::Passthrough => {
                let skipped = io::copy(&mut reader.take(descriptor.size as u64), &mut io::sink())?;
                if skipped != descriptor.size as u64 {
                    return Err(XlsbError::UnexpectedEndOfStream("skipped record payload"));
                }
                Ok(())
            },
            RecordRepository::Capture(store) => store.store(descriptor, reader),
        }
    }

    /// Close the current batch and queue it for replay.
    pub fn push_current(&mut self) -> XlsbResult<()> {
        match self {
            RecordRepository::Passthrough => Ok(()),
            RecordRepository::Capture(store) => store.push_current(),
        }
    }

    /// Switch from capturing to replaying.
    pub fn begin_write(&mut self) -> XlsbResult<()> {
        match self {
            RecordRepository::Passthrough => Ok(()),
            RecordRepository::Capture(store) => store.begin_write(),
        }
    }

    /// Replay the oldest captured batch into `processor`.
    pub fn write_poll<W: Write>(&mut self, processor: &mut RecordProcessor<W>) -> XlsbResult<()> {
        match self {
            RecordRepository::Passthrough => Ok(()),
            RecordRepository::Capture(store) => store.write_poll(processor),
        }
    }

    /// Release the backing spool.
    ///
    /// Fails if writing began and some batches were never replayed.
    pub fn close(&mut self) -> XlsbResult<()> {
        match self {
            RecordRepository::Passthrough => Ok(()),
            RecordRepository::Capture(store) => store.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsb::record_types::{BinaryRecordType, RecordType};
    use std::io::Cursor;

    fn capture(repo: &mut RecordRepository, t: BinaryRecordType, payload: &[u8]) {
        let descriptor = RecordDescriptor::new(t, payload.len() as u32);
        repo.store(descriptor, &mut Cursor::new(payload)).unwrap();
    }

    fn replay_one(repo: &mut RecordRepository) -> Vec<u8> {
        let mut processor = RecordProcessor::new(Vec::new());
        repo.write_poll(&mut processor).unwrap();
        processor.into_inner()
    }

    #[test]
    fn test_batches_replay_in_capture_order() {
        let mut repo = RecordRepository::with_mode(OpenMode::ForUpdate);
        capture(&mut repo, BinaryRecordType::WsProp, &[1, 2, 3]);
        repo.push_current().unwrap();
        capture(&mut repo, BinaryRecordType::WsFmtInfo, &[4; 12]);
        capture(&mut repo, BinaryRecordType::CellMeta, &[]);
        repo.push_current().unwrap();
        repo.push_current().unwrap();
        assert_eq!(repo.pending_batches(), 3);

        repo.begin_write().unwrap();
        assert_eq!(replay_one(&mut repo), vec![0x93, 0x01, 0x03, 1, 2, 3]);

        let mut expected = vec![0xE5, 0x03, 0x0C];
        expected.extend_from_slice(&[4; 12]);
        expected.extend_from_slice(&[0x31, 0x00]);
        assert_eq!(replay_one(&mut repo), expected);

        assert!(replay_one(&mut repo).is_empty());
        repo.close().unwrap();
    }

    #[test]
    fn test_extra_poll_is_detected() {
        let mut repo = RecordRepository::with_mode(OpenMode::ForUpdate);
        repo.push_current().unwrap();
        repo.begin_write().unwrap();
        let mut processor = RecordProcessor::new(Vec::new());
        repo.write_poll(&mut processor).unwrap();
        assert!(matches!(
            repo.write_poll(&mut processor),
            Err(XlsbError::RepositoryExhausted)
        ));
    }

    #[test]
    fn test_missing_poll_is_detected_at_close() {
        let mut repo = RecordRepository::with_mode(OpenMode::ForUpdate);
        capture(&mut repo, BinaryRecordType::WsProp, &[0; 4]);
        repo.push_current().unwrap();
        repo.push_current().unwrap();
        repo.begin_write().unwrap();
        replay_one(&mut repo);
        assert!(matches!(
            repo.close(),
            Err(XlsbError::UnreplayedBatches { remaining: 1 })
        ));
    }

    #[test]
    fn test_unpushed_records_block_write() {
        let mut repo = RecordRepository::with_mode(OpenMode::ForUpdate);
        capture(&mut repo, BinaryRecordType::WsProp, &[0; 4]);
        assert!(matches!(repo.begin_write(), Err(XlsbError::RepositoryState(_))));
    }

    #[test]
    fn test_poll_before_begin_write_rejected() {
        let mut repo = RecordRepository::with_mode(OpenMode::ForUpdate);
        repo.push_current().unwrap();
        let mut processor = RecordProcessor::new(Vec::new());
        assert!(matches!(
            repo.write_poll(&mut processor),
            Err(XlsbError::RepositoryState(_))
        ));
    }

    #[test]
    fn test_truncated_payload_is_end_of_stream() {
        let mut repo = RecordRepository::with_mode(OpenMode::ForUpdate);
        let descriptor = RecordDescriptor::new(BinaryRecordType::WsProp, 10);
        assert!(matches!(
            repo.store(descriptor, &mut Cursor::new(vec![0u8; 3])),
            Err(XlsbError::UnexpectedEndOfStream(_))
        ));
    }

    #[test]
    fn test_spool_rolls_over_to_file() {
        let mut repo = RecordRepository::new(
            &RepositoryOptions::new()
                .with_mode(OpenMode::ForUpdate)
                .with_spool_threshold(8),
        );
        let payload: Vec<u8> = (0..200u8).collect();
        capture(&mut repo, BinaryRecordType::WsProp, &payload);
        capture(&mut repo, BinaryRecordType::WsProp, &payload[..50]);
        repo.push_current().unwrap();
        repo.begin_write().unwrap();
        let out = replay_one(&mut repo);
        let mut expected = vec![0x93, 0x01, 0xC8, 0x01];
        expected.extend_from_slice(&payload);
        expected.extend_from_slice(&[0x93, 0x01, 0x32]);
        expected.extend_from_slice(&payload[..50]);
        assert_eq!(out, expected);
        repo.close().unwrap();
    }

    #[test]
    fn test_extended_namespace_descriptor_replays_raw_code() {
        let mut repo = RecordRepository::with_mode(OpenMode::ForUpdate);
        let descriptor = RecordDescriptor::new(RecordType::FutureRecord(3000), 1);
        repo.store(descriptor, &mut Cursor::new(vec![0xAA])).unwrap();
        repo.push_current().unwrap();
        repo.begin_write().unwrap();
        assert_eq!(replay_one(&mut repo), vec![0xB8, 0x17, 0x01, 0xAA]);
    }

    #[test]
    fn test_passthrough_is_noop() {
        let mut repo = RecordRepository::passthrough();
        let mut cursor = Cursor::new(vec![1u8, 2, 3, 4]);
        repo.store(RecordDescriptor::new(BinaryRecordType::WsProp, 3), &mut cursor)
            .unwrap();
        assert_eq!(cursor.position(), 3);
        repo.push_current().unwrap();
        repo.begin_write().unwrap();
        assert!(replay_one(&mut repo).is_empty());
        assert_eq!(repo.pending_batches(), 0);
        repo.close().unwrap();
    }
}

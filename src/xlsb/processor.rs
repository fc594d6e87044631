//! Stream processor: the single entry point every record reader and writer
//! goes through.
//!
//! [`RecordProcessor`] owns its byte stream from construction. Reading
//! methods are available when the stream implements [`Read`], writing
//! methods when it implements [`Write`]; `seek_relative` additionally needs
//! [`Seek`]. The processor counts every byte it moves, which is what lets
//! [`RecordProcessor::read_record`] verify that a structure consumed exactly
//! the payload its descriptor declared.

use crate::common::binary::{decode_utf16le, encode_utf16le, utf16_len};
use crate::xlsb::context::ContextStack;
use crate::xlsb::error::{XlsbError, XlsbResult};
use crate::xlsb::record_types::{BinaryRecordType, RecordType};
use crate::xlsb::records::{BinaryRecord, RecordDescriptor, decode_size, decode_type_code};
use crate::xlsb::repository::RecordRepository;
use bytes::Bytes;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use zerocopy::IntoBytes;
use zerocopy::byteorder::{F64, I16, I32, LittleEndian, U16, U32, U64};

/// Count value marking an absent nullable string.
pub const NULL_STRING_MARKER: u32 = 0xFFFF_FFFF;

/// Largest style index the 24-bit cell header field can hold.
pub const MAX_U24: u32 = 0x00FF_FFFF;

// Upper bound on the up-front allocation for a single read.
const READ_CHUNK: usize = 64 * 1024;

/// Encoded size of a required string: count prefix plus UTF-16 code units.
#[inline]
pub fn wide_string_len(s: &str) -> u32 {
    4 + 2 * utf16_len(s) as u32
}

/// Encoded size of a nullable string.
#[inline]
pub fn nullable_wide_string_len(s: Option<&str>) -> u32 {
    s.map_or(4, wide_string_len)
}

/// Reader/writer over one XLSB part stream.
#[derive(Debug)]
pub struct RecordProcessor<S> {
    stream: S,
    context: ContextStack,
    position: u64,
}

impl<S> RecordProcessor<S> {
    /// Wrap a stream. The context stack starts empty.
    pub fn new(stream: S) -> Self {
        RecordProcessor {
            stream,
            context: ContextStack::new(),
            position: 0,
        }
    }

    /// Borrow the underlying stream.
    #[inline]
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Mutably borrow the underlying stream.
    ///
    /// Bytes moved through this reference are not counted by [`position`](Self::position).
    #[inline]
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Consume the processor and return the stream.
    #[inline]
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Current FRT/AC nesting.
    #[inline]
    pub fn context(&self) -> &ContextStack {
        &self.context
    }

    /// Bytes read or written through this processor so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<S: Read> RecordProcessor<S> {
    fn fill(&mut self, buf: &mut [u8], what: &'static str) -> XlsbResult<()> {
        self.stream
            .read_exact(buf)
            .map_err(|e| XlsbError::from_read(e, what))?;
        self.position += buf.len() as u64;
        Ok(())
    }

    fn read_array<const N: usize>(&mut self, what: &'static str) -> XlsbResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill(&mut buf, what)?;
        Ok(buf)
    }

    /// Read one byte without allocating. End of stream is an error.
    #[inline]
    pub fn read_byte(&mut self) -> XlsbResult<u8> {
        Ok(self.read_array::<1>("byte")?[0])
    }

    /// Read one byte, or `None` on a clean end of stream.
    fn try_read_byte(&mut self) -> XlsbResult<Option<u8>> {
        let mut b = [0u8; 1];
        loop {
            match self.stream.read(&mut b) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.position += 1;
                    return Ok(Some(b[0]));
                },
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read exactly `n` bytes. `read_bytes(0)` does not touch the stream.
    pub fn read_bytes(&mut self, n: usize) -> XlsbResult<Vec<u8>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let mut buf = Vec::with_capacity(n.min(READ_CHUNK));
        let read = (&mut self.stream).take(n as u64).read_to_end(&mut buf)?;
        self.position += read as u64;
        if read != n {
            return Err(XlsbError::UnexpectedEndOfStream("byte run"));
        }
        Ok(buf)
    }

    #[inline]
    pub fn read_u8(&mut self) -> XlsbResult<u8> {
        self.read_byte()
    }

    #[inline]
    pub fn read_u16(&mut self) -> XlsbResult<u16> {
        Ok(U16::<LittleEndian>::from_bytes(self.read_array("u16")?).get())
    }

    #[inline]
    pub fn read_i16(&mut self) -> XlsbResult<i16> {
        Ok(I16::<LittleEndian>::from_bytes(self.read_array("i16")?).get())
    }

    #[inline]
    pub fn read_u32(&mut self) -> XlsbResult<u32> {
        Ok(U32::<LittleEndian>::from_bytes(self.read_array("u32")?).get())
    }

    #[inline]
    pub fn read_i32(&mut self) -> XlsbResult<i32> {
        Ok(I32::<LittleEndian>::from_bytes(self.read_array("i32")?).get())
    }

    #[inline]
    pub fn read_u64(&mut self) -> XlsbResult<u64> {
        Ok(U64::<LittleEndian>::from_bytes(self.read_array("u64")?).get())
    }

    #[inline]
    pub fn read_f64(&mut self) -> XlsbResult<f64> {
        Ok(F64::<LittleEndian>::from_bytes(self.read_array("f64")?).get())
    }

    /// Read the 24-bit little-endian value used for cell style indices.
    pub fn read_u24(&mut self) -> XlsbResult<u32> {
        let [a, b, c] = self.read_array::<3>("u24")?;
        Ok(u32::from_le_bytes([a, b, c, 0]))
    }

    /// Read a string that must be present.
    ///
    /// `field` names the string in the [`XlsbError::NullString`] raised when
    /// the null marker is found.
    pub fn read_string(&mut self, field: &'static str) -> XlsbResult<String> {
        self.read_nullable_string()?
            .ok_or(XlsbError::NullString(field))
    }

    /// Read a string that may be absent (count `0xFFFFFFFF`).
    pub fn read_nullable_string(&mut self) -> XlsbResult<Option<String>> {
        let count = self.read_u32()?;
        if count == NULL_STRING_MARKER {
            return Ok(None);
        }
        let bytes = self.read_bytes(count as usize * 2)?;
        Ok(Some(decode_utf16le(&bytes)?))
    }

    /// Read the next record header, resolving its type against the
    /// context stack and applying the stack transition.
    pub fn read_descriptor(&mut self) -> XlsbResult<RecordDescriptor> {
        self.next_descriptor()?
            .ok_or(XlsbError::UnexpectedEndOfStream("record descriptor"))
    }

    /// Like [`read_descriptor`](Self::read_descriptor), but a clean end of
    /// stream before the first header byte yields `None`.
    pub fn next_descriptor(&mut self) -> XlsbResult<Option<RecordDescriptor>> {
        let Some(first) = self.try_read_byte()? else {
            return Ok(None);
        };
        let start = self.position;
        let mut counter = CountingReader::new(&mut self.stream);
        let code = decode_type_code(first, &mut counter)?;
        let size = decode_size(&mut counter)?;
        self.position = start + counter.count;

        let record_type = self.context.resolve(code)?;
        let descriptor = RecordDescriptor { record_type, size };
        log::trace!("read {} at {}", descriptor, start - 1);
        Ok(Some(descriptor))
    }

    /// Read a header and fail unless it is `t`.
    pub fn expect_descriptor(&mut self, t: BinaryRecordType) -> XlsbResult<RecordDescriptor> {
        let descriptor = self.read_descriptor()?;
        descriptor.expect(t)?;
        Ok(descriptor)
    }

    /// Read the raw payload that follows `descriptor`.
    pub fn read_payload(&mut self, descriptor: &RecordDescriptor) -> XlsbResult<Bytes> {
        Ok(Bytes::from(self.read_bytes(descriptor.size as usize)?))
    }

    /// Read the payload of `descriptor` as `T`, checking that exactly
    /// `descriptor.size` bytes were consumed.
    pub fn read_record<T: BinaryRecord>(&mut self, descriptor: &RecordDescriptor) -> XlsbResult<T> {
        let start = self.position;
        let value = T::read_payload(self, descriptor)?;
        let consumed = self.position - start;
        if consumed != descriptor.size as u64 {
            return Err(XlsbError::UnexpectedRecordSize {
                record: descriptor.record_type,
                expected: descriptor.size as u64,
                found: consumed,
            });
        }
        Ok(value)
    }

    /// Iterate over the remaining records as raw `(descriptor, payload)` pairs.
    pub fn records(&mut self) -> Records<'_, S> {
        Records {
            processor: self,
            done: false,
        }
    }

    /// Skip the payload of `descriptor`, handing it to `repository`.
    pub fn skip(
        &mut self,
        descriptor: &RecordDescriptor,
        repository: &mut RecordRepository,
    ) -> XlsbResult<()> {
        let mut counter = CountingReader::new(&mut self.stream);
        let stored = repository.store(*descriptor, &mut counter);
        self.position += counter.count;
        stored?;
        log::trace!("skipped {}", descriptor);
        Ok(())
    }

    /// Skip records until one of `targets` is read and return its header.
    pub fn skip_until(
        &mut self,
        targets: &[BinaryRecordType],
        repository: &mut RecordRepository,
    ) -> XlsbResult<RecordDescriptor> {
        loop {
            let descriptor = self.read_descriptor()?;
            if descriptor.is_any(targets) {
                return Ok(descriptor);
            }
            self.skip(&descriptor, repository)?;
        }
    }

    /// Like [`skip_until`](Self::skip_until), starting from an already read
    /// header: `current` is returned as is when it is a target, otherwise
    /// it is skipped first.
    pub fn skip_to(
        &mut self,
        current: RecordDescriptor,
        targets: &[BinaryRecordType],
        repository: &mut RecordRepository,
    ) -> XlsbResult<RecordDescriptor> {
        if current.is_any(targets) {
            return Ok(current);
        }
        self.skip(&current, repository)?;
        self.skip_until(targets, repository)
    }

    /// Skip consecutive records whose type is in `types`, starting with
    /// `current`, and return the first header that is not.
    pub fn skip_while(
        &mut self,
        current: RecordDescriptor,
        types: &[BinaryRecordType],
        repository: &mut RecordRepository,
    ) -> XlsbResult<RecordDescriptor> {
        let mut descriptor = current;
        while descriptor.is_any(types) {
            self.skip(&descriptor, repository)?;
            descriptor = self.read_descriptor()?;
        }
        Ok(descriptor)
    }

    /// Skip an alternate-content block whose `BrtACBegin` header was just
    /// read, up to and including its matching `BrtACEnd`.
    pub fn skip_ac_block(
        &mut self,
        begin: &RecordDescriptor,
        repository: &mut RecordRepository,
    ) -> XlsbResult<()> {
        begin.expect(BinaryRecordType::ACBegin)?;
        let outer = self.context.depth().saturating_sub(1);
        self.skip(begin, repository)?;
        loop {
            let descriptor = self.read_descriptor()?;
            self.skip(&descriptor, repository)?;
            if self.context.depth() == outer {
                return Ok(());
            }
        }
    }
}

impl<S: Read + Seek> RecordProcessor<S> {
    /// Move the cursor by `offset` bytes without reading.
    pub fn seek_relative(&mut self, offset: i64) -> XlsbResult<()> {
        let target = self.position.checked_add_signed(offset).ok_or(XlsbError::ValueOutOfRange {
            field: "seek offset",
            value: offset,
            constraint: "cannot seek before the start of the part",
        })?;
        self.stream.seek(SeekFrom::Current(offset))?;
        self.position = target;
        Ok(())
    }
}

impl<S: Write> RecordProcessor<S> {
    #[inline]
    pub fn write_byte(&mut self, value: u8) -> XlsbResult<()> {
        self.write_bytes(&[value])
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> XlsbResult<()> {
        self.stream.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) -> XlsbResult<()> {
        self.write_byte(value)
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) -> XlsbResult<()> {
        self.write_bytes(U16::<LittleEndian>::new(value).as_bytes())
    }

    #[inline]
    pub fn write_i16(&mut self, value: i16) -> XlsbResult<()> {
        self.write_bytes(I16::<LittleEndian>::new(value).as_bytes())
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) -> XlsbResult<()> {
        self.write_bytes(U32::<LittleEndian>::new(value).as_bytes())
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) -> XlsbResult<()> {
        self.write_bytes(I32::<LittleEndian>::new(value).as_bytes())
    }

    #[inline]
    pub fn write_u64(&mut self, value: u64) -> XlsbResult<()> {
        self.write_bytes(U64::<LittleEndian>::new(value).as_bytes())
    }

    #[inline]
    pub fn write_f64(&mut self, value: f64) -> XlsbResult<()> {
        self.write_bytes(F64::<LittleEndian>::new(value).as_bytes())
    }

    /// Write a 24-bit little-endian value.
    pub fn write_u24(&mut self, value: u32) -> XlsbResult<()> {
        if value > MAX_U24 {
            return Err(XlsbError::ValueOutOfRange {
                field: "u24",
                value: value as i64,
                constraint: "must fit in 24 bits",
            });
        }
        let bytes = value.to_le_bytes();
        self.write_bytes(&bytes[..3])
    }

    /// Write a string with its UTF-16 code unit count.
    pub fn write_string(&mut self, value: &str) -> XlsbResult<()> {
        let units = utf16_len(value);
        if units >= NULL_STRING_MARKER as usize {
            return Err(XlsbError::ValueOutOfRange {
                field: "string length",
                value: units as i64,
                constraint: "0xFFFFFFFF is reserved for the null marker",
            });
        }
        self.write_u32(units as u32)?;
        self.write_bytes(&encode_utf16le(value))
    }

    /// Write a string that may be absent.
    pub fn write_nullable_string(&mut self, value: Option<&str>) -> XlsbResult<()> {
        match value {
            Some(s) => self.write_string(s),
            None => self.write_u32(NULL_STRING_MARKER),
        }
    }

    /// Write an optional value into a field that must be present.
    pub fn write_required_string(&mut self, field: &'static str, value: Option<&str>) -> XlsbResult<()> {
        self.write_string(value.ok_or(XlsbError::NullString(field))?)
    }

    /// Write a record header.
    pub fn write_descriptor(&mut self, descriptor: &RecordDescriptor) -> XlsbResult<()> {
        log::trace!("write {} at {}", descriptor, self.position);
        let header = descriptor.encode()?;
        self.write_bytes(&header)
    }

    /// Write a complete record from a raw payload.
    pub fn write_record<T: Into<RecordType>>(&mut self, record_type: T, payload: &[u8]) -> XlsbResult<()> {
        let size = u32::try_from(payload.len()).map_err(|_| XlsbError::ValueOutOfRange {
            field: "record size",
            value: i64::try_from(payload.len()).unwrap_or(i64::MAX),
            constraint: "record payloads must be <= 0x0FFFFFFF bytes",
        })?;
        self.write_descriptor(&RecordDescriptor::new(record_type, size))?;
        self.write_bytes(payload)
    }

    /// Write a payload-less record.
    #[inline]
    pub fn write_empty(&mut self, record_type: BinaryRecordType) -> XlsbResult<()> {
        self.write_descriptor(&RecordDescriptor::empty(record_type))
    }

    /// Copy exactly `len` bytes from `reader` into the stream.
    pub(crate) fn copy_from<R: Read>(&mut self, reader: &mut R, len: u64) -> XlsbResult<()> {
        let copied = io::copy(&mut reader.take(len), &mut self.stream)?;
        self.position += copied;
        if copied != len {
            return Err(XlsbError::UnexpectedEndOfStream("captured record payload"));
        }
        Ok(())
    }

    pub fn flush(&mut self) -> XlsbResult<()> {
        self.stream.flush()?;
        Ok(())
    }
}

/// Iterator returned by [`RecordProcessor::records`].
///
/// Ends on a clean end of stream; the first error is yielded and then
/// iteration stops.
pub struct Records<'a, S> {
    processor: &'a mut RecordProcessor<S>,
    done: bool,
}

impl<S: Read> Iterator for Records<'_, S> {
    type Item = XlsbResult<(RecordDescriptor, Bytes)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.processor.next_descriptor() {
            Ok(None) => {
                self.done = true;
                return None;
            },
            Ok(Some(d)) => self.processor.read_payload(&d).map(|payload| (d, payload)),
            Err(e) => Err(e),
        };
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R> CountingReader<R> {
    fn new(inner: R) -> Self {
        CountingReader { inner, count: 0 }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

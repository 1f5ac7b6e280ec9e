//! Efficient TBFSBS reading and writing
//!
//! # Example
//!
//! This example reads some content, writes it back with the sequences
//! wrapped to lines of four characters and compares the output (should be
//! the same):
//!
//! ```
//! use tbf_io::tbfsbs::{Reader, Record};
//!
//! let input = b"% id1 1 one
//! ACGT
//! ACGT
//! % id2 2 two
//! TGCA
//! TGCA
//! ";
//!
//! let mut reader = Reader::new(&input[..]);
//! let mut output = vec![];
//!
//! while let Some(record) = reader.next() {
//!     let record = record.expect("Error reading record");
//!     record.write_wrap(&mut output, 4).unwrap();
//! }
//!
//! assert_eq!(input, output.as_slice());
//! ```
//!
//! # Details on parsing behaviour
//!
//! * The parser handles UNIX (LF) and Windows (CRLF) line endings, but not
//!   old Mac-style (CR) endings.  Writing always uses UNIX line endings.
//! * Empty lines are allowed anywhere in the file, they will just be
//!   ignored. The first non-empty line must start with `%`, indicating the
//!   first header.
//! * The `%` of a header may be followed by one separator space which is
//!   not part of the header content. A header whose identifier is missing
//!   (nothing after `%`, or further whitespace where the identifier should
//!   start) is a [`MalformedHeader`](enum.Error.html) error.
//! * The second header token is a target value only if it is the literal
//!   `null` or parses as an integer or float; any other token belongs to
//!   the description and the target value is null.
//! * Sequence lines are stripped of surrounding whitespace and concatenated
//!   without separator, so the sequence length does not depend on the line
//!   layout of the input.
//! * If two consecutive header lines are encountered without intermediate
//!   sequence line, the first record will have an empty sequence. The same
//!   is true if the input ends with a header line.
//! * Empty input will result in `None` being returned immediately by
//!   `Reader::next()` and in empty iterators for `RecordsIter` /
//!   `RecordsIntoIter`.
//! * After an error has been returned, `Reader::next()` returns `None`.

use std::borrow::Cow;
use std::error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead};
use std::iter;
use std::path::Path;
use std::slice;
use std::str::{self, Utf8Error};

use memchr::Memchr;

use crate::policy::{BufPolicy, StdPolicy};
use crate::{fill_buf, trim_cr, trim_end_ws, trim_ws};

type DefaultPolicy = StdPolicy;

const BUFSIZE: usize = 64 * 1024;

/// Parser for TBFSBS files.
pub struct Reader<R: io::Read, P = DefaultPolicy> {
    buffer: buffer_redux::BufReader<R>,
    buf_pos: BufferPosition,
    position: Position,
    search_pos: usize,
    finished: bool,
    buf_policy: P,
}

impl<R> Reader<R, DefaultPolicy>
where
    R: io::Read,
{
    /// Creates a new reader with the default buffer size of 64 KiB
    ///
    /// # Example:
    ///
    /// ```
    /// use tbf_io::tbfsbs::{Reader, Record};
    /// let tbf = b"%id 1 a\nSEQUENCE";
    ///
    /// let mut reader = Reader::new(&tbf[..]);
    /// let record = reader.next().unwrap().unwrap();
    /// assert_eq!(record.id(), Ok("id"))
    /// ```
    #[inline]
    pub fn new(reader: R) -> Reader<R, StdPolicy> {
        Reader::with_capacity(reader, BUFSIZE)
    }

    /// Creates a new reader with a given buffer capacity. The minimum allowed
    /// capacity is 3.
    #[inline]
    pub fn with_capacity(reader: R, capacity: usize) -> Reader<R, DefaultPolicy> {
        assert!(capacity >= 3);
        Reader {
            buffer: buffer_redux::BufReader::with_capacity(capacity, reader),
            buf_pos: BufferPosition {
                start: 0,
                seq_pos: Vec::with_capacity(2),
            },
            position: Position::new(0, 0),
            search_pos: 0,
            finished: false,
            buf_policy: StdPolicy,
        }
    }
}

impl Reader<File, DefaultPolicy> {
    /// Creates a reader from a file path.
    ///
    /// # Example:
    ///
    /// ```no_run
    /// use tbf_io::tbfsbs::Reader;
    ///
    /// let mut reader = Reader::from_path("seqs.tbf").unwrap();
    ///
    /// // (... do something with the reader)
    /// ```
    #[inline]
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Reader<File>> {
        File::open(path).map(Reader::new)
    }
}

impl<R, P> Reader<R, P>
where
    R: io::Read,
    P: BufPolicy,
{
    /// Returns a reader with the given buffer policy applied
    #[inline]
    pub fn set_policy<T: BufPolicy>(self, policy: T) -> Reader<R, T> {
        Reader {
            buffer: self.buffer,
            buf_pos: self.buf_pos,
            position: self.position,
            search_pos: self.search_pos,
            finished: self.finished,
            buf_policy: policy,
        }
    }

    /// Returns the `BufPolicy` of the reader
    #[inline]
    pub fn policy(&self) -> &P {
        &self.buf_policy
    }

    /// Searches the next record and returns a [RefRecord](struct.RefRecord.html) that
    /// borrows its data from the underlying buffer of this reader.
    ///
    /// # Example:
    ///
    /// ```no_run
    /// use tbf_io::tbfsbs::{Reader, Record};
    ///
    /// let mut reader = Reader::from_path("seqs.tbf").unwrap();
    ///
    /// while let Some(record) = reader.next() {
    ///     let record = record.unwrap();
    ///     println!("{}", record.id().unwrap());
    /// }
    /// ```
    pub fn next(&mut self) -> Option<Result<RefRecord, Error>> {
        if self.finished || !self.initialized() && !try_opt!(self.init()) {
            return None;
        }

        if !self.buf_pos.is_new() {
            self.next_pos();
        }

        if !try_opt!(self.search()) && !try_opt!(self.next_complete()) {
            return None;
        }

        // a header whose identifier is missing cannot be represented
        let head = head_content(self.get_buf(), &self.buf_pos);
        if head.first().map_or(true, |b| b.is_ascii_whitespace()) {
            self.finished = true;
            return Some(Err(Error::MalformedHeader {
                line: self.position.line,
            }));
        }

        Some(Ok(RefRecord {
            buffer: self.get_buf(),
            buf_pos: &self.buf_pos,
        }))
    }

    // Sets starting points for next position
    #[inline]
    fn next_pos(&mut self) {
        self.position.line += self.buf_pos.seq_pos.len() as u64;
        self.position.byte += (self.search_pos - self.buf_pos.start) as u64;
        self.buf_pos.start = self.search_pos;
        self.buf_pos.seq_pos.clear();
    }

    #[inline(always)]
    fn get_buf(&self) -> &[u8] {
        self.buffer.buffer()
    }

    #[inline(always)]
    fn initialized(&self) -> bool {
        self.position.line != 0
    }

    // moves to the first record positon, ignoring newline characters
    fn init(&mut self) -> Result<bool, Error> {
        if let Some((line_num, pos, byte)) = self.first_byte()? {
            if byte == b'%' {
                self.buf_pos.start = pos;
                self.position.byte = pos as u64;
                self.position.line = line_num as u64;
                self.search_pos = pos + 1;
                return Ok(true);
            } else {
                self.finished = true;
                return Err(Error::InvalidStart {
                    line: line_num as u64,
                    found: byte,
                });
            }
        }
        self.finished = true;
        Ok(false)
    }

    fn first_byte(&mut self) -> Result<Option<(usize, usize, u8)>, Error> {
        let mut line_num = 0;

        while fill_buf(&mut self.buffer)? > 0 {
            let mut pos = 0;

            for line in self.get_buf().split(|b| *b == b'\n') {
                line_num += 1;
                if !line.is_empty() && line != b"\r" {
                    return Ok(Some((line_num, pos, line[0])));
                }
                pos += line.len() + 1;
            }
            self.buffer.consume(pos - 1);
        }
        Ok(None)
    }

    /// Finds the position of the next record
    /// and returns true if found; false if end of buffer reached.
    #[inline]
    fn search(&mut self) -> Result<bool, Error> {
        if self._search() {
            return Ok(true);
        }

        // nothing found
        if self.get_buf().len() < self.buffer.capacity() {
            // EOF reached, there will be no next record
            self.finished = true;
            self.buf_pos.seq_pos.push(self.search_pos);
            return Ok(true);
        }

        Ok(false)
    }

    // returns true if complete position found, false if end of buffer reached.
    #[inline]
    fn _search(&mut self) -> bool {
        let bufsize = self.get_buf().len();

        for pos in Memchr::new(b'\n', &self.buffer.buffer()[self.search_pos..]) {
            let pos = self.search_pos + pos;
            let next_line_start = pos + 1;

            if next_line_start == bufsize {
                // cannot check next byte -> treat as incomplete
                self.search_pos = pos; // make sure last byte is re-searched next time
                return false;
            }

            self.buf_pos.seq_pos.push(pos);
            if self.get_buf()[next_line_start] == b'%' {
                // complete record was found
                self.search_pos = next_line_start;
                return true;
            }
        }

        // record end not found
        self.search_pos = bufsize;

        false
    }

    /// To be called when the end of the buffer is reached and `next_pos` does not find
    /// the next record. Incomplete bytes will be moved to the start of the buffer.
    /// If the record still doesn't fit in, the buffer will be enlarged.
    /// After calling this function, the position will therefore always be 'complete'.
    /// this function assumes that the buffer was fully searched
    fn next_complete(&mut self) -> Result<bool, Error> {
        loop {
            if self.buf_pos.start == 0 {
                // first record -> buffer too small
                self.grow()?;
            } else {
                // not the first record -> buffer may be big enough
                self.make_room();
            }

            // fill up remaining buffer
            fill_buf(&mut self.buffer)?;

            if self.search()? {
                return Ok(true);
            }
        }
    }

    // grow buffer
    fn grow(&mut self) -> Result<(), Error> {
        let cap = self.buffer.capacity();
        let new_size = self.buf_policy.grow_to(cap).ok_or(Error::BufferLimit)?;
        let additional = new_size - cap;
        self.buffer.reserve(additional);
        Ok(())
    }

    // move incomplete bytes to start of buffer
    fn make_room(&mut self) {
        let consumed = self.buf_pos.start;
        self.buffer.consume(consumed);
        self.buffer.make_room();
        self.buf_pos.start = 0;
        self.search_pos -= consumed;
        for s in &mut self.buf_pos.seq_pos {
            *s -= consumed;
        }
    }

    /// Returns the position of the current record.
    /// If `next()` has not yet been called, `None` will be returned.
    ///
    /// # Example
    ///
    /// ```
    /// use tbf_io::tbfsbs::{Reader, Position};
    ///
    /// let tbf = b"%id1 1 a
    /// ACGT
    /// %id2 2 b
    /// TGCA";
    ///
    /// let mut reader = Reader::new(&tbf[..]);
    ///
    /// // skip one record
    /// reader.next().unwrap();
    /// // second position
    /// reader.next().unwrap();
    ///
    /// assert_eq!(reader.position(), Some(&Position::new(3, 14)));
    /// ```
    #[inline]
    pub fn position(&self) -> Option<&Position> {
        if self.buf_pos.is_new() {
            return None;
        }
        Some(&self.position)
    }

    /// Returns a borrowed iterator over all records. The records
    /// are owned (`OwnedRecord`), this is therefore slower than using
    /// `Reader::next()`.
    ///
    /// # Example
    ///
    /// ```
    /// use tbf_io::tbfsbs::{OwnedRecord, Reader, TargetValue};
    ///
    /// let tbf = b"%id1 0.5 first
    /// ACGT
    /// %id2 null
    /// TGCA";
    ///
    /// let mut reader = Reader::new(&tbf[..]);
    ///
    /// let records: Result<Vec<_>, _> = reader
    ///     .records()
    ///     .collect();
    ///
    /// assert_eq!(records.unwrap(),
    ///     vec![
    ///         OwnedRecord {
    ///             id: "id1".to_string(),
    ///             target: TargetValue::Float(0.5),
    ///             desc: Some("first".to_string()),
    ///             seq: b"ACGT".to_vec(),
    ///         },
    ///         OwnedRecord {
    ///             id: "id2".to_string(),
    ///             target: TargetValue::Null,
    ///             desc: None,
    ///             seq: b"TGCA".to_vec(),
    ///         }
    ///     ]
    /// );
    /// ```
    pub fn records(&mut self) -> RecordsIter<R, P> {
        RecordsIter { rdr: self }
    }

    /// Returns an iterator over all records like `Reader::records()`,
    /// but with the difference that it owns the underlying reader.
    pub fn into_records(self) -> RecordsIntoIter<R, P> {
        RecordsIntoIter { rdr: self }
    }
}

/// Borrowed iterator of `OwnedRecord`
pub struct RecordsIter<'a, R, P = DefaultPolicy>
where
    P: 'a,
    R: io::Read + 'a,
{
    rdr: &'a mut Reader<R, P>,
}

impl<'a, R, P> Iterator for RecordsIter<'a, R, P>
where
    P: BufPolicy + 'a,
    R: io::Read + 'a,
{
    type Item = Result<OwnedRecord, Error>;
    fn next(&mut self) -> Option<Self::Item> {
        self.rdr
            .next()
            .map(|rec| rec.and_then(|r| r.to_owned_record()))
    }
}

/// Iterator of `OwnedRecord` that owns the underlying reader
pub struct RecordsIntoIter<R: io::Read, P = DefaultPolicy> {
    rdr: Reader<R, P>,
}

impl<R, P> Iterator for RecordsIntoIter<R, P>
where
    P: BufPolicy,
    R: io::Read,
{
    type Item = Result<OwnedRecord, Error>;
    fn next(&mut self) -> Option<Self::Item> {
        self.rdr
            .next()
            .map(|rec| rec.and_then(|r| r.to_owned_record()))
    }
}

/// Holds line number and byte offset of a record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    line: u64,
    byte: u64,
}

impl Position {
    pub fn new(line: u64, byte: u64) -> Position {
        Position { line, byte }
    }

    /// Line number (starting with 1)
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Byte offset within the file
    pub fn byte(&self) -> u64 {
        self.byte
    }
}

/// TBFSBS parsing error
#[derive(Debug)]
pub enum Error {
    /// io::Error
    Io(io::Error),
    /// First non-empty line does not start with `%`
    InvalidStart {
        /// line number (1-based)
        line: u64,
        /// byte that was found instead
        found: u8,
    },
    /// Header line without an identifier
    MalformedHeader {
        /// line number (1-based) of the header
        line: u64,
    },
    /// Header line is not valid UTF-8. Only returned by the string
    /// accessors and by the conversion to `OwnedRecord`.
    InvalidUtf8(Utf8Error),
    /// Size limit of buffer was reached, which happens if `policy::BufPolicy::grow_to()` returned
    /// `None`. This does not happen with the default `StdPolicy`.
    BufferLimit,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref e) => e.fmt(f),
            Error::InvalidStart { line, found } => write!(
                f,
                "TBFSBS parse error: expected '%' but found '{}' at file start, line {}.",
                (found as char).escape_default(),
                line
            ),
            Error::MalformedHeader { line } => write!(
                f,
                "TBFSBS parse error: header without identifier at line {}.",
                line
            ),
            Error::InvalidUtf8(ref e) => {
                write!(f, "TBFSBS parse error: header is not valid UTF-8 ({}).", e)
            }
            Error::BufferLimit => write!(f, "TBFSBS parse error: buffer limit reached."),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<Utf8Error> for Error {
    fn from(e: Utf8Error) -> Error {
        Error::InvalidUtf8(e)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref e) => Some(e),
            Error::InvalidUtf8(ref e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
struct BufferPosition {
    /// index of '%'
    start: usize,
    /// Indicate line start, but actually it is one byte before (start - 1), which is usually
    /// the line terminator of the header (if there is one). The last index in the Vec is always
    /// the last byte of the last sequence line (including line terminator if present).
    /// Therefore, the length of this Vec should never be 0.
    seq_pos: Vec<usize>,
}

impl BufferPosition {
    #[inline]
    fn is_new(&self) -> bool {
        self.seq_pos.is_empty()
    }
}

/// Header line content following `%`. One separator space after the `%` is
/// not part of the content.
#[inline]
fn head_content<'a>(buffer: &'a [u8], buf_pos: &BufferPosition) -> &'a [u8] {
    let head = trim_cr(&buffer[buf_pos.start + 1..*buf_pos.seq_pos.first().unwrap()]);
    if let Some((&b' ', remaining)) = head.split_first() {
        remaining
    } else {
        head
    }
}

// Returns the start and end of the first token at or behind `from`
#[inline]
fn token_at(head: &[u8], from: usize) -> Option<(usize, usize)> {
    let start = head[from..]
        .iter()
        .position(|b| !b.is_ascii_whitespace())?
        + from;
    let end = head[start..]
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .map_or(head.len(), |e| e + start);
    Some((start, end))
}

/// Splits header content into identifier, target value and description.
/// The description is the raw tail behind the target token (or behind the
/// identifier if there is no target token), with trailing whitespace
/// removed.
fn split_fields(head: &[u8]) -> (&[u8], TargetValue, Option<&[u8]>) {
    let (id_start, id_end) = match token_at(head, 0) {
        Some(pos) => pos,
        None => return (b"", TargetValue::Null, None),
    };
    let id = &head[id_start..id_end];

    let (target, desc_from) = match token_at(head, id_end) {
        Some((start, end)) => match TargetValue::from_token(&head[start..end]) {
            Some(value) => (value, end),
            None => (TargetValue::Null, start),
        },
        None => return (id, TargetValue::Null, None),
    };

    let desc = token_at(head, desc_from).map(|(start, _)| trim_end_ws(&head[start..]));
    (id, target, desc)
}

/// Numeric target value of a record: an integer, a float or the explicit
/// `null` marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetValue {
    Int(i64),
    Float(f64),
    Null,
}

impl TargetValue {
    /// Parses a header token as target value. `None` is returned if the
    /// token is not a target value at all; it then belongs to the
    /// description. Words like `nan` that Rust's float parser would accept
    /// are not treated as numbers.
    #[inline]
    pub fn from_token(token: &[u8]) -> Option<TargetValue> {
        if token == b"null" {
            return Some(TargetValue::Null);
        }
        match token.first() {
            Some(b) if b.is_ascii_digit() || *b == b'+' || *b == b'-' || *b == b'.' => {}
            _ => return None,
        }
        let token = str::from_utf8(token).ok()?;
        if let Ok(i) = token.parse::<i64>() {
            return Some(TargetValue::Int(i));
        }
        token.parse::<f64>().ok().map(TargetValue::Float)
    }

    /// Returns `true` for the `null` marker
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(*self, TargetValue::Null)
    }
}

impl fmt::Display for TargetValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TargetValue::Int(value) => value.fmt(f),
            TargetValue::Float(value) => value.fmt(f),
            TargetValue::Null => f.write_str("null"),
        }
    }
}

/// TBFSBS record trait implemented by both `RefRecord` and `OwnedRecord`
pub trait Record {
    /// Return the record identifier as byte slice
    fn id_bytes(&self) -> &[u8];
    /// Return the target value, `TargetValue::Null` if absent
    fn target(&self) -> TargetValue;
    /// Return the description as byte slice, if present
    fn desc_bytes(&self) -> Option<&[u8]>;
    /// Length of the sequence: the number of bytes remaining after
    /// stripping surrounding whitespace from every sequence line
    fn seq_len(&self) -> usize;
    /// Write the record to the given `io::Write` instance. The sequence will occupy one line only.
    fn write<W: io::Write>(&self, writer: W) -> io::Result<()>;
    /// Write the record to the given `io::Write` instance. The sequence is wrapped to produce
    /// multi-line output with a maximum width specified by `wrap`.
    fn write_wrap<W: io::Write>(&self, writer: W, wrap: usize) -> io::Result<()>;

    /// Return the identifier of the record as string slice
    fn id(&self) -> Result<&str, Utf8Error> {
        str::from_utf8(self.id_bytes())
    }

    /// Return the description of the record as string slice, if present. Otherwise, `None` is returned.
    fn desc(&self) -> Option<Result<&str, Utf8Error>> {
        self.desc_bytes().map(str::from_utf8)
    }
}

/// A TBFSBS record that borrows data from a buffer.
#[derive(Debug, Clone)]
pub struct RefRecord<'a> {
    buffer: &'a [u8],
    buf_pos: &'a BufferPosition,
}

impl<'a> Record for RefRecord<'a> {
    #[inline]
    fn id_bytes(&self) -> &[u8] {
        split_fields(self.head()).0
    }

    #[inline]
    fn target(&self) -> TargetValue {
        split_fields(self.head()).1
    }

    #[inline]
    fn desc_bytes(&self) -> Option<&[u8]> {
        split_fields(self.head()).2
    }

    #[inline]
    fn seq_len(&self) -> usize {
        self.seq_lines().map(|line| line.len()).sum()
    }

    #[inline]
    fn write<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        write_head(&mut writer, self.head())?;
        write_seq_iter(&mut writer, self.seq_lines())
    }

    #[inline]
    fn write_wrap<W: io::Write>(&self, mut writer: W, wrap: usize) -> io::Result<()> {
        write_head(&mut writer, self.head())?;
        write_wrap_seq_iter(&mut writer, self.seq_lines(), wrap)
    }
}

impl<'a> RefRecord<'a> {
    /// Return the header line content following `%` as byte slice
    #[inline]
    pub fn head(&self) -> &[u8] {
        head_content(self.buffer, self.buf_pos)
    }

    /// Return the **raw** sequence as byte slice. It may contain line
    /// breaks and surrounding whitespace. Use `seq_lines()` to iterate
    /// over the stripped lines, or `owned_seq()` / `full_seq()` to access
    /// the whole stripped sequence at once.
    #[inline]
    pub fn seq(&self) -> &[u8] {
        if self.buf_pos.seq_pos.len() > 1 {
            let start = *self.buf_pos.seq_pos.first().unwrap() + 1;
            let end = *self.buf_pos.seq_pos.last().unwrap();
            trim_cr(&self.buffer[start..end])
        } else {
            b""
        }
    }

    /// Return an iterator over all sequence lines in the data, stripped of
    /// surrounding whitespace
    #[inline]
    pub fn seq_lines(&self) -> SeqLines {
        SeqLines {
            data: self.buffer,
            len: self.buf_pos.seq_pos.len() - 1,
            pos_iter: self
                .buf_pos
                .seq_pos
                .iter()
                .zip(self.buf_pos.seq_pos.iter().skip(1)),
        }
    }

    /// Returns the number of sequence lines.
    /// Equivalent to `self.seq_lines().len()`
    #[inline]
    pub fn num_seq_lines(&self) -> usize {
        self.seq_lines().len()
    }

    /// Returns the stripped sequence. If it consists of a single line,
    /// the sequence will be borrowed from the underlying buffer. If there
    /// are multiple lines, an owned copy will be created (equivalent to
    /// `RefRecord::owned_seq()`).
    pub fn full_seq(&self) -> Cow<[u8]> {
        if self.num_seq_lines() == 1 {
            // only one line
            self.seq_lines().next().unwrap().into()
        } else {
            self.owned_seq().into()
        }
    }

    /// Returns the sequence as owned `Vec`: all lines stripped of
    /// surrounding whitespace and concatenated without separator
    pub fn owned_seq(&self) -> Vec<u8> {
        let mut seq = Vec::new();
        for segment in self.seq_lines() {
            seq.extend(segment);
        }
        seq
    }

    /// Creates an owned copy of the record with parsed header fields.
    /// Fails with `Error::InvalidUtf8` if the header is not valid UTF-8.
    pub fn to_owned_record(&self) -> Result<OwnedRecord, Error> {
        Ok(OwnedRecord {
            id: self.id()?.to_string(),
            target: self.target(),
            desc: match self.desc() {
                Some(d) => Some(d?.to_string()),
                None => None,
            },
            seq: self.owned_seq(),
        })
    }

    /// Writes a record to the given `io::Write` instance
    /// by just writing the unmodified input, which is faster than `RefRecord::write`
    pub fn write_unchanged<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        let data = &self.buffer[self.buf_pos.start..*self.buf_pos.seq_pos.last().unwrap()];
        writer.write_all(data)?;
        if *data.last().unwrap() != b'\n' {
            writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Iterator over the stripped sequence lines of a record.
pub struct SeqLines<'a> {
    data: &'a [u8],
    len: usize,
    pos_iter: iter::Zip<slice::Iter<'a, usize>, iter::Skip<slice::Iter<'a, usize>>>,
}

impl<'a> Iterator for SeqLines<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<&'a [u8]> {
        self.pos_iter
            .next()
            .map(|(start, next_start)| trim_ws(&self.data[*start + 1..*next_start]))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let l = self.len();
        (l, Some(l))
    }
}

impl<'a> DoubleEndedIterator for SeqLines<'a> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a [u8]> {
        self.pos_iter
            .next_back()
            .map(|(start, next_start)| trim_ws(&self.data[*start + 1..*next_start]))
    }
}

impl<'a> ExactSizeIterator for SeqLines<'a> {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }
}

/// A TBFSBS record with parsed header fields that owns its data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedRecord {
    pub id: String,
    pub target: TargetValue,
    pub desc: Option<String>,
    /// Stripped, concatenated sequence
    pub seq: Vec<u8>,
}

impl Record for OwnedRecord {
    #[inline]
    fn id_bytes(&self) -> &[u8] {
        self.id.as_bytes()
    }

    #[inline]
    fn target(&self) -> TargetValue {
        self.target
    }

    #[inline]
    fn desc_bytes(&self) -> Option<&[u8]> {
        self.desc.as_deref().map(str::as_bytes)
    }

    #[inline]
    fn seq_len(&self) -> usize {
        self.seq.len()
    }

    #[inline]
    fn write<W: io::Write>(&self, writer: W) -> io::Result<()> {
        write_parts(writer, self.id_bytes(), self.target, self.desc_bytes(), &self.seq)
    }

    #[inline]
    fn write_wrap<W: io::Write>(&self, mut writer: W, wrap: usize) -> io::Result<()> {
        write_id_target_desc(&mut writer, self.id_bytes(), self.target, self.desc_bytes())?;
        write_wrap_seq(&mut writer, &self.seq, wrap)
    }
}

/// Writes a record from its raw header content and stripped sequence.
#[inline]
pub fn write_to<W>(mut writer: W, head: &[u8], seq: &[u8]) -> io::Result<()>
where
    W: io::Write,
{
    write_head(&mut writer, head)?;
    write_seq(&mut writer, seq)
}

/// Writes a record reconstructed from identifier, target value and
/// description parts instead of a whole header line.
#[inline]
pub fn write_parts<W>(
    mut writer: W,
    id: &[u8],
    target: TargetValue,
    desc: Option<&[u8]>,
    seq: &[u8],
) -> io::Result<()>
where
    W: io::Write,
{
    write_id_target_desc(&mut writer, id, target, desc)?;
    write_seq(&mut writer, seq)
}

/// Writes a record reconstructed from its parts. Wraps the sequence to
/// produce multi-line output with a maximum width specified by the `wrap`
/// parameter.
#[inline]
pub fn write_wrap<W>(
    mut writer: W,
    id: &[u8],
    target: TargetValue,
    desc: Option<&[u8]>,
    seq: &[u8],
    wrap: usize,
) -> io::Result<()>
where
    W: io::Write,
{
    write_id_target_desc(&mut writer, id, target, desc)?;
    write_wrap_seq(&mut writer, seq, wrap)
}

/// Writes only the header line from its raw content (everything following `%`).
#[inline]
pub fn write_head<W>(mut writer: W, head: &[u8]) -> io::Result<()>
where
    W: io::Write,
{
    writer.write_all(b"% ")?;
    writer.write_all(head)?;
    writer.write_all(b"\n")
}

/// Writes only the header line, reconstructed from identifier, target value
/// and description. The target value field is always present, rendered as
/// `null` if absent; an empty description is omitted entirely.
#[inline]
pub fn write_id_target_desc<W>(
    mut writer: W,
    id: &[u8],
    target: TargetValue,
    desc: Option<&[u8]>,
) -> io::Result<()>
where
    W: io::Write,
{
    writer.write_all(b"% ")?;
    writer.write_all(id)?;
    write!(writer, " {}", target)?;
    if let Some(desc) = desc {
        if !desc.is_empty() {
            writer.write_all(b" ")?;
            writer.write_all(desc)?;
        }
    }
    writer.write_all(b"\n")
}

/// Writes only the sequence line.
#[inline]
pub fn write_seq<W>(mut writer: W, seq: &[u8]) -> io::Result<()>
where
    W: io::Write,
{
    writer.write_all(seq)?;
    writer.write_all(b"\n")
}

/// Writes the sequence line, and wraps the output to a maximum width specified by `wrap`.
#[inline]
pub fn write_wrap_seq<W>(mut writer: W, seq: &[u8], wrap: usize) -> io::Result<()>
where
    W: io::Write,
{
    assert!(wrap > 0);
    for chunk in seq.chunks(wrap) {
        writer.write_all(chunk)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Writes the sequence line from an iterator (such as `SeqLines`)
#[inline]
pub fn write_seq_iter<'a, W, S>(mut writer: W, seq: S) -> io::Result<()>
where
    W: io::Write,
    S: Iterator<Item = &'a [u8]>,
{
    for subseq in seq {
        writer.write_all(subseq)?;
    }
    writer.write_all(b"\n")
}

/// Writes the sequence line from an iterator (such as `SeqLines`) and wraps the output
/// to a maximum width specified by `wrap`.
#[inline]
pub fn write_wrap_seq_iter<'a, W, S>(mut writer: W, seq: S, wrap: usize) -> io::Result<()>
where
    W: io::Write,
    S: IntoIterator<Item = &'a [u8]>,
{
    assert!(wrap > 0);
    let mut n_line = 0;
    for subseq in seq {
        let mut chunk = subseq;
        loop {
            let remaining = wrap - n_line;
            if chunk.len() <= remaining {
                writer.write_all(chunk)?;
                n_line += chunk.len();
                break;
            }
            // chunk longer than line -> break
            let (line, rest) = chunk.split_at(remaining);
            chunk = rest;
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
            n_line = 0;
        }
    }
    writer.write_all(b"\n")?;
    Ok(())
}

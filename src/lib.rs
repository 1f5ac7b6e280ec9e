//! Reading and writing of TBFSBS, a simple text format for storing
//! biological sequences. A record starts with a `%` header line carrying an
//! identifier, an optional numeric target value and a free-text description,
//! followed by any number of sequence lines:
//!
//! ```text
//! % seq1 3.5 Example sequence
//! ACGT
//! TTGC
//! % seq2 null No target
//! AAAA
//! ```
//!
//! The parser avoids allocations and copying as much as possible.
//! [`tbfsbs::RefRecord`](tbfsbs/struct.RefRecord.html) borrows from the
//! underlying buffered reader and offers the
//! [`seq_lines()`](tbfsbs/struct.RefRecord.html#method.seq_lines) method for
//! iterating over the whitespace-trimmed sequence lines of a multi-line
//! record without copying the data. Header fields are parsed lazily from the
//! borrowed header line.
//!
//! The reader uses a buffer of 64 KiB size which automatically grows if a
//! record does not fit. How it grows can be configured, see the
//! [`policy`](policy) module.
//!
//! # Example: reporting identifiers
//!
//! ```no_run
//! use tbf_io::tbfsbs::{Reader, Record};
//!
//! let mut reader = Reader::from_path("seqs.tbf").unwrap();
//!
//! while let Some(record) = reader.next() {
//!     let record = record.expect("Error reading record");
//!     println!("{}", record.id().unwrap());
//! }
//! ```
//!
//! # Example: mean sequence length
//!
//! Sequence lines are stripped of surrounding whitespace and concatenated
//! without separator, so the length of a record does not depend on how the
//! sequence was split into lines:
//!
//! ```
//! use tbf_io::tbfsbs::{Reader, Record};
//!
//! let input = b"% id1 1 first
//! ACGT
//! TTGC
//! % id2 2 second
//! AAAA
//! ";
//!
//! let mut reader = Reader::new(&input[..]);
//!
//! let mut n = 0;
//! let mut sum = 0;
//! while let Some(record) = reader.next() {
//!     let record = record.expect("Error reading record");
//!     sum += record.seq_len();
//!     n += 1;
//! }
//! assert_eq!(sum, 12);
//! assert_eq!(n, 2);
//! ```
//!
//! # Owned records
//!
//! The reader also provides iterators returning
//! [`tbfsbs::OwnedRecord`](tbfsbs/struct.OwnedRecord.html), which holds the
//! parsed header fields and the concatenated sequence. This is slower, but
//! makes sense if the records are collected into a vector, as the command
//! line tool does before re-serializing:
//!
//! ```no_run
//! use tbf_io::tbfsbs::Reader;
//!
//! let mut reader = Reader::from_path("input.tbf").unwrap();
//!
//! let records: Result<Vec<_>, _> = reader.records().collect();
//! ```

extern crate buffer_redux;
extern crate memchr;

#[macro_use]
extern crate serde_derive;
extern crate serde;

use std::io;

macro_rules! try_opt {
    ($expr: expr) => {
        match $expr {
            Ok(item) => item,
            Err(e) => return Some(Err(::std::convert::From::from(e))),
        }
    };
}

pub mod input;
pub mod policy;
pub mod tbfsbs;

/// Remove a final '\r' from a byte slice
#[inline]
fn trim_cr(line: &[u8]) -> &[u8] {
    if let Some((&b'\r', remaining)) = line.split_last() {
        remaining
    } else {
        line
    }
}

/// Strip ASCII whitespace from the end of a byte slice
#[inline]
fn trim_end_ws(mut line: &[u8]) -> &[u8] {
    while let Some((last, remaining)) = line.split_last() {
        if last.is_ascii_whitespace() {
            line = remaining;
        } else {
            break;
        }
    }
    line
}

/// Strip ASCII whitespace (including '\r') from both ends of a byte slice
#[inline]
fn trim_ws(mut line: &[u8]) -> &[u8] {
    while let Some((first, remaining)) = line.split_first() {
        if first.is_ascii_whitespace() {
            line = remaining;
        } else {
            break;
        }
    }
    trim_end_ws(line)
}

/// Makes sure the buffer is full after this call (unless EOF reached)
/// code adapted from `io::Read::read_exact`
fn fill_buf<R>(reader: &mut buffer_redux::BufReader<R>) -> io::Result<usize>
where
    R: io::Read,
{
    let initial_size = reader.buffer().len();
    let mut num_read = 0;
    while initial_size + num_read < reader.capacity() {
        match reader.read_into_buf() {
            Ok(0) => break,
            Ok(n) => num_read += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(num_read)
}

#![allow(dead_code)]

extern crate tbf_io;

use tbf_io::policy::DoubleUntilLimited;
use tbf_io::tbfsbs::{self, Record, TargetValue};

const TBF: &'static [&'static [u8]; 11] = &[
    b"%id1 2.5 first block",
    b"ACCGTAGGCT",
    b"CCGTAGGCTG",
    b"CGTAGGCTGA",
    b"GTAGGCTGAA",
    b"CCCC",
    b"%id2 null",
    b"ATTGTTGTTT",
    b"ATTGTTGTTT",
    b"ATTGTTGTTT",
    b"GGGG",
];

fn concat_lines(lines: &[&[u8]], terminator: &[u8], last: bool) -> Vec<u8> {
    let mut out: Vec<_> = lines
        .iter()
        .flat_map(|s| s.iter().chain(terminator))
        .cloned()
        .collect();
    if !last {
        let l = out.len();
        out.truncate(l - terminator.len());
    }
    out
}

fn parse_one(input: &[u8]) -> tbfsbs::OwnedRecord {
    let mut reader = tbfsbs::Reader::new(input);
    let record = reader
        .next()
        .expect("no record")
        .expect("parse error")
        .to_owned_record()
        .expect("invalid UTF-8");
    assert!(reader.next().is_none());
    record
}

#[test]
fn test_reader() {
    let expected = [
        ("id1", TargetValue::Float(2.5), Some("first block"), (1, 6)),
        ("id2", TargetValue::Null, None, (7, 11)),
    ];
    let lterms: [&[u8]; 2] = [b"\n", b"\r\n"];

    // try different line endings
    for t in lterms {
        let tbf = concat_lines(TBF, t, true);
        let exp_seqs: Vec<_> = expected
            .iter()
            .map(|&(_, _, _, (start, end))| {
                (
                    // raw sequence
                    concat_lines(&TBF[start..end], t, false),
                    // stripped, concatenated sequence
                    TBF[start..end].concat().to_vec(),
                )
            })
            .collect();

        // try different initial capacities to test
        // buffer growing feature
        for cap in 3..100 {
            let mut exp_iter = expected.iter().zip(&exp_seqs);
            let mut reader = tbfsbs::Reader::with_capacity(tbf.as_slice(), cap);
            while let Some((&(id, target, desc, _), &(ref raw_seq, ref seq))) = exp_iter.next() {
                let record = reader
                    .next()
                    .unwrap()
                    .unwrap_or_else(|_| panic!("Error reading record at cap. {}", cap));

                assert_eq!(record.id(), Ok(id), "ID mismatch at cap. {}", cap);
                assert_eq!(record.target(), target, "target mismatch at cap. {}", cap);
                assert_eq!(record.desc(), desc.map(Ok), "desc mismatch at cap. {}", cap);
                assert_eq!(record.seq(), raw_seq.as_slice(), "raw seq mismatch at cap. {}", cap);
                assert_eq!(record.owned_seq().as_slice(), seq.as_slice(), "seq mismatch at cap. {}", cap);
                assert_eq!(record.full_seq().into_owned(), *seq, "full seq mismatch at cap. {}", cap);
                assert_eq!(record.seq_len(), seq.len(), "seq length mismatch at cap. {}", cap);

                let owned = record.to_owned_record().unwrap();
                assert_eq!(owned.id(), Ok(id), "ID mismatch at cap. {}", cap);
                assert_eq!(owned.target(), target, "target mismatch at cap. {}", cap);
                assert_eq!(owned.desc(), desc.map(Ok), "desc mismatch at cap. {}", cap);
                assert_eq!(owned.seq.as_slice(), seq.as_slice(), "seq mismatch at cap. {}", cap);
            }
            assert!(reader.next().is_none());
        }
    }
}

#[test]
fn test_position() {
    let tbf = b"%id1 1 a\nACGT\n%id2 2 b\nTGCA";
    let mut reader = tbfsbs::Reader::new(&tbf[..]);
    assert!(reader.position().is_none());
    reader.next().unwrap().unwrap();
    let pos = reader.position().unwrap();
    assert_eq!((pos.line(), pos.byte()), (1, 0));
    reader.next().unwrap().unwrap();
    let pos = reader.position().unwrap();
    assert_eq!((pos.line(), pos.byte()), (3, 14));
}

#[test]
fn test_owned_iterators() {
    let input = concat_lines(TBF, b"\n", true);

    let mut reader = tbfsbs::Reader::new(input.as_slice());
    let records: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "id1");
    assert_eq!(records[1].id, "id2");

    let reader = tbfsbs::Reader::new(input.as_slice());
    let owned: Vec<_> = reader.into_records().collect::<Result<_, _>>().unwrap();
    assert_eq!(owned, records);
}

#[test]
fn test_invalid_start() {
    let mut reader = tbfsbs::Reader::new(&b"id\nATGC"[..]);
    let rec = reader.next().unwrap();
    assert!(rec.is_err() && format!("{}", rec.err().unwrap()).contains("expected '%'"));
}

#[test]
fn test_none_after_err() {
    let mut reader = tbfsbs::Reader::new(&b"id\nATGC"[..]);
    assert!(reader.next().unwrap().is_err());
    assert!(reader.next().is_none());
}

#[test]
fn test_malformed_header() {
    // no identifier at all
    let mut reader = tbfsbs::Reader::new(&b"%\nATGC"[..]);
    match reader.next().unwrap() {
        Err(tbfsbs::Error::MalformedHeader { line }) => assert_eq!(line, 1),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(reader.next().is_none());

    // the first field is empty, '5' is in the target position
    let mut reader = tbfsbs::Reader::new(&b"%  5 desc\nATGC"[..]);
    assert!(matches!(
        reader.next().unwrap(),
        Err(tbfsbs::Error::MalformedHeader { line: 1 })
    ));

    // a malformed header aborts the stream mid-file
    let mut reader = tbfsbs::Reader::new(&b"%ok 1 a\nACGT\n% \nATGC"[..]);
    assert!(reader.next().unwrap().is_ok());
    assert!(matches!(
        reader.next().unwrap(),
        Err(tbfsbs::Error::MalformedHeader { line: 3 })
    ));
    assert!(reader.next().is_none());
}

#[test]
fn test_target_values() {
    let record = parse_one(b"% s1 42 x\nAC\n");
    assert_eq!(record.target, TargetValue::Int(42));
    assert_eq!(record.desc.as_deref(), Some("x"));

    let record = parse_one(b"% s2 -3 x\n");
    assert_eq!(record.target, TargetValue::Int(-3));

    let record = parse_one(b"% s3 3.5 x\n");
    assert_eq!(record.target, TargetValue::Float(3.5));

    let record = parse_one(b"% s4 -7.25\n");
    assert_eq!(record.target, TargetValue::Float(-7.25));
    assert_eq!(record.desc, None);

    let record = parse_one(b"% s5 1e3 x\n");
    assert_eq!(record.target, TargetValue::Float(1000.0));

    // explicit null marker, description follows
    let record = parse_one(b"% s6 null keep this\nAAAA\n");
    assert!(record.target.is_null());
    assert_eq!(record.desc.as_deref(), Some("keep this"));
    assert_eq!(record.seq_len(), 4);

    // a non-numeric second token belongs to the description
    let record = parse_one(b"% s7 Some description\n");
    assert_eq!(record.target, TargetValue::Null);
    assert_eq!(record.desc.as_deref(), Some("Some description"));

    // numbers with trailing junk are not target values either
    let record = parse_one(b"% s8 12abc stuff\n");
    assert_eq!(record.target, TargetValue::Null);
    assert_eq!(record.desc.as_deref(), Some("12abc stuff"));

    // header consisting of the identifier only
    let record = parse_one(b"% s9\n");
    assert_eq!(record.target, TargetValue::Null);
    assert_eq!(record.desc, None);
    assert_eq!(record.seq_len(), 0);
}

#[test]
fn test_seq_len_independent_of_layout() {
    for input in [
        &b"% i null\nACGTTTGC\n"[..],
        b"% i null\nACGT\nTTGC\n",
        b"% i null\nACGT  \n  TTGC\n",
        b"% i null\nAC\nGT\nTT\nGC",
    ] {
        let record = parse_one(input);
        assert_eq!(record.seq_len(), 8, "length mismatch for {:?}", input);
        assert_eq!(record.seq, b"ACGTTTGC".to_vec());
    }
}

#[test]
fn test_buffer_limit() {
    let input = &b"%id 1 a\nACGTACGTACGTACGTACGT\n"[..];
    let mut reader =
        tbfsbs::Reader::with_capacity(input, 3).set_policy(DoubleUntilLimited::new(8, 16));
    assert!(matches!(
        reader.next().unwrap(),
        Err(tbfsbs::Error::BufferLimit)
    ));
}

// writing

#[test]
fn test_write_head() {
    let mut out = vec![];
    tbfsbs::write_head(&mut out, b"id 1 desc").unwrap();
    assert_eq!(&out, b"% id 1 desc\n");
}

#[test]
fn test_write_id_target_desc() {
    let mut out = vec![];
    let desc = &b"Example sequence"[..];
    tbfsbs::write_id_target_desc(&mut out, b"id", TargetValue::Float(3.5), Some(desc)).unwrap();
    assert_eq!(&out, b"% id 3.5 Example sequence\n");

    let mut out = vec![];
    tbfsbs::write_id_target_desc(&mut out, b"id", TargetValue::Null, None).unwrap();
    assert_eq!(&out, b"% id null\n");

    let mut out = vec![];
    tbfsbs::write_id_target_desc(&mut out, b"id", TargetValue::Int(-2), Some(&b""[..])).unwrap();
    assert_eq!(&out, b"% id -2\n");
}

#[test]
fn test_write_to() {
    let mut out = vec![];
    tbfsbs::write_to(&mut out, b"id 1 desc", b"ACGT").unwrap();
    assert_eq!(&out, b"% id 1 desc\nACGT\n");
}

#[test]
fn test_write_seq() {
    let mut out = vec![];
    tbfsbs::write_seq(&mut out, b"ATGC").unwrap();
    assert_eq!(&out, b"ATGC\n");
}

#[test]
fn test_write_seq_wrap() {
    let mut out = vec![];
    tbfsbs::write_wrap_seq(&mut out, b"ATGCA", 2).unwrap();
    assert_eq!(&out, b"AT\nGC\nA\n");
}

#[test]
fn test_write_seq_iter() {
    let mut out = vec![];
    tbfsbs::write_seq_iter(&mut out, b"ATGCA".chunks(2)).unwrap();
    assert_eq!(&out, b"ATGCA\n");
}

#[test]
fn test_write_seq_iter_wrap() {
    for size in 1..11 {
        let mut out = vec![];
        tbfsbs::write_wrap_seq_iter(&mut out, b"AAAATTTTGGG".chunks(size), 3).unwrap();
        assert_eq!(&out, b"AAA\nATT\nTTG\nGG\n");

        let mut out = vec![];
        tbfsbs::write_wrap_seq_iter(&mut out, b"AAAATTTTGGG".chunks(size), 4).unwrap();
        assert_eq!(&out, b"AAAA\nTTTT\nGGG\n");
    }
}

#[test]
fn test_write_record_wrap() {
    let input = &b"% seq1 3.5 Example sequence\nACGT\nTTGC\n"[..];
    let expected = &b"% seq1 3.5 Example sequence\nAC\nGT\nTT\nGC\n"[..];

    // borrowed record: header is passed through
    let mut reader = tbfsbs::Reader::new(input);
    let record = reader.next().unwrap().unwrap();
    assert_eq!(record.seq_len(), 8);
    let mut out = vec![];
    record.write_wrap(&mut out, 2).unwrap();
    assert_eq!(out.as_slice(), expected);

    // owned record: header is reconstructed
    let owned = record.to_owned_record().unwrap();
    let mut out = vec![];
    owned.write_wrap(&mut out, 2).unwrap();
    assert_eq!(out.as_slice(), expected);
}

#[test]
fn test_write_roundtrip() {
    // wrapping then re-reading reproduces the record
    let record = parse_one(b"% seq1 3.5 Example sequence\nACGTTTGCAA\n");
    for wrap in 1..12 {
        let mut out = vec![];
        record.write_wrap(&mut out, wrap).unwrap();
        let reread = parse_one(&out);
        assert_eq!(reread, record, "round trip failed at wrap {}", wrap);
    }

    // unwrapped output of a null-target record is identical to its input
    let input = &b"% seq2 null No target\nAAAA\n"[..];
    let record = parse_one(input);
    assert_eq!(record.seq_len(), 4);
    let mut out = vec![];
    record.write(&mut out).unwrap();
    assert_eq!(out.as_slice(), input);

    // a missing target value becomes the explicit null marker on output
    let record = parse_one(b"%x My description\nAA\n");
    let mut out = vec![];
    record.write(&mut out).unwrap();
    assert_eq!(&out, b"% x null My description\nAA\n");
    assert_eq!(parse_one(&out), record);
}

#[test]
fn test_write_unchanged() {
    let input = concat_lines(TBF, b"\n", true);
    let mut reader = tbfsbs::Reader::new(input.as_slice());
    let mut out = vec![];
    while let Some(record) = reader.next() {
        record.unwrap().write_unchanged(&mut out).unwrap();
    }
    assert_eq!(out, input);
}

#[test]
fn test_wrap_lossless() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let len = rng.gen_range(0..200);
        let seq: Vec<u8> = (0..len).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect();
        let wrap = rng.gen_range(1..20);

        let mut out = vec![];
        tbfsbs::write_wrap(&mut out, b"id", TargetValue::Null, None, &seq, wrap).unwrap();

        // no sequence line exceeds the wrap width
        for line in out.split(|b| *b == b'\n').skip(1) {
            assert!(line.len() <= wrap);
        }

        // re-reading reproduces the sequence exactly
        let record = parse_one(&out);
        assert_eq!(record.seq, seq, "lossless wrap failed at wrap {}", wrap);
    }
}

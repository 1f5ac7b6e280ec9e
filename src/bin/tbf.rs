use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::{debug, info};

use tbf_io::input;
use tbf_io::tbfsbs::{self, OwnedRecord, Record};

#[derive(Parser)]
#[clap(
    author,
    version,
    about = "Parse TBFSBS (Text-Based Format for Storing Biological Sequences) file[s].",
    long_about = None
)]
struct Args {
    /// List of input file names or folder[s] with file[s]
    /// (folders are expanded recursively)
    #[clap(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,
    /// Output file name for the re-serialized records
    #[clap(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// Maximum length of the sequence line in the output (0 means no wrapping)
    #[clap(short, long, value_name = "WRAP", num_args = 0..=1, default_missing_value = "0")]
    wrap: Option<usize>,
    /// Verbosity (-v: info, -vv: debug, -vvv: trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug)]
enum CliError {
    Input(input::Error),
    Parse { path: PathBuf, err: tbfsbs::Error },
    OutputWrite { path: PathBuf, err: io::Error },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CliError::Input(ref e) => e.fmt(f),
            CliError::Parse { ref path, ref err } => {
                write!(f, "{}: {}", path.display(), err)
            }
            CliError::OutputWrite { ref path, ref err } => {
                write!(f, "cannot write {}: {}", path.display(), err)
            }
        }
    }
}

impl From<input::Error> for CliError {
    fn from(e: input::Error) -> CliError {
        CliError::Input(e)
    }
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&args) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let files = input::resolve(&args.inputs)?;
    debug!("{} input file(s) after expansion", files.len());

    let mut records = Vec::new();
    for path in &files {
        parse_file(path, args.output.is_some(), &mut records)?;
    }

    if let Some(output) = &args.output {
        debug!(
            "writing {} record(s) to {}, wrap: {:?}",
            records.len(),
            output.display(),
            args.wrap
        );
        write_records(output, &records, args.wrap).map_err(|err| CliError::OutputWrite {
            path: output.clone(),
            err,
        })?;
    }
    Ok(())
}

/// Reports all records of one file and, if `keep` is set, appends their
/// owned copies to `records` for later serialization.
fn parse_file(
    path: &Path,
    keep: bool,
    records: &mut Vec<OwnedRecord>,
) -> Result<(), CliError> {
    info!("parsing {}", path.display());
    println!("File: {}\n", path.display());

    let mut reader = tbfsbs::Reader::from_path(path).map_err(|err| CliError::Parse {
        path: path.to_path_buf(),
        err: err.into(),
    })?;
    while let Some(record) = reader.next() {
        let record = record.map_err(|err| CliError::Parse {
            path: path.to_path_buf(),
            err,
        })?;
        print_record(&record).map_err(|err| CliError::Parse {
            path: path.to_path_buf(),
            err,
        })?;
        if keep {
            records.push(record.to_owned_record().map_err(|err| CliError::Parse {
                path: path.to_path_buf(),
                err,
            })?);
        }
    }
    Ok(())
}

/// Prints the report block of one record to standard output.
fn print_record(record: &tbfsbs::RefRecord) -> Result<(), tbfsbs::Error> {
    let desc = match record.desc() {
        Some(d) => d?,
        None => "",
    };
    println!(
        "ID: {}\nValue: {}\nDescription: {}\nSequence length: {}\n",
        record.id()?,
        record.target(),
        desc,
        record.seq_len()
    );
    Ok(())
}

/// Serializes all records to `path`, wrapping sequence lines if a positive
/// wrap width was requested.
fn write_records(path: &Path, records: &[OwnedRecord], wrap: Option<usize>) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        match wrap {
            Some(wrap) if wrap > 0 => record.write_wrap(&mut writer, wrap)?,
            _ => record.write(&mut writer)?,
        }
    }
    writer.flush()
}

//! Decode CSV event records with a compiled protocol description.
//!
//! Usage:
//!   decode_events [OPTIONS] DESCRIPTION.xml [INPUT.csv]
//!   decode_events [OPTIONS] DESCRIPTION.xml < input.csv
//!
//! Options:
//!   --program, -p               Print the compiled program and exit
//!   --payload-fields, -F PREFIX Also add each payload byte as a field PREFIX0, PREFIX1, ...
//!   --delimiter, -d C           Field delimiter (default ',')
//!   --verbose, -v               Debug logging (compiler and decoder)
//!
//! Each non-blank line is one record. Records that fail to decode are reported
//! on stderr and skipped; exit code 1 if any record failed.

use anyhow::{bail, Context};
use csvevent::dump::{format_program, format_record};
use csvevent::{compile_file, Dialect, EventDecoder};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

struct Options {
    description: PathBuf,
    input: Option<PathBuf>,
    print_program: bool,
    verbose: bool,
    payload_prefix: Option<String>,
    dialect: Dialect,
}

fn take_value(args: &mut Vec<String>, names: &[&str]) -> anyhow::Result<Option<String>> {
    match args.iter().position(|a| names.contains(&a.as_str())) {
        Some(pos) => {
            if pos + 1 >= args.len() {
                bail!("{} needs a value", args[pos]);
            }
            let value = args.remove(pos + 1);
            args.remove(pos);
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn take_flag(args: &mut Vec<String>, names: &[&str]) -> bool {
    match args.iter().position(|a| names.contains(&a.as_str())) {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    }
}

/// Non-blank input lines as (record number, line number, text), both 1-based.
fn records<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<(usize, usize, String)>> {
    reader
        .lines()
        .enumerate()
        .filter(|(_, line)| !matches!(line, Ok(text) if text.trim().is_empty()))
        .enumerate()
        .map(|(record, (line_index, line))| line.map(|text| (record + 1, line_index + 1, text)))
}

fn parse_options() -> anyhow::Result<Options> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let print_program = take_flag(&mut args, &["--program", "-p"]);
    let verbose = take_flag(&mut args, &["--verbose", "-v"]);
    let payload_prefix = take_value(&mut args, &["--payload-fields", "-F"])?;
    let mut dialect = Dialect::default();
    if let Some(d) = take_value(&mut args, &["--delimiter", "-d"])? {
        let mut chars = d.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => dialect = dialect.with_delimiter(c),
            _ => bail!("--delimiter takes a single character, got {:?}", d),
        }
    }
    if let Some(unknown) = args.iter().find(|a| a.starts_with('-') && a.len() > 1) {
        bail!("unknown option {}", unknown);
    }
    let mut positional = args.into_iter();
    let description = positional
        .next()
        .map(PathBuf::from)
        .context("usage: decode_events [--program] [--verbose] [--payload-fields PREFIX] [--delimiter C] DESCRIPTION [INPUT]")?;
    let input = positional.next().map(PathBuf::from);
    if let Some(extra) = positional.next() {
        bail!("unexpected argument {}", extra);
    }
    Ok(Options {
        description,
        input,
        print_program,
        verbose,
        payload_prefix,
        dialect,
    })
}

fn main() -> anyhow::Result<()> {
    let opts = parse_options()?;
    env_logger::Builder::from_default_env()
        .filter_level(if opts.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let program = compile_file(&opts.description)
        .with_context(|| format!("compiling {}", opts.description.display()))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if opts.print_program {
        out.write_all(format_program(&program).as_bytes())?;
        return Ok(());
    }
    let decoder = EventDecoder::new(program, opts.dialect);

    let reader: Box<dyn BufRead> = match &opts.input {
        Some(path) => Box::new(BufReader::new(
            std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut failed = 0usize;
    let mut decoded = 0usize;
    for entry in records(reader) {
        let (record_no, line_no, line) = entry?;
        match decoder.decode(&line) {
            Ok(mut record) => {
                if let Some(prefix) = &opts.payload_prefix {
                    record.add_payload_as_fields(prefix);
                }
                decoded += 1;
                writeln!(out, "=== record {} ===", record_no)?;
                out.write_all(format_record(&record).as_bytes())?;
            }
            Err(e) => {
                failed += 1;
                eprintln!("record {} (line {}): {}", record_no, line_no, e);
            }
        }
    }
    out.flush()?;
    log::info!("{} record(s) decoded, {} failed", decoded, failed);

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_numbers_skip_blank_lines() {
        let input = "1,A,0\n\n  \n2,B,0\n3,C,0\n";
        let got: Vec<_> = records(input.as_bytes())
            .map(|r| r.expect("read"))
            .collect();
        assert_eq!(
            got,
            [
                (1, 1, "1,A,0".to_string()),
                (2, 4, "2,B,0".to_string()),
                (3, 5, "3,C,0".to_string()),
            ]
        );
    }
}

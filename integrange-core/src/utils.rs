use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

fn is_gzipped(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("gz"))
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> io::Result<BufReader<Box<dyn Read>>> {
    let file = File::open(path).map_err(|e| {
        io::Error::new(e.kind(), format!("Failed to open file {}: {}", path.display(), e))
    })?;
    let file: Box<dyn Read> = match is_gzipped(path) {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Get a writer that gzips the output when the path ends in `.gz`.
///
/// # Arguments
///
/// - path: path to the file to create
///
pub fn get_dynamic_writer(path: &Path) -> io::Result<BufWriter<Box<dyn Write>>> {
    let file = File::create(path)?;
    let file: Box<dyn Write> = match is_gzipped(path) {
        true => Box::new(GzEncoder::new(file, Compression::default())),
        false => Box::new(file),
    };

    Ok(BufWriter::new(file))
}

/// Split one TSV line into fields, dropping a trailing carriage return.
pub fn split_tsv_line(line: &str) -> Vec<&str> {
    line.trim_end_matches('\r').split('\t').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::BufRead;

    #[rstest]
    fn test_gz_round_trip_through_dynamic_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.tsv.gz");
        {
            let mut writer = get_dynamic_writer(&path).unwrap();
            writeln!(writer, "a\tb").unwrap();
            writer.flush().unwrap();
        }
        let reader = get_dynamic_reader(&path).unwrap();
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["a\tb".to_string()]);
    }

    #[rstest]
    fn test_split_tsv_line() {
        assert_eq!(split_tsv_line("a\tb\t\r"), vec!["a", "b", ""]);
    }
}

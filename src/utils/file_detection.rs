//! Heuristic binary-vs-text classification from a content sample.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

const SAMPLE_LEN: usize = 1024;
const PRINTABLE_THRESHOLD: f64 = 0.7;

/// Determines if a file is likely binary.
///
/// Reads up to the first [`SAMPLE_LEN`] bytes. Any null byte means
/// binary; otherwise a sample whose printable-ASCII fraction (plus tab,
/// newline and carriage return) falls below [`PRINTABLE_THRESHOLD`] is
/// binary. Empty files are text. A file that cannot be opened or read
/// is reported as binary so the caller skips it.
pub fn looks_binary(path: &Path) -> bool {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!("Could not open {} for sniffing: {}", path.display(), e);
            return true;
        }
    };

    let mut buffer = [0u8; SAMPLE_LEN];
    let mut filled = 0;
    while filled < SAMPLE_LEN {
        match file.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!("Could not sample {}: {}", path.display(), e);
                return true;
            }
        }
    }
    let sample = &buffer[..filled];

    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }

    let printable = sample
        .iter()
        .filter(|&&b| (0x20..=0x7e).contains(&b) || matches!(b, b'\t' | b'\n' | b'\r'))
        .count();
    (printable as f64 / sample.len() as f64) < PRINTABLE_THRESHOLD
}

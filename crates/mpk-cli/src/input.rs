use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use mpk_decoder::{Source, Unpacker, UnpackerConfig};

/// Open one input. Files are owned by the unpacker and released with it;
/// stdin is borrowed and left open.
fn open_source(path: &Path) -> Result<Source<'static>> {
    if is_stdin(path) {
        return Ok(Source::from_stream(io::stdin().lock(), false));
    }
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Ok(Source::from_stream(BufReader::new(file), true))
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Chain `files` into a single unpacker, in order.
///
/// # Errors
///
/// Returns an error if `-` is given more than once, any file cannot be
/// opened, or `config` is invalid.
pub fn open_chain(files: &[PathBuf], config: UnpackerConfig) -> Result<Unpacker<'static>> {
    if files.iter().filter(|path| is_stdin(path)).count() > 1 {
        bail!("stdin (`-`) can only be given once");
    }
    let mut paths = files.iter();
    let first = paths.next().context("no input files given")?;
    let mut unpacker = Unpacker::from_source(open_source(first)?).with_config(config)?;
    for path in paths {
        unpacker.feed(open_source(path)?)?;
    }
    Ok(unpacker)
}

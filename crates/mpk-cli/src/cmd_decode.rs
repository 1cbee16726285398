/// Implementation of `mpk decode`.
///
/// Chains every input into one unpacker and prints each value on its own
/// line, in the chosen format. A value split across two files decodes as
/// one value.
///
/// # Output
///
/// ```text
/// $ mpk decode a.mpk b.mpk
/// {"id":1,"tags":["x"]}
/// {"id":2,"tags":[]}
/// ```
///
/// Bytes left over at the end that do not form a complete value are
/// reported on stderr; they do not fail the command.
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use mpk_types::TextEncoding;

use crate::input::open_chain;
use crate::json::to_json;
use crate::{DecodeArgs, OutputFormat, Settings};

/// Run the `mpk decode` command.
///
/// # Errors
///
/// Returns an error if an input cannot be opened, a value is corrupt,
/// a string is invalid in the chosen encoding, or an input fails to
/// close.
pub fn run(args: &DecodeArgs, settings: &Settings) -> Result<()> {
    let encoding: TextEncoding = args.encoding.parse()?;
    let mut unpacker = open_chain(&args.files, settings.config)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut count = 0usize;

    for value in unpacker.values() {
        let value = value.with_context(|| format!("decoding value #{count}"))?;
        match args.format {
            OutputFormat::Json => writeln!(out, "{}", to_json(&value, encoding)?)?,
            OutputFormat::Text => writeln!(out, "{value}")?,
            OutputFormat::Debug => writeln!(out, "{value:?}")?,
        }
        count += 1;
    }
    out.flush()?;

    let trailing = unpacker.buffered_len();
    if trailing > 0 {
        eprintln!("warning: {trailing} trailing byte(s) do not form a complete value");
    }
    tracing::debug!(count, trailing, "decode finished");

    unpacker.dispose().context("closing inputs")?;
    Ok(())
}

/// Implementation of `mpk validate`.
///
/// Decodes every value in the chained inputs and reports either a set of
/// success checkmarks (`✓`) or a diagnostic failure line (`✗`).
///
/// # Success output
///
/// ```text
/// ✓ Inputs: 2 sources chained
/// ✓ Values: 14 values decoded
/// ✓ Trailing: no partial value at end of input
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error: value #3: reserved marker 0xC1 at offset 0
/// ✗ Error: 5 trailing bytes do not form a complete value
/// ```
use anyhow::{Result, anyhow};
use mpk_decoder::UnpackError;

use crate::input::open_chain;
use crate::{Settings, ValidateArgs};

/// Run the `mpk validate` command.
///
/// # Errors
///
/// Returns an error if an input cannot be opened or any validation check
/// fails.
pub fn run(args: &ValidateArgs, settings: &Settings) -> Result<()> {
    let mut unpacker = open_chain(&args.files, settings.config)?;
    println!(
        "✓ Inputs: {} source{} chained",
        args.files.len(),
        if args.files.len() == 1 { "" } else { "s" }
    );

    let mut count = 0usize;
    for value in unpacker.values() {
        if let Err(e) = value {
            println!("✗ Error: value #{count}: {}", diagnostic(&e));
            return Err(anyhow!("validation failed"));
        }
        count += 1;
    }
    println!(
        "✓ Values: {count} value{} decoded",
        if count == 1 { "" } else { "s" }
    );

    let trailing = unpacker.buffered_len();
    if trailing > 0 {
        println!("✗ Error: {trailing} trailing bytes do not form a complete value");
        return Err(anyhow!("validation failed"));
    }
    println!("✓ Trailing: no partial value at end of input");

    unpacker.dispose()?;
    Ok(())
}

/// One-line description of a decode failure.
fn diagnostic(e: &UnpackError) -> String {
    match e {
        UnpackError::Io(inner) => format!("read failed: {inner}"),
        other => other.to_string(),
    }
}

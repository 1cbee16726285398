/// Implementation of `mpk encode`.
///
/// Reads a JSON document and packs it as MessagePack. Integers take the
/// narrowest wire form, other numbers become float64, and object keys
/// become str keys (sorted, as JSON objects are read unordered).
///
/// With `--each` the document must be an array; each element is packed
/// as its own top-level value, giving a stream that `mpk decode` prints
/// back one value per line.
use std::fs;

use anyhow::{Context, Result, bail};
use mpk_encoder::Packer;
use serde_json::Value as Json;

use crate::EncodeArgs;
use crate::json::from_json;

/// Run the `mpk encode` command.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, `--each` is
/// given with a non-array document, or the output cannot be written.
pub fn run(args: &EncodeArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let json: Json = serde_json::from_str(&text)
        .with_context(|| format!("invalid JSON in {}", args.input.display()))?;

    let mut packer = Packer::new();
    let count = if args.each {
        let Json::Array(items) = &json else {
            bail!("--each needs a top-level JSON array");
        };
        for item in items {
            packer.value(&from_json(item));
        }
        items.len()
    } else {
        packer.value(&from_json(&json));
        1
    };
    let bytes = packer.finish()?;

    fs::write(&args.output, &bytes)
        .with_context(|| format!("cannot write {}", args.output.display()))?;
    println!(
        "Wrote {count} value{} ({} bytes) to {}",
        if count == 1 { "" } else { "s" },
        bytes.len(),
        args.output.display()
    );
    Ok(())
}

//! The `encode` and `decode` subcommands.
//!
//! Each command takes its whole input as a string and returns its whole
//! output, so the I/O in `main` stays separate from the conversion.

use crate::config::{DecodeArgs, EncodeArgs};
use anyhow::Context;
use helios_xmldict::{NodeValue, from_xml_str, to_xml_string};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Reads the named file, or standard input when no file is given.
pub fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read standard input")?;
            Ok(input)
        }
    }
}

/// Parses `input` as JSON and returns it encoded as XML.
pub fn run_encode(args: &EncodeArgs, input: &str) -> anyhow::Result<String> {
    let value: NodeValue = serde_json::from_str(input).context("input is not valid JSON")?;
    let xml = to_xml_string(&args.root, &value, &args.options())
        .with_context(|| format!("failed to encode document as <{}>", args.root))?;
    info!(root = %args.root, bytes = xml.len(), "Encoded document");
    Ok(xml)
}

/// Parses `input` as XML and returns it decoded as JSON.
pub fn run_decode(args: &DecodeArgs, input: &str) -> anyhow::Result<String> {
    let value = from_xml_str(input, &args.options()).context("failed to decode XML")?;
    let json = if args.compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    info!(bytes = json.len(), "Decoded document");
    Ok(json)
}

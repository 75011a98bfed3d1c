//! Command-line configuration for the `xmldict` converter.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `XMLDICT_LOG_LEVEL` | warn | Log level |
//! | `XMLDICT_ENCODING` | UTF-8 | Encoding label for encoded output |
//!
//! # Example
//!
//! ```text
//! xmldict encode --root books --input books.json --xml-declaration
//! xmldict decode --input books.xml
//! ```

use clap::{Args, Parser, Subcommand};
use helios_xmldict::{DecodeOptions, EncodeOptions, WriteOptions};
use std::path::PathBuf;

/// Converts JSON documents to XML and back using the @attributes/@text/@cdata convention.
#[derive(Debug, Clone, Parser)]
#[command(name = "xmldict")]
#[command(about = "Convert between JSON documents and XML")]
pub struct CliConfig {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, env = "XMLDICT_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Read a JSON document and print it as XML.
    Encode(EncodeArgs),
    /// Read an XML document and print it as JSON.
    Decode(DecodeArgs),
}

#[derive(Debug, Clone, Args)]
pub struct EncodeArgs {
    /// Name of the root element.
    #[arg(short, long)]
    pub root: String,

    /// Input file; standard input when omitted.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Write all text as CDATA sections.
    #[arg(long)]
    pub force_cdata: bool,

    /// Disable indentation.
    #[arg(long)]
    pub compact: bool,

    /// Emit an XML declaration.
    #[arg(long)]
    pub xml_declaration: bool,

    /// Encoding label for the XML declaration.
    #[arg(long, env = "XMLDICT_ENCODING", default_value = "UTF-8")]
    pub encoding: String,
}

impl EncodeArgs {
    pub fn options(&self) -> EncodeOptions {
        EncodeOptions {
            force_cdata: self.force_cdata,
            write: WriteOptions {
                encoding: self.encoding.clone(),
                pretty_print: !self.compact,
                xml_declaration: self.xml_declaration,
            },
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct DecodeArgs {
    /// Input file; standard input when omitted.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Keep namespace declarations that repeat a binding already in scope.
    #[arg(long)]
    pub no_namespace_clean: bool,

    /// Keep whitespace-only text between child elements.
    #[arg(long)]
    pub keep_blank_text: bool,

    /// Print JSON on one line.
    #[arg(long)]
    pub compact: bool,
}

impl DecodeArgs {
    pub fn options(&self) -> DecodeOptions {
        DecodeOptions {
            namespace_clean: !self.no_namespace_clean,
            strip_blank_text: !self.keep_blank_text,
        }
    }
}

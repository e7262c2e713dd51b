//! Command-line configuration and execution for the `pbquery` binary.

use crate::PbQueryError;
use clap::{Parser, ValueEnum};
use pbquery_engine::compile;
use pbquery_engine::value::format_number;
use pbquery_json::{RenderOptions, document_from_json, message_to_json, value_to_json_with};
use pbquery_model::{DocumentValue, MessageNode, Scalar};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;

/// Evaluate an XPath-like query against a JSON document.
#[derive(Parser, Debug)]
#[command(name = "pbquery", version, about, long_about = None)]
pub struct CliArgs {
    /// The query to evaluate, e.g. `pet[2]/name`
    pub query: String,

    /// JSON document to query. Reads standard input when omitted.
    pub file: Option<PathBuf>,

    /// How each result is printed
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON value per line
    #[default]
    Json,
    /// Scalars as plain text, messages as compact JSON
    Text,
}

/// Reads the document text from the configured file or standard input.
pub fn read_input(args: &CliArgs) -> Result<String, PbQueryError> {
    match &args.file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

/// Parses `input`, evaluates the configured query, and formats every result.
pub fn run(args: &CliArgs, input: &str) -> Result<Vec<String>, PbQueryError> {
    let json: Value = serde_json::from_str(input)?;
    let document = document_from_json(&json)?;
    let query = compile(&args.query)?;
    let results = query.evaluate(document.root())?;
    log::info!("'{}' selected {} result(s)", args.query, results.len());

    let options = RenderOptions::default();
    results
        .iter()
        .map(|value| format_result(value, args, &options))
        .collect()
}

fn format_result<'a, M: MessageNode<'a>>(
    value: &DocumentValue<'a, M>,
    args: &CliArgs,
    options: &RenderOptions,
) -> Result<String, PbQueryError> {
    match (args.format, value) {
        (OutputFormat::Text, DocumentValue::Scalar(scalar)) => Ok(match scalar.as_ref() {
            Scalar::String(s) => s.clone(),
            Scalar::Number(n) => format_number(*n),
            Scalar::Boolean(b) => b.to_string(),
        }),
        (OutputFormat::Text, DocumentValue::Message(message)) => {
            Ok(serde_json::to_string(&message_to_json(*message, options))?)
        }
        (OutputFormat::Json, _) => {
            let json = value_to_json_with(value, options);
            if args.pretty {
                Ok(serde_json::to_string_pretty(&json)?)
            } else {
                Ok(serde_json::to_string(&json)?)
            }
        }
    }
}

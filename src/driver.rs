//! Newline-delimited JSON driver.
//!
//! Reads one [`ComparisonRequest`] per line, runs the rule chain and the
//! everything-replaced checks over the requested pair, and writes one
//! [`ComparisonResponse`] per line. A line that cannot be parsed or names
//! statements its models do not hold yields an error response; the loop
//! keeps going until the input closes.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chain::{classify, everything_replaced};
use crate::config::HeuristicsConfig;
use crate::error::{HeuristicsError, HeuristicsResult};
use crate::model::{MapperContext, PairContext, StatementId};
use crate::refactoring::ConditionalRefactoring;
use crate::replacement::{LeafMapping, Replacement, ReplacementInfo};

/// Maximum size of a single request line (10 MiB).
const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One statement pair to classify.
#[derive(Debug, Deserialize)]
pub struct ComparisonRequest {
    /// Echoed back on the response.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub mapper: MapperContext,
    pub statement1: StatementId,
    pub statement2: StatementId,
    /// Side 1 text after the caller's replacements. Defaults to the
    /// statement text.
    #[serde(default)]
    pub text1: Option<String>,
    #[serde(default)]
    pub text2: Option<String>,
    /// Statement texts with arguments substituted for parameters. Default
    /// to `text1`/`text2`.
    #[serde(default)]
    pub argumentized1: Option<String>,
    #[serde(default)]
    pub argumentized2: Option<String>,
    /// Unmatched statements of each side.
    #[serde(default)]
    pub unmatched1: Vec<StatementId>,
    #[serde(default)]
    pub unmatched2: Vec<StatementId>,
    /// Replacements the caller already found for this pair.
    #[serde(default)]
    pub replacements: Vec<Replacement>,
    #[serde(default)]
    pub config: HeuristicsConfig,
}

/// Outcome of one comparison.
#[derive(Debug, Default, Serialize)]
pub struct ComparisonResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    /// Accepted by a rule and not rejected by an everything-replaced check.
    pub equivalent: bool,
    /// Name of the accepting rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Name of the everything-replaced check that rejected the pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub everything_replaced: Option<String>,
    pub replacements: Vec<Replacement>,
    pub sub_expression_mappings: Vec<LeafMapping>,
    pub refactorings: Vec<ConditionalRefactoring>,
    /// Previously accepted refactorings this comparison supersedes.
    pub retracted: Vec<ConditionalRefactoring>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComparisonResponse {
    fn failure(id: Option<serde_json::Value>, message: impl Into<String>) -> Self {
        Self {
            id,
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Classify the pair named by `request`.
///
/// Both models are validated first, so every rule runs over an arena whose
/// ids all resolve.
pub fn compare(request: ComparisonRequest) -> HeuristicsResult<ComparisonResponse> {
    let ComparisonRequest {
        id,
        mapper,
        statement1,
        statement2,
        text1,
        text2,
        argumentized1,
        argumentized2,
        unmatched1,
        unmatched2,
        replacements,
        config,
    } = request;
    mapper.model1.validate()?;
    mapper.model2.validate()?;
    let fragment1 = mapper.model1.statement(statement1)?;
    let fragment2 = mapper.model2.statement(statement2)?;

    let s1 = text1.unwrap_or_else(|| fragment1.text.clone());
    let s2 = text2.unwrap_or_else(|| fragment2.text.clone());
    let mut info = ReplacementInfo::new(
        argumentized1.unwrap_or_else(|| s1.clone()),
        argumentized2.unwrap_or_else(|| s2.clone()),
        unmatched1,
        unmatched2,
    );
    info.add_all(replacements);

    let ctx = PairContext::new(&mapper, statement1, statement2, &config);
    let rule = classify(&s1, &s2, &ctx, &mut info);
    let rejected = rule.and_then(|_| everything_replaced(&ctx, &info));

    Ok(ComparisonResponse {
        id,
        equivalent: rule.is_some() && rejected.is_none(),
        rule: rule.map(str::to_owned),
        everything_replaced: rejected.map(str::to_owned),
        replacements: info.replacements().to_vec(),
        sub_expression_mappings: info.sub_expression_mappings().to_vec(),
        refactorings: info.refactorings().to_vec(),
        retracted: info.retracted().to_vec(),
        error: None,
    })
}

/// Handle one request line. Never fails: problems become error responses.
pub fn handle_line(line: &str) -> ComparisonResponse {
    let request: ComparisonRequest = match serde_json::from_str(line).map_err(HeuristicsError::from) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "invalid comparison request");
            return ComparisonResponse::failure(None, e.to_string());
        }
    };
    let id = request.id.clone();
    match compare(request) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "comparison failed");
            ComparisonResponse::failure(id, e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

/// Run the driver on stdin/stdout until stdin closes.
pub fn run_stdio() -> Result<()> {
    let stdin = std::io::stdin();
    let reader = std::io::BufReader::new(stdin.lock());
    let stdout = std::io::stdout().lock();
    run(reader, stdout)
}

/// Run the driver over any line source and sink.
pub fn run(mut reader: impl BufRead, mut out: impl Write) -> Result<()> {
    info!("stmt-equiv driver starting");
    let mut line_buf = Vec::new();
    let mut handled = 0usize;

    loop {
        line_buf.clear();
        let response = match read_line_limited(&mut reader, &mut line_buf, MAX_LINE_BYTES)? {
            ReadOutcome::Eof => break,
            ReadOutcome::Oversized => {
                warn!(limit = MAX_LINE_BYTES, "request line too long");
                ComparisonResponse::failure(None, format!("line exceeds maximum size ({MAX_LINE_BYTES} bytes)"))
            }
            ReadOutcome::Line => match std::str::from_utf8(&line_buf) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    handle_line(trimmed)
                }
                Err(e) => {
                    warn!(error = %e, "request line is not UTF-8");
                    ComparisonResponse::failure(None, format!("non-UTF-8 data on input: {e}"))
                }
            },
        };
        write_response(&mut out, &response)?;
        handled += 1;
    }

    info!(handled, "input closed, driver stopped");
    Ok(())
}

fn write_response(out: &mut impl Write, resp: &ComparisonResponse) -> Result<()> {
    let json = serde_json::to_string(resp).context("failed to serialize response")?;
    debug!(response = json, "sending response");
    out.write_all(json.as_bytes()).context("failed to write response")?;
    out.write_all(b"\n").context("failed to write newline")?;
    out.flush().context("failed to flush output")?;
    Ok(())
}

enum ReadOutcome {
    Eof,
    Line,
    /// The line was longer than the limit; it was consumed and discarded.
    Oversized,
}

/// Read a line of raw bytes from `reader` into `buf`, stopping at newline
/// or `max_bytes`. Decoding is left to the caller so that a character split
/// across buffer refills stays intact.
fn read_line_limited(reader: &mut impl BufRead, buf: &mut Vec<u8>, max_bytes: usize) -> Result<ReadOutcome> {
    let mut total = 0usize;
    loop {
        let available = reader.fill_buf().context("input fill_buf failed")?;
        if available.is_empty() {
            return Ok(if total == 0 { ReadOutcome::Eof } else { ReadOutcome::Line });
        }
        let (consumed, found_newline) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        if total + consumed > max_bytes {
            reader.consume(consumed);
            if !found_newline {
                skip_rest_of_line(reader)?;
            }
            buf.clear();
            return Ok(ReadOutcome::Oversized);
        }
        buf.extend_from_slice(&available[..consumed]);
        total += consumed;
        reader.consume(consumed);
        if found_newline {
            return Ok(ReadOutcome::Line);
        }
    }
}

fn skip_rest_of_line(reader: &mut impl BufRead) -> Result<()> {
    loop {
        let rest = reader.fill_buf().context("input fill_buf failed")?;
        if rest.is_empty() {
            return Ok(());
        }
        if let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            reader.consume(pos + 1);
            return Ok(());
        }
        let len = rest.len();
        reader.consume(len);
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Cursor};

    use serde_json::{Value, json};

    use super::*;

    fn request(s1: &str, s2: &str) -> Value {
        json!({
            "id": 7,
            "mapper": {
                "model1": { "statements": [{ "text": s1 }] },
                "model2": { "statements": [{ "text": s2 }] }
            },
            "statement1": 0,
            "statement2": 0
        })
    }

    fn run_lines(input: &str) -> Vec<Value> {
        let mut out = Vec::new();
        run(Cursor::new(input.as_bytes().to_vec()), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_accepted_pair() {
        let response = handle_line(&request("x=(a+b);\n", "x=a+b;\n").to_string());
        assert!(response.equivalent);
        assert_eq!(response.rule.as_deref(), Some("parenthesis elimination"));
        assert_eq!(response.id, Some(json!(7)));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_unknown_statement_is_an_error_response() {
        let mut req = request("a;\n", "b;\n");
        req["statement2"] = json!(5);
        let response = handle_line(&req.to_string());
        assert!(!response.equivalent);
        assert_eq!(response.id, Some(json!(7)));
        assert!(response.error.unwrap().contains("unknown statement id 5"));
    }

    #[test]
    fn test_malformed_line_keeps_loop_running() {
        let input = format!("not json\n\n{}\n", request("x=(a);\n", "x=a;\n"));
        let responses = run_lines(&input);
        assert_eq!(responses.len(), 2);
        assert!(responses[0]["error"].as_str().unwrap().starts_with("JSON error"));
        assert_eq!(responses[1]["equivalent"], json!(true));
        assert_eq!(responses[1]["rule"], json!("parenthesis elimination"));
    }

    #[test]
    fn test_multibyte_character_across_refills() {
        let input = format!("{}\n", request("s = \"é\";\n", "s = \"é\";\n"));
        // one byte per refill splits the two bytes of "é"
        let reader = BufReader::with_capacity(1, input.as_bytes());
        let mut out = Vec::new();
        run(reader, &mut out).unwrap();
        let response: Value = serde_json::from_slice(&out).unwrap();
        assert!(response.get("error").is_none());
        assert_eq!(response["equivalent"], json!(true));
    }

    #[test]
    fn test_invalid_utf8_line_is_answered() {
        let mut input = b"\xff\xfe\n".to_vec();
        input.extend_from_slice(format!("{}\n", request("x=(a);\n", "x=a;\n")).as_bytes());
        let mut out = Vec::new();
        run(Cursor::new(input), &mut out).unwrap();
        let responses: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 2);
        assert!(responses[0]["error"].as_str().unwrap().starts_with("non-UTF-8"));
        assert_eq!(responses[1]["equivalent"], json!(true));
    }

    #[test]
    fn test_oversized_line_is_skipped() {
        let mut reader = Cursor::new(b"0123456789\n{}\n".to_vec());
        let mut buf = Vec::new();
        assert!(matches!(
            read_line_limited(&mut reader, &mut buf, 4).unwrap(),
            ReadOutcome::Oversized
        ));
        assert!(matches!(read_line_limited(&mut reader, &mut buf, 4).unwrap(), ReadOutcome::Line));
        assert_eq!(buf, b"{}\n");
        buf.clear();
        assert!(matches!(read_line_limited(&mut reader, &mut buf, 4).unwrap(), ReadOutcome::Eof));
    }
}

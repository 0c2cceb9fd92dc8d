//! Newline-delimited JSON reader for `/analyze/stream`.
//!
//! Each line is one event: `{"type":"progress",...}`, `{"type":"result",
//! "data":{...}}` or `{"type":"error","message":...}`. When `type` is
//! missing the shape decides. The first result ends the read; a stream that
//! ends without one is a protocol error.

use std::sync::mpsc;

use bytes::{Bytes, BytesMut};
use checker_core::AnalysisResult;
use checker_logging::checker_debug;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::types::{ApiError, ClientEvent, ProgressUpdate};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, update: ProgressUpdate);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<ClientEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<ClientEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, update: ProgressUpdate) {
        let _ = self.tx.send(ClientEvent::Progress(update));
    }
}

/// Discards progress; used for the non-streaming endpoint.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _update: ProgressUpdate) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Progress(ProgressUpdate),
    Result(Box<AnalysisResult>),
    Error { message: String },
}

/// Longest event line accepted by default.
pub const DEFAULT_MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// Splits a byte stream into lines. Chunks may end anywhere, including in
/// the middle of a UTF-8 sequence.
#[derive(Debug)]
pub struct LineDecoder {
    buffer: BytesMut,
    scanned: usize,
    max_line_bytes: usize,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::with_max_line_bytes(DEFAULT_MAX_LINE_BYTES)
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self {
            buffer: BytesMut::new(),
            scanned: 0,
            max_line_bytes: max_line_bytes.max(1),
        }
    }

    /// Appends a chunk and returns every complete, non-blank line, without
    /// the trailing `\n` or `\r\n`. Fails once a line, complete or not,
    /// grows past the limit.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Bytes>, ApiError> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            let end = self.scanned + offset;
            self.check_len(end)?;
            let mut line = self.buffer.split_to(end + 1);
            self.scanned = 0;
            line.truncate(end);
            if line.last() == Some(&b'\r') {
                line.truncate(end - 1);
            }
            if !is_blank(&line) {
                lines.push(line.freeze());
            }
        }
        self.scanned = self.buffer.len();
        self.check_len(self.buffer.len())?;
        Ok(lines)
    }

    /// Returns the unterminated tail, if any, once the stream has ended.
    pub fn finish(&mut self) -> Option<Bytes> {
        let rest = self.buffer.split();
        self.scanned = 0;
        (!is_blank(&rest)).then(|| rest.freeze())
    }

    fn check_len(&self, len: usize) -> Result<(), ApiError> {
        if len > self.max_line_bytes {
            return Err(ApiError::StreamProtocol(format!(
                "event line exceeds {} bytes",
                self.max_line_bytes
            )));
        }
        Ok(())
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

pub fn decode_event(line: &[u8]) -> Result<StreamEvent, ApiError> {
    let value: Value = serde_json::from_slice(line)
        .map_err(|err| ApiError::StreamProtocol(format!("malformed event: {err}")))?;
    if !value.is_object() {
        return Err(ApiError::StreamProtocol(format!(
            "expected a JSON object, got {value}"
        )));
    }

    let kind = value.get("type").and_then(Value::as_str).map(str::to_owned);
    match kind.as_deref() {
        Some("progress") => decode_progress(value),
        Some("result") => decode_result(value),
        Some("error") => Ok(decode_error(&value)),
        Some(other) => Err(ApiError::StreamProtocol(format!(
            "unknown event type {other:?}"
        ))),
        None if value.get("data").is_some() => decode_result(value),
        None if value.get("step").is_some() => decode_progress(value),
        None if value.get("error").is_some() || value.get("detail").is_some() => {
            Ok(decode_error(&value))
        }
        None => Err(ApiError::StreamProtocol(format!(
            "unrecognised event {value}"
        ))),
    }
}

fn decode_progress(value: Value) -> Result<StreamEvent, ApiError> {
    serde_json::from_value(value)
        .map(StreamEvent::Progress)
        .map_err(|err| ApiError::StreamProtocol(format!("bad progress event: {err}")))
}

fn decode_result(mut value: Value) -> Result<StreamEvent, ApiError> {
    let data = value
        .get_mut("data")
        .map(Value::take)
        .ok_or_else(|| ApiError::StreamProtocol("result event without data".to_string()))?;
    serde_json::from_value(data)
        .map(|result| StreamEvent::Result(Box::new(result)))
        .map_err(|err| ApiError::StreamProtocol(format!("bad result payload: {err}")))
}

fn decode_error(value: &Value) -> StreamEvent {
    let message = ["message", "error", "detail"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .unwrap_or("the server reported an error")
        .to_string();
    StreamEvent::Error { message }
}

/// Reads events until the result arrives. Progress goes to `sink`; the
/// token aborts the read between chunks. A line longer than
/// `max_line_bytes` is a protocol error.
pub async fn read_analysis_stream<S>(
    chunks: S,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
    max_line_bytes: usize,
) -> Result<AnalysisResult, ApiError>
where
    S: Stream<Item = Result<Bytes, ApiError>>,
{
    let mut chunks = std::pin::pin!(chunks);
    let mut decoder = LineDecoder::with_max_line_bytes(max_line_bytes);

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ApiError::Cancelled),
            next = chunks.next() => next,
        };
        let Some(chunk) = next else {
            break;
        };
        for line in decoder.push(&chunk?)? {
            if let Some(result) = handle_line(&line, sink)? {
                return Ok(result);
            }
        }
    }

    if let Some(line) = decoder.finish() {
        if let Some(result) = handle_line(&line, sink)? {
            return Ok(result);
        }
    }
    Err(ApiError::StreamProtocol(
        "stream ended before the analysis result arrived".to_string(),
    ))
}

fn handle_line(line: &[u8], sink: &dyn ProgressSink) -> Result<Option<AnalysisResult>, ApiError> {
    match decode_event(line)? {
        StreamEvent::Progress(update) => {
            checker_debug!(
                "step {}/{} {:?}: {}",
                update.step,
                update.total_steps,
                update.status,
                update.message
            );
            sink.emit(update);
            Ok(None)
        }
        StreamEvent::Result(result) => Ok(Some(*result)),
        StreamEvent::Error { message } => Err(ApiError::StreamServer(message)),
    }
}

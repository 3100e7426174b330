// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (scripts), and JSON output modes.

use serde::Serialize;
use serde_json::value::RawValue;
use std::io::Write;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Progress messages followed by the response body
    Normal,
    /// Only the response body
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet mode).
    pub fn progress(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => println!("{message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => emit(
                &mut std::io::stdout(),
                &JsonEvent::new("progress", message, None),
            ),
        }
    }

    /// Print the server's response body unchanged.
    pub fn result(&self, body: &[u8]) {
        let mut stdout = std::io::stdout().lock();
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                let _ = stdout.write_all(body);
                let _ = stdout.write_all(b"\n");
                let _ = stdout.flush();
            }
            OutputMode::Json => {
                let text = String::from_utf8_lossy(body);
                let mut event = JsonEvent::new("result", "command completed", self.duration());
                event.body = Some(ResultBody::from_text(&text));
                emit(&mut stdout, &event);
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => emit(
                &mut std::io::stderr(),
                &JsonEvent::new("error", message, self.duration()),
            ),
        }
    }
}

fn emit(out: &mut impl Write, event: &JsonEvent<'_>) {
    if let Ok(json) = serde_json::to_string(event) {
        let _ = writeln!(out, "{json}");
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<ResultBody<'a>>,
}

/// Response body inside a JSON event: embedded as-is when it is JSON, as a
/// string otherwise.
#[derive(Serialize)]
#[serde(untagged)]
enum ResultBody<'a> {
    Json(&'a RawValue),
    Text(&'a str),
}

impl<'a> ResultBody<'a> {
    fn from_text(text: &'a str) -> Self {
        match serde_json::from_str::<&RawValue>(text) {
            Ok(raw) => ResultBody::Json(raw),
            Err(_) => ResultBody::Text(text),
        }
    }
}

impl<'a> JsonEvent<'a> {
    fn new(event: &'a str, message: &'a str, duration_secs: Option<f64>) -> Self {
        Self {
            event,
            message,
            duration_secs,
            body: None,
        }
    }
}

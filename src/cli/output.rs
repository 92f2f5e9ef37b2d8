use console::style;
use serde::Serialize;

use crate::error::{RepoError, Result, StructuredError};

/// Envelope for `--json` output on stdout.
#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub status: JsonStatus,
    pub version: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonStatus {
    Ok,
    /// The run finished but some add-ons were left out.
    Partial { completed: usize, failed: usize },
    Error(StructuredError),
}

pub fn json_ok<T: Serialize>(data: T) -> JsonResponse<T> {
    JsonResponse {
        status: JsonStatus::Ok,
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
    }
}

/// `Ok` when nothing failed, `Partial` otherwise.
pub fn json_outcome<T: Serialize>(data: T, completed: usize, failed: usize) -> JsonResponse<T> {
    let status = if failed == 0 {
        JsonStatus::Ok
    } else {
        JsonStatus::Partial { completed, failed }
    };
    JsonResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
    }
}

pub fn json_error(err: &RepoError) -> JsonResponse<serde_json::Value> {
    JsonResponse {
        status: JsonStatus::Error(err.to_structured()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data: serde_json::Value::Null,
    }
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 16,
        }
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push("-".repeat(text.len().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let key = format!("{key:width$}", width = self.key_width);
        self.lines.push(format!("{} {value}", style(key).dim()));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn failure(&mut self, addon: &str, message: &str) -> &mut Self {
        self.lines
            .push(format!("{} {addon}: {message}", style("✗").red()));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

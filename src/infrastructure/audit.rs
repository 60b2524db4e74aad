use crate::domain::ports::{AuditEvent, AuditSink};
use crate::error::Result;
use async_trait::async_trait;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Emits audit events as structured log records on the `audit` target.
///
/// The default sink for development: events land in the same stream as the
/// rest of the application logs.
#[derive(Default, Clone, Copy)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        tracing::info!(
            target: "audit",
            event = %event.name,
            meta = %serde_json::Value::Object(event.meta),
            at = %event.at.to_rfc3339(),
        );
        Ok(())
    }
}

/// Append-only audit file writer. Writes JSON Lines (one event per line).
pub struct JsonlAuditSink {
    file: Mutex<File>,
}

impl JsonlAuditSink {
    /// Opens the audit file for appending, creating it and its parent
    /// directories if needed.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        let line = serde_json::to_string(&event)?;
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(file, "{line}")?;
        Ok(())
    }
}

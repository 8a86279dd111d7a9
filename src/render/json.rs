//! JSON lines render sink

use super::{RenderMode, RenderSink};
use crate::error::Result;
use crate::feed::{FeedItem, ProfileSummary};
use crate::pagination::FailureReason;
use serde_json::json;
use std::io::Write;

/// Writes one JSON object per event: `profile`, `item` or `failure`
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Items written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, value: &serde_json::Value) -> Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> RenderSink for JsonLinesSink<W> {
    fn render_profile(&mut self, profile: Option<&ProfileSummary>) -> Result<()> {
        self.write_line(&json!({ "type": "profile", "profile": profile }))
    }

    fn render_feed(&mut self, items: &[FeedItem], mode: RenderMode) -> Result<()> {
        for item in items {
            self.write_line(&json!({ "type": "item", "mode": mode, "item": item }))?;
            self.written += 1;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn render_failure(&mut self, reason: &FailureReason) -> Result<()> {
        self.write_line(&json!({ "type": "failure", "reason": reason.to_string() }))
    }
}

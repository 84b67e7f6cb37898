//! Chat transport seam
//!
//! The request handler talks to the chat platform only through
//! [`ChatTransport`]: send a message, then edit it in place. A scan sends a
//! "scanning" placeholder first and replaces it with the final report.

use async_trait::async_trait;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::models::{AppError, AppResult, RenderedOutput};

/// Opaque conversation handle supplied by the transport
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatHandle(pub String);

/// A message previously sent by the transport, so it can be edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub chat: ChatHandle,
    pub message_id: u64,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, chat: &ChatHandle, output: &RenderedOutput) -> AppResult<MessageRef>;

    async fn edit_message(&self, message: &MessageRef, output: &RenderedOutput) -> AppResult<()>;
}

/// Line-oriented transport writing to any `Write` sink (stdout in the CLI)
pub struct ConsoleTransport<W: Write + Send> {
    out: Mutex<W>,
    next_id: AtomicU64,
}

impl<W: Write + Send> ConsoleTransport<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_block(&self, header: &str, output: &RenderedOutput) -> AppResult<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| AppError::transport("console writer poisoned"))?;

        writeln!(out, "{}", header)?;
        for line in output.text.lines() {
            writeln!(out, "  {}", line)?;
        }
        for link in &output.links {
            writeln!(out, "  [{}] {}", link.label, link.url)?;
        }
        out.flush()?;
        Ok(())
    }
}

#[async_trait]
impl<W: Write + Send> ChatTransport for ConsoleTransport<W> {
    async fn send_message(&self, chat: &ChatHandle, output: &RenderedOutput) -> AppResult<MessageRef> {
        let message_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.write_block(&format!("[{} #{}]", chat.0, message_id), output)?;
        Ok(MessageRef {
            chat: chat.clone(),
            message_id,
        })
    }

    async fn edit_message(&self, message: &MessageRef, output: &RenderedOutput) -> AppResult<()> {
        self.write_block(
            &format!("[{} #{} edited]", message.chat.0, message.message_id),
            output,
        )
    }
}

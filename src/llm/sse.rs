/// Accumulates raw SSE bytes and hands out complete event blocks.
#[derive(Debug, Default)]
pub struct SseBuffer {
    buffer: String,
}

impl SseBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_chunk(&mut self, chunk: &[u8]) {
        let text = String::from_utf8_lossy(chunk);
        // Normalize CRLF framing so block boundaries are always "\n\n".
        self.buffer.push_str(&text.replace("\r\n", "\n"));
    }

    pub fn next_event_block(&mut self) -> Option<String> {
        let boundary = self.buffer.find("\n\n")?;
        let remaining = self.buffer.split_off(boundary + 2);
        Some(std::mem::replace(&mut self.buffer, remaining))
    }

    /// Whatever is left once the byte stream has ended.
    pub fn take_remainder(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest)
        }
    }
}

/// `data:` payloads of one event block, without the `[DONE]` sentinel.
pub fn data_payloads(event_block: &str) -> Vec<&str> {
    event_block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim_start)
        .filter(|data| *data != "[DONE]")
        .collect()
}

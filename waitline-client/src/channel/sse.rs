//! Incremental SSE frame parser
//!
//! Feeds raw transport chunks and yields complete event frames. Handles
//! frames split across chunk boundaries, multi-line `data:` fields, comment
//! lines and CRLF line endings. The server either sends the whole JSON
//! frame as `data:` or names the tag in an `event:` field with the payload
//! in `data:`; both encodings decode to the same [`EventFrame`].

use shared::events::EventFrame;

#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event_name: Option<String>,
    data_lines: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a transport chunk, returning any frames it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<EventFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(frame) = self.process_line(line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn process_line(&mut self, line: &str) -> Option<EventFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            // comment / keep-alive padding
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event_name = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            // id / retry are not used by this protocol
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<EventFrame> {
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        let event_name = self.event_name.take();

        if data.is_empty() {
            // An event: field alone still names a payload-less event.
            return event_name.map(EventFrame::new);
        }

        // Whole frame encoded in the data payload.
        if let Ok(frame) = EventFrame::from_json(&data) {
            return Some(frame);
        }

        // Tag in the event field, payload in data.
        if let Some(name) = event_name {
            let payload = serde_json::from_str(&data).ok();
            return Some(EventFrame {
                event: name,
                data: payload,
            });
        }

        tracing::warn!("Dropping unparseable notification frame: {data}");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_frame_in_data() {
        let mut parser = SseParser::new();
        let frames = parser.feed(b"data: {\"event\":\"entry_created\"}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "entry_created");
    }

    #[test]
    fn test_event_field_with_payload() {
        let mut parser = SseParser::new();
        let frames = parser.feed(b"event: lane_closed\ndata: {\"lane_id\":\"l-1\"}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "lane_closed");
        assert_eq!(
            frames[0].data.as_ref().unwrap()["lane_id"],
            serde_json::json!("l-1")
        );
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: {\"event\":\"pi").is_empty());
        let frames = parser.feed(b"ng\"}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "ping");
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut parser = SseParser::new();
        let frames = parser
            .feed(b"data: {\"event\":\"ping\"}\n\ndata: {\"event\":\"order_changed\"}\n\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event, "ping");
        assert_eq!(frames[1].event, "order_changed");
    }

    #[test]
    fn test_comments_and_crlf_ignored() {
        let mut parser = SseParser::new();
        let frames = parser.feed(b": keep-alive\r\ndata: {\"event\":\"ping\"}\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "ping");
    }

    #[test]
    fn test_bare_event_field() {
        let mut parser = SseParser::new();
        let frames = parser.feed(b"event: ping\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "ping");
        assert!(frames[0].data.is_none());
    }
}

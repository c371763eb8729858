//! Incremental line-delimited JSON parsing.
//!
//! The scraper's stdout arrives as arbitrary chunks; records must come out
//! identical regardless of where the chunk boundaries fall. Bytes are
//! buffered until a newline, so a multi-byte character split across chunks
//! is never mis-decoded.

use serde_json::Value;
use tracing::info;

use vodsync_core::RawVideo;

use crate::error::{Result, ScrapeError};

/// Reassembles chunked scraper output into parsed records.
pub struct LineAssembler {
    buffer: Vec<u8>,
    videos: Vec<RawVideo>,
    progress_interval: u64,
}

impl LineAssembler {
    pub fn new(progress_interval: u64) -> Self {
        Self {
            buffer: Vec::new(),
            videos: Vec::new(),
            progress_interval: progress_interval.max(1),
        }
    }

    /// Feed one chunk. Every complete line in the buffer is trimmed and, if
    /// non-empty, parsed as one JSON record. A parse failure is fatal for
    /// the run: the caller must kill the child and abort.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(chunk);

        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            self.parse_line(&line[..newline])?;
        }
        Ok(())
    }

    /// Flush the trailing buffer (a final record without a newline) and
    /// return everything parsed, in arrival order.
    pub fn finish(mut self) -> Result<Vec<RawVideo>> {
        let trailing = std::mem::take(&mut self.buffer);
        self.parse_line(&trailing)?;
        Ok(self.videos)
    }

    /// Records parsed so far.
    pub fn parsed(&self) -> usize {
        self.videos.len()
    }

    fn parse_line(&mut self, line: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(line)
            .map_err(|e| ScrapeError::Parse { message: format!("output is not UTF-8: {e}") })?
            .trim();
        if text.is_empty() {
            return Ok(());
        }

        let video: RawVideo = serde_json::from_str(text)
            .map_err(|e| ScrapeError::Parse { message: e.to_string() })?;
        self.log_progress(&video);
        self.videos.push(video);
        Ok(())
    }

    fn log_progress(&self, video: &RawVideo) {
        let count = self.videos.len() as u64 + 1;
        if count % self.progress_interval != 0 {
            return;
        }
        let label: Vec<&str> = ["title", "id"]
            .iter()
            .filter_map(|key| video.get(*key).and_then(Value::as_str))
            .collect();
        info!(parsed = count, latest = %label.join(" / "), "Parsed entries");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(videos: &[RawVideo]) -> Vec<String> {
        videos
            .iter()
            .map(|v| v.get("id").and_then(Value::as_str).unwrap().to_string())
            .collect()
    }

    fn assemble(chunks: &[&[u8]]) -> Result<Vec<RawVideo>> {
        let mut assembler = LineAssembler::new(25);
        for chunk in chunks {
            assembler.push_chunk(chunk)?;
        }
        assembler.finish()
    }

    #[test]
    fn chunk_boundaries_do_not_matter() {
        let stream = b"{\"id\":\"one\"}\n{\"id\":\"two\"}\n{\"id\":\"three\"}\n";

        let whole = assemble(&[stream]).unwrap();
        for split in 1..stream.len() {
            let (a, b) = stream.split_at(split);
            let pieces = assemble(&[a, b]).unwrap();
            assert_eq!(ids(&pieces), ids(&whole), "split at byte {split}");
        }
        assert_eq!(ids(&whole), vec!["one", "two", "three"]);
    }

    #[test]
    fn multibyte_characters_split_across_chunks() {
        let stream = "{\"id\":\"vidéo\"}\n".as_bytes();
        // Split inside the two-byte 'é'.
        let split = stream.iter().position(|&b| b == 0xc3).unwrap() + 1;
        let (a, b) = stream.split_at(split);
        let videos = assemble(&[a, b]).unwrap();
        assert_eq!(ids(&videos), vec!["vidéo"]);
    }

    #[test]
    fn blank_and_whitespace_lines_are_skipped() {
        let videos = assemble(&[b"\n  \n{\"id\":\"a\"}\n\n"]).unwrap();
        assert_eq!(ids(&videos), vec!["a"]);
    }

    #[test]
    fn trailing_record_without_newline_is_flushed() {
        let videos = assemble(&[b"{\"id\":\"a\"}\n{\"id\":\"tail\"}"]).unwrap();
        assert_eq!(ids(&videos), vec!["a", "tail"]);
    }

    #[test]
    fn malformed_line_is_fatal() {
        let mut assembler = LineAssembler::new(25);
        let err = assembler.push_chunk(b"{\"id\":\"ok\"}\nnot json\n").unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { .. }));
    }

    #[test]
    fn malformed_trailing_buffer_is_fatal() {
        let mut assembler = LineAssembler::new(25);
        assembler.push_chunk(b"{\"id\":\"ok\"}\n{\"truncat").unwrap();
        let err = assembler.finish().unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { .. }));
    }

    #[test]
    fn non_object_line_is_rejected() {
        let mut assembler = LineAssembler::new(25);
        let err = assembler.push_chunk(b"42\n").unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { .. }));
    }
}

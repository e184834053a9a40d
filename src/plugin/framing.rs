//! Response reassembly for the plugin socket.
//!
//! The plugin writes one JSON document per response with no delimiter and no
//! length prefix. A response is complete once a JSON value can be decoded from
//! the start of the accumulated bytes. Decoding is only attempted when the
//! buffer (ignoring trailing whitespace) ends in `}`, which keeps large
//! multi-chunk responses from being re-parsed on every read.
//!
//! The `}` rule is what the plugin peer relies on and must stay as is.

use std::io::{self, Read};

use serde_json::Value;

use crate::plugin::error::{PluginError, PluginResult};

/// Size of a single socket read.
pub const CHUNK_SIZE: usize = 8192;

/// Accumulates raw response bytes until they hold a complete JSON value.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    bytes: Vec<u8>,
}

impl ResponseBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Returns `true` if no bytes have been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the number of bytes received so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Appends a chunk and returns the decoded value if the response is now complete.
    pub fn push(&mut self, chunk: &[u8]) -> Option<Value> {
        self.bytes.extend_from_slice(chunk);
        if !self.ends_with_closing_brace() {
            return None;
        }
        self.decode()
    }

    /// Attempts a prefix-tolerant decode of everything received so far.
    ///
    /// Succeeds when a complete JSON value starts the buffer; trailing bytes
    /// after that value are ignored.
    #[must_use]
    pub fn decode(&self) -> Option<Value> {
        let mut values = serde_json::Deserializer::from_slice(&self.bytes).into_iter::<Value>();
        match values.next() {
            Some(Ok(value)) => Some(value),
            _ => None,
        }
    }

    fn ends_with_closing_brace(&self) -> bool {
        self.bytes
            .iter()
            .rev()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|&b| b == b'}')
    }
}

/// Reads one complete response from `reader`.
///
/// `reader` is expected to carry a read deadline (see
/// [`std::net::TcpStream::set_read_timeout`]). When the deadline expires the
/// loop stops waiting and makes one last decode attempt on what has arrived.
///
/// # Errors
///
/// - [`PluginError::EmptyResponse`] if the peer closes before sending anything
/// - [`PluginError::MalformedResponse`] if the peer closes mid-document
/// - [`PluginError::Timeout`] if the deadline expires without a complete document
/// - [`PluginError::ConnectionLost`] / [`PluginError::Communication`] on other I/O faults
pub fn receive_full_response<R: Read>(
    reader: &mut R,
    plugin: &'static str,
    timeout_secs: f64,
) -> PluginResult<Value> {
    let mut buffer = ResponseBuffer::new();
    let mut chunk = vec![0_u8; CHUNK_SIZE];
    let mut timed_out = false;

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => {
                if buffer.is_empty() {
                    return Err(PluginError::EmptyResponse { plugin });
                }
                break;
            }
            Ok(n) => {
                if let Some(value) = buffer.push(&chunk[..n]) {
                    tracing::debug!(bytes = buffer.len(), "Received complete response");
                    return Ok(value);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_timeout(&e) => {
                tracing::warn!(bytes = buffer.len(), "Socket timeout during chunked receive");
                timed_out = true;
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, "Socket error during receive");
                return Err(PluginError::from_io(plugin, timeout_secs, e));
            }
        }
    }

    tracing::debug!(bytes = buffer.len(), "Receive finished, attempting final decode");
    if let Some(value) = buffer.decode() {
        return Ok(value);
    }

    if timed_out {
        Err(PluginError::Timeout {
            plugin,
            timeout_secs,
        })
    } else {
        Err(PluginError::MalformedResponse {
            plugin,
            message: "incomplete JSON response received".to_string(),
        })
    }
}

fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;

    /// A reader that replays scripted chunks and errors, then reports EOF.
    struct ScriptedReader {
        steps: VecDeque<io::Result<Vec<u8>>>,
        reads: usize,
    }

    impl ScriptedReader {
        fn new(steps: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                steps: steps.into(),
                reads: 0,
            }
        }

        fn chunks(chunks: &[&[u8]]) -> Self {
            Self::new(chunks.iter().map(|c| Ok(c.to_vec())).collect())
        }
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            match self.steps.pop_front() {
                None => Ok(0),
                Some(Err(e)) => Err(e),
                Some(Ok(chunk)) => {
                    assert!(chunk.len() <= buf.len(), "scripted chunk larger than read buffer");
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
            }
        }
    }

    #[test]
    fn single_chunk() {
        let mut reader = ScriptedReader::chunks(&[br#"{"status":"success","result":{"id":"123"}}"#]);
        let value = receive_full_response(&mut reader, "Rhino", 15.0).unwrap();
        assert_eq!(value, json!({"status": "success", "result": {"id": "123"}}));
        assert_eq!(reader.reads, 1);
    }

    #[test]
    fn split_mid_string() {
        let full = br#"{"status":"success","result":{"id":"abc","name":"Box1"}}"#;
        let (a, b) = full.split_at(37);
        let mut reader = ScriptedReader::chunks(&[a, b]);
        let value = receive_full_response(&mut reader, "Rhino", 15.0).unwrap();
        assert_eq!(value["result"], json!({"id": "abc", "name": "Box1"}));
    }

    #[test]
    fn inner_brace_at_chunk_boundary_keeps_reading() {
        // First chunk ends with the inner object's `}`: decode is attempted, fails, reading continues.
        let mut reader = ScriptedReader::chunks(&[
            br#"{"status":"success","result":{"a":1}"#,
            br#","extra":true}"#,
        ]);
        let value = receive_full_response(&mut reader, "Rhino", 15.0).unwrap();
        assert_eq!(value["extra"], json!(true));
        assert_eq!(reader.reads, 2);
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let full = r#"{"status":"success","result":{"name":"Würfel"}}"#.as_bytes();
        let split = full.iter().position(|&b| b == 0xC3).unwrap() + 1;
        let (a, b) = full.split_at(split);
        let mut reader = ScriptedReader::chunks(&[a, b]);
        let value = receive_full_response(&mut reader, "Rhino", 15.0).unwrap();
        assert_eq!(value["result"]["name"], json!("Würfel"));
    }

    #[test]
    fn trailing_whitespace_after_document() {
        let mut reader = ScriptedReader::chunks(&[b"{\"status\":\"success\"}\r\n"]);
        let value = receive_full_response(&mut reader, "Rhino", 15.0).unwrap();
        assert_eq!(value, json!({"status": "success"}));
    }

    #[test]
    fn closed_before_any_data() {
        let mut reader = ScriptedReader::chunks(&[]);
        let err = receive_full_response(&mut reader, "Rhino", 15.0).unwrap_err();
        assert!(matches!(err, PluginError::EmptyResponse { .. }));
    }

    #[test]
    fn closed_mid_document_is_malformed() {
        let mut reader = ScriptedReader::chunks(&[br#"{"status":"succ"#]);
        let err = receive_full_response(&mut reader, "Rhino", 15.0).unwrap_err();
        assert!(matches!(err, PluginError::MalformedResponse { .. }));
        assert!(err.to_string().contains("incomplete JSON response received"));
    }

    #[test]
    fn closed_after_document_without_brace_suffix() {
        // Heuristic never fires (trailing garbage), but the final decode on EOF still succeeds.
        let mut reader = ScriptedReader::chunks(&[br#"{"status":"success"}xx"#]);
        let value = receive_full_response(&mut reader, "Rhino", 15.0).unwrap();
        assert_eq!(value, json!({"status": "success"}));
    }

    #[test]
    fn timeout_with_nothing_received() {
        let mut reader =
            ScriptedReader::new(vec![Err(io::Error::from(io::ErrorKind::WouldBlock))]);
        let err = receive_full_response(&mut reader, "Rhino", 0.5).unwrap_err();
        assert!(matches!(err, PluginError::Timeout { .. }));
    }

    #[test]
    fn timeout_falls_through_to_final_decode() {
        let mut reader = ScriptedReader::new(vec![
            Ok(br#"{"status":"success"}  x"#.to_vec()),
            Err(io::Error::from(io::ErrorKind::TimedOut)),
        ]);
        let value = receive_full_response(&mut reader, "Rhino", 0.5).unwrap();
        assert_eq!(value, json!({"status": "success"}));
    }

    #[test]
    fn timeout_with_partial_document() {
        let mut reader = ScriptedReader::new(vec![
            Ok(br#"{"status":"#.to_vec()),
            Err(io::Error::from(io::ErrorKind::WouldBlock)),
        ]);
        let err = receive_full_response(&mut reader, "Rhino", 0.5).unwrap_err();
        assert!(matches!(err, PluginError::Timeout { .. }));
    }

    #[test]
    fn interrupted_read_is_retried() {
        let mut reader = ScriptedReader::new(vec![
            Err(io::Error::from(io::ErrorKind::Interrupted)),
            Ok(br#"{"status":"success"}"#.to_vec()),
        ]);
        let value = receive_full_response(&mut reader, "Rhino", 15.0).unwrap();
        assert_eq!(value, json!({"status": "success"}));
    }

    #[test]
    fn connection_reset_is_connection_lost() {
        let mut reader = ScriptedReader::new(vec![
            Ok(br#"{"status""#.to_vec()),
            Err(io::Error::from(io::ErrorKind::ConnectionReset)),
        ]);
        let err = receive_full_response(&mut reader, "Rhino", 15.0).unwrap_err();
        assert!(matches!(err, PluginError::ConnectionLost { .. }));
    }

    #[test]
    fn buffer_only_decodes_on_closing_brace() {
        let mut buffer = ResponseBuffer::new();
        assert!(buffer.is_empty());
        assert!(buffer.push(b"[1, 2, 3]").is_none());
        assert_eq!(buffer.len(), 9);
        // An explicit decode still sees the complete array.
        assert_eq!(buffer.decode(), Some(json!([1, 2, 3])));
    }
}

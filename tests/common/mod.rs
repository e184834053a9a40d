//! A scripted stand-in for the Rhino/Grasshopper socket server.
//!
//! The mock serves one connection at a time. For every command it reads, it
//! plays the next [`Reply`] from its script and records the command.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

/// What the mock does after reading a command.
pub enum Reply {
    /// Writes the bytes in separate writes, pausing between them.
    Chunks(Vec<Vec<u8>>),
    /// Writes the bytes, then closes the connection.
    Truncated(Vec<u8>),
    /// Closes the connection without writing anything.
    Close,
    /// Writes nothing and waits for the client to hang up.
    Silent,
}

impl Reply {
    /// A `status: success` envelope in one write.
    pub fn success(result: Value) -> Self {
        Self::json(&json!({"status": "success", "result": result}))
    }

    /// A `status: error` envelope in one write.
    pub fn error(message: &str) -> Self {
        Self::json(&json!({"status": "error", "message": message}))
    }

    /// Any JSON value in one write.
    pub fn json(value: &Value) -> Self {
        Self::Chunks(vec![serde_json::to_vec(value).unwrap()])
    }

    /// A `status: success` envelope split into `pieces` writes.
    pub fn success_in_pieces(result: Value, pieces: usize) -> Self {
        let bytes = serde_json::to_vec(&json!({"status": "success", "result": result})).unwrap();
        let size = bytes.len().div_ceil(pieces).max(1);
        Self::Chunks(bytes.chunks(size).map(<[u8]>::to_vec).collect())
    }
}

/// A running mock plugin.
pub struct MockPlugin {
    port: u16,
    commands: Arc<Mutex<Vec<Value>>>,
    connections: Arc<AtomicUsize>,
}

impl MockPlugin {
    /// Starts serving `script` on an ephemeral local port.
    pub fn start(script: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let commands = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let state = (Arc::clone(&commands), Arc::clone(&connections));
        thread::spawn(move || serve(&listener, script.into(), &state.0, &state.1));

        Self {
            port,
            commands,
            connections,
        }
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Commands received so far, as `{"type", "params"}` objects.
    pub fn commands(&self) -> Vec<Value> {
        self.commands.lock().unwrap().clone()
    }

    /// Connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

fn serve(
    listener: &TcpListener,
    mut script: VecDeque<Reply>,
    commands: &Mutex<Vec<Value>>,
    connections: &AtomicUsize,
) {
    for stream in listener.incoming() {
        let Ok(mut stream) = stream else { continue };
        connections.fetch_add(1, Ordering::SeqCst);

        loop {
            let Some(command) = read_command(&stream) else {
                break;
            };
            commands.lock().unwrap().push(command);

            match script.pop_front() {
                Some(Reply::Chunks(chunks)) => {
                    let last = chunks.len().saturating_sub(1);
                    for (i, chunk) in chunks.iter().enumerate() {
                        if stream.write_all(chunk).and_then(|()| stream.flush()).is_err() {
                            break;
                        }
                        if i < last {
                            thread::sleep(Duration::from_millis(20));
                        }
                    }
                }
                Some(Reply::Truncated(bytes)) => {
                    let _ = stream.write_all(&bytes);
                    break;
                }
                Some(Reply::Close) | None => break,
                Some(Reply::Silent) => {
                    wait_for_hangup(&mut stream);
                    break;
                }
            }
        }
    }
}

fn read_command(stream: &TcpStream) -> Option<Value> {
    let mut de = serde_json::Deserializer::from_reader(stream);
    Value::deserialize(&mut de).ok()
}

fn wait_for_hangup(stream: &mut TcpStream) {
    let mut buf = [0u8; 256];
    while matches!(stream.read(&mut buf), Ok(n) if n > 0) {}
}

/// Returns a local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

//! Minimal HTTP/1.1 server for download tests.
//!
//! Serves a fixed map of request paths to bodies and records every path it
//! is asked for, so tests can assert which spelling the fetcher put on the
//! wire. Unknown paths get 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

pub struct ImageServer {
    base_url: String,
    requested: Arc<Mutex<Vec<String>>>,
}

impl ImageServer {
    /// Starts a server in a background thread. Keys are request paths
    /// exactly as they appear on the request line (e.g. "/a%20b.png").
    /// The server runs until the process exits.
    pub fn start(bodies: HashMap<String, Vec<u8>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let requested = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requested);
        let bodies = Arc::new(bodies);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let bodies = Arc::clone(&bodies);
                let log = Arc::clone(&log);
                thread::spawn(move || handle(stream, &bodies, &log));
            }
        });
        ImageServer {
            base_url: format!("http://127.0.0.1:{}", port),
            requested,
        }
    }

    /// Absolute URL for a request path (which may be pre-encoded or literal).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Paths requested so far, in arrival order.
    pub fn requested_paths(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    bodies: &HashMap<String, Vec<u8>>,
    log: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut head = request.split_whitespace();
    let method = head.next().unwrap_or("");
    let path = head.next().unwrap_or("");
    log.lock().unwrap().push(path.to_string());

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    match bodies.get(path) {
        Some(body) => {
            let header = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n", body.len());
            let _ = stream.write_all(header.as_bytes());
            let _ = stream.write_all(body);
        }
        None => {
            let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
        }
    }
}

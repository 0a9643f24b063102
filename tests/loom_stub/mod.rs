#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::Value;

/// Local HTTP server standing in for both the Loom share page and the transcript CDN.
pub struct LoomStub {
    pub base_url: String,
    hits: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl LoomStub {
    /// `respond` gets the stub's base URL and the request path, and returns (status, body).
    pub fn spawn<F>(respond: F) -> Self
    where
        F: Fn(&str, &str) -> (u16, String) + Send + 'static,
    {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start loom stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let hits = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread_base = base_url.clone();
        let thread_hits = Arc::clone(&hits);
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let path = request.url().to_string();
                thread_hits.lock().expect("hits lock").push(path.clone());

                let (status, body) = respond(&thread_base, &path);
                let _ = request.respond(tiny_http::Response::from_string(body).with_status_code(status));
            }
        });

        Self {
            base_url,
            hits,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Share URL served by this stub; contains `loom.com/share/<id>` so it passes validation.
    pub fn share_url(&self, video_id: &str) -> String {
        format!("{}/loom.com/share/{video_id}", self.base_url)
    }

    /// Request paths seen so far, in order
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().expect("hits lock").clone()
    }
}

impl Drop for LoomStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Minimal share page embedding `state` the way Loom does
pub fn share_page(state: &Value) -> String {
    format!(
        r#"<!doctype html>
<html>
  <head>
    <title>Loom</title>
    <script>window.__APOLLO_STATE__ = {state};</script>
    <script>window.__FEATURE_FLAGS__ = {{"a":true}};</script>
  </head>
  <body><div id="root"></div></body>
</html>
"#
    )
}

pub fn not_found() -> (u16, String) {
    (404, "not found".to_string())
}

/// One-shot server that answers a single request with `body` using chunked
/// transfer encoding, so the client never sees a `Content-Length`.
/// Returns the base URL.
pub fn spawn_chunked(body: String, chunk_size: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind chunked server");
    let base_url = format!("http://{}", listener.local_addr().expect("local addr"));

    thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        while reader.read_line(&mut line).is_ok_and(|n| n > 0) && line != "\r\n" {
            line.clear();
        }

        let mut stream = reader.into_inner();
        let _ = stream.write_all(
            b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
        );
        for chunk in body.as_bytes().chunks(chunk_size.max(1)) {
            let _ = write!(stream, "{:x}\r\n", chunk.len());
            let _ = stream.write_all(chunk);
            let _ = stream.write_all(b"\r\n");
            let _ = stream.flush();
        }
        let _ = stream.write_all(b"0\r\n\r\n");
    });

    base_url
}

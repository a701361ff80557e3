#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Local stand-in for the storage service. Each canned response answers one
/// connection, in order; the request heads are handed back on `finish`.
pub struct FakeS3 {
    pub addr: String,
    handle: JoinHandle<Vec<String>>,
}

impl FakeS3 {
    pub fn start(responses: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(20);
            let mut heads = Vec::new();
            for response in responses {
                let stream = loop {
                    match listener.accept() {
                        Ok((stream, _)) => break Some(stream),
                        Err(_) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
                        Err(_) => break None,
                    }
                };
                let Some(mut stream) = stream else { break };
                stream.set_nonblocking(false).unwrap();
                heads.push(read_request(&mut stream));
                stream.write_all(response.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
            heads
        });
        FakeS3 { addr, handle }
    }

    /// Request heads in arrival order.
    pub fn finish(self) -> Vec<String> {
        self.handle.join().unwrap()
    }
}

/// Read one request head and drain its body so closing the socket does not
/// reset the connection.
fn read_request(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let head_end = loop {
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut buf).unwrap();
        assert!(n > 0, "connection closed before the request head ended");
        data.extend_from_slice(&buf[..n]);
    };
    let head = String::from_utf8_lossy(&data[..head_end]).into_owned();
    let lower = head.to_lowercase();

    let chunked = lower.contains("transfer-encoding: chunked");
    let body_len = lower
        .lines()
        .find_map(|l| l.strip_prefix("content-length:").and_then(|v| v.trim().parse::<usize>().ok()))
        .unwrap_or(0);
    loop {
        let done = if chunked {
            data[head_end..].ends_with(b"0\r\n\r\n")
        } else {
            data.len() >= head_end + body_len
        };
        if done {
            break;
        }
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    head
}

/// An HTTP response that closes the connection afterwards.
pub fn reply(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

pub fn ok() -> String {
    reply("200 OK", "")
}

pub fn not_found() -> String {
    reply("404 Not Found", "")
}

/// `[S3]` config pointing at a plain-http local endpoint.
pub fn config_text(host: &str, bucket: &str) -> String {
    format!(
        "[S3]\nbucket_name = {bucket}\naws_access_key_id = AKID\naws_secret_access_key = secret\nhost = {host}\nis_secure = false\n"
    )
}

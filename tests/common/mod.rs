#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Creates a temporary YAML configuration file, removed on drop
    pub fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("dumppad_test_")
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }
}

pub mod test_server {
    use std::net::TcpListener;
    use std::sync::Once;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }

    /// A port that was free a moment ago
    pub fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }
}

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    pub fn send_request(addr: &SocketAddr, req: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(100)))
            .unwrap();
        let mut buf = Vec::new();
        loop {
            let mut tmp = [0u8; 1024];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break
                }
                Err(e) => panic!("read error: {:?}", e),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// POST `body` to `/` with an exact Content-Length
    pub fn post_dump(addr: &SocketAddr, body: &str) -> String {
        send_request(
            addr,
            &format!(
                "POST / HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                body.len(),
                body
            ),
        )
    }

    pub fn get(addr: &SocketAddr, path: &str) -> String {
        send_request(
            addr,
            &format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path),
        )
    }

    pub fn parse_response(resp: &str) -> (u16, String) {
        let mut parts = resp.splitn(2, "\r\n\r\n");
        let headers = parts.next().unwrap_or("");
        let body = parts.next().unwrap_or("");
        let mut status = 0;
        for line in headers.lines() {
            if line.starts_with("HTTP/1.1") {
                status = line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("0")
                    .parse()
                    .unwrap();
            }
        }
        (status, body.to_string())
    }
}

pub mod recording {
    use dumppad::server::{ClearCallback, ValueCallback};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    /// Callbacks that record what the listener delivered
    #[derive(Clone, Default)]
    pub struct Recorder {
        pub values: Arc<Mutex<Vec<Value>>>,
        pub clears: Arc<Mutex<usize>>,
    }

    impl Recorder {
        pub fn on_value(&self) -> ValueCallback {
            let values = Arc::clone(&self.values);
            Arc::new(move |v| {
                values.lock().unwrap().push(v);
                Ok(())
            })
        }

        pub fn on_clear(&self) -> ClearCallback {
            let clears = Arc::clone(&self.clears);
            Arc::new(move || {
                *clears.lock().unwrap() += 1;
                Ok(())
            })
        }

        pub fn values(&self) -> Vec<Value> {
            self.values.lock().unwrap().clone()
        }

        pub fn clear_count(&self) -> usize {
            *self.clears.lock().unwrap()
        }
    }
}

use std::fs;
use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;
use std::time::Duration;

use zip::ZipWriter;
use zip::write::FileOptions;

/// Builds an in-memory zip. `None` content marks a directory entry.
pub fn build_zip(entries: &[(&str, Option<&str>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        match content {
            Some(content) => {
                writer
                    .start_file(*name, FileOptions::default())
                    .expect("start zip entry");
                writer.write_all(content.as_bytes()).expect("write zip entry");
            }
            None => writer
                .add_directory(*name, FileOptions::default())
                .expect("add zip directory"),
        }
    }
    writer.finish().expect("finish zip").into_inner()
}

pub fn write_page(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create page dir");
    }
    fs::write(path, content).expect("write page");
}

pub const LSOF_PAGE: &str = "# lsof

> Lists open files and the corresponding processes.

- Find the processes that have a given file open:

`lsof {{path/to/file}}`

- Find the process that opened a local internet port:

`lsof -i :{{port}}`

- Only output the process ID (PID):

`lsof -t {{path/to/file}}`

- List files opened by the given user:

`lsof -u {{username}}`

- List files opened by the given command or process:

`lsof -c {{process_or_command_name}}`

- List files opened by a specific process, given its PID:

`lsof -p {{PID}}`

- List open files in a directory:

`lsof +D {{path/to/directory}}`
";

pub struct ServedResponse {
    status_line: String,
    body: Vec<u8>,
    body_delay: Duration,
}

impl ServedResponse {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status_line: "200 OK".to_string(),
            body,
            body_delay: Duration::ZERO,
        }
    }

    pub fn status(code: u16, reason: &str) -> Self {
        Self {
            status_line: format!("{code} {reason}"),
            body: reason.as_bytes().to_vec(),
            body_delay: Duration::ZERO,
        }
    }

    /// Sends the head right away and holds the body back for `delay`.
    pub fn with_body_delay(mut self, delay: Duration) -> Self {
        self.body_delay = delay;
        self
    }
}

/// Serves a single HTTP response on a loopback port and returns the URL.
pub fn serve_once(response: ServedResponse, file_name: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let port = listener.local_addr().expect("local addr").port();
    thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) if line == "\r\n" || line == "\n" => break,
                Ok(_) => continue,
                Err(_) => return,
            }
        }
        let mut stream = reader.into_inner();
        let head = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            response.status_line,
            response.body.len()
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.flush();
        thread::sleep(response.body_delay);
        let _ = stream.write_all(&response.body);
        let _ = stream.flush();
    });
    format!("http://127.0.0.1:{port}/{file_name}")
}

/// URL on a loopback port nothing listens on.
pub fn unused_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/tldr.zip")
}

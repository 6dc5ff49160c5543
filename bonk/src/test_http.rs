//! One-shot HTTP/1.1 responder for driving the clients against canned replies.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Canned reply for every request whose path starts with `path`.
#[derive(Clone)]
pub(crate) struct Route {
    pub path: &'static str,
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Route {
    pub fn json(path: &'static str, status: u16, body: serde_json::Value) -> Self {
        Self {
            path,
            status,
            content_type: "application/json",
            body: body.to_string().into_bytes(),
        }
    }

    pub fn bytes(path: &'static str, content_type: &'static str, body: &[u8]) -> Self {
        Self {
            path,
            status: 200,
            content_type,
            body: body.to_vec(),
        }
    }
}

/// What the server saw.
pub(crate) struct Request {
    pub path: String,
    pub head: String,
    pub body: Vec<u8>,
}

impl Request {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }
}

/// Bind an ephemeral port; returns the base URL and a feed of received requests.
pub(crate) async fn serve(routes: Vec<Route>) -> (String, mpsc::UnboundedReceiver<Request>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let routes = routes.clone();
            let tx = tx.clone();
            tokio::spawn(async move { handle(stream, &routes, &tx).await });
        }
    });
    (format!("http://{addr}"), rx)
}

/// A base URL nothing listens on.
pub(crate) async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn handle(mut stream: TcpStream, routes: &[Route], tx: &mpsc::UnboundedSender<Request>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let length = head
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            if key.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);
    while buf.len() < header_end + length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let (status, content_type, payload) = match routes.iter().find(|r| path.starts_with(r.path)) {
        Some(route) => (route.status, route.content_type, route.body.clone()),
        None => (404, "text/plain", b"not found".to_vec()),
    };
    let _ = tx.send(Request {
        path,
        head,
        body: buf[header_end..].to_vec(),
    });

    let reply = format!(
        "HTTP/1.1 {status} Canned\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
        payload.len()
    );
    let _ = stream.write_all(reply.as_bytes()).await;
    let _ = stream.write_all(&payload).await;
    let _ = stream.shutdown().await;
}

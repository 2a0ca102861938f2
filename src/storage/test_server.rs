// One-shot HTTP responder for exercising the API clients against a local socket
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Request as received by the stub. Header names are lowercased.
#[derive(Debug)]
pub struct RecordedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Serves a single request with the given status and body, then closes the socket.
/// Returns the base URL and a handle resolving to the recorded request.
pub async fn serve_once(
    status: &'static str,
    body: &'static str,
) -> anyhow::Result<(String, JoinHandle<anyhow::Result<RecordedRequest>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await?;
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        while !is_complete(&raw) {
            let n = socket.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await?;
        socket.shutdown().await?;

        parse(&raw)
    });

    Ok((base_url, handle))
}

fn split_head(raw: &[u8]) -> Option<(&[u8], &[u8])> {
    raw.windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|end| (&raw[..end], &raw[end + 4..]))
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

fn is_complete(raw: &[u8]) -> bool {
    match split_head(raw) {
        Some((head, body)) => body.len() >= content_length(&String::from_utf8_lossy(head)),
        None => false,
    }
}

fn parse(raw: &[u8]) -> anyhow::Result<RecordedRequest> {
    let (head, body) = split_head(raw).ok_or_else(|| anyhow::anyhow!("incomplete request"))?;
    let head = String::from_utf8_lossy(head);
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    Ok(RecordedRequest {
        request_line,
        headers,
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

//! End-to-end: webhook HTTP response -> reply decoder -> displayed text.
//!
//! Uses a raw TCP server for chunked bodies so that chunk boundaries reach the
//! decoder exactly where the test puts them (inside `data:`, inside a
//! multi-byte character, between records).

use std::time::Duration;

use chatrelay_stream::{FramingMode, ReplyDecoder};
use chatrelay_webhook::{ChatRequest, RelayError, ReplyEvent, ReplyPolicy, WebhookClient};
use futures::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serve exactly one request, answering with `chunks` as separate HTTP chunks.
async fn serve_chunked(content_type: &'static str, chunks: Vec<Vec<u8>>) -> String {
    serve(content_type, chunks, true).await
}

/// Like [`serve_chunked`], but closes the connection after the last chunk
/// without the terminating zero-size chunk.
async fn serve_truncated(content_type: &'static str, chunks: Vec<Vec<u8>>) -> String {
    serve(content_type, chunks, false).await
}

async fn serve(content_type: &'static str, chunks: Vec<Vec<u8>>, terminate: bool) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        read_request(&mut socket).await;

        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: {content_type}\r\ntransfer-encoding: chunked\r\nconnection: close\r\n\r\n"
        );
        socket.write_all(head.as_bytes()).await.expect("write head");
        for chunk in chunks {
            if chunk.is_empty() {
                continue;
            }
            socket
                .write_all(format!("{:x}\r\n", chunk.len()).as_bytes())
                .await
                .expect("write size");
            socket.write_all(&chunk).await.expect("write chunk");
            socket.write_all(b"\r\n").await.expect("write crlf");
            socket.flush().await.expect("flush");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        if terminate {
            socket.write_all(b"0\r\n\r\n").await.expect("write trailer");
        }
        let _ = socket.shutdown().await;
    });

    format!("http://{addr}/webhook/chat")
}

/// Read request headers and a `content-length` body.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    let header_end = loop {
        let n = socket.read(&mut tmp).await.expect("read");
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut tmp).await.expect("read body");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }
}

fn split_bytes(body: &[u8], offsets: &[usize]) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    for &offset in offsets {
        chunks.push(body[start..offset].to_vec());
        start = offset;
    }
    chunks.push(body[start..].to_vec());
    chunks
}

#[tokio::test]
async fn sse_reply_split_at_awkward_boundaries() {
    let body = concat!(
        "data: {\"type\":\"begin\"}\n\n",
        "data: {\"type\":\"item\",\"content\":\"Buongiorno ☕\"}\n\n",
        "data: {\"type\":\"item\",\"content\":\", sono Giulia.\"}\n\n",
        "data: {\"type\":\"end\",\"title\":\"Caffè\"}\n\n",
    )
    .as_bytes();
    let coffee = body
        .windows("☕".len())
        .position(|w| w == "☕".as_bytes())
        .expect("coffee in body");
    // Inside the first `data:`, inside the multi-byte cup, inside a separator.
    let second_sep = body
        .windows(2)
        .enumerate()
        .filter(|(_, w)| *w == b"\n\n")
        .nth(1)
        .map(|(i, _)| i)
        .expect("separator");
    let offsets = [2, coffee + 1, second_sep + 1];

    let url = serve_chunked("text/event-stream", split_bytes(body, &offsets)).await;
    let client = WebhookClient::new(url).agent("giulia");

    let mut updates = Vec::new();
    let reply = client
        .send_and_collect(ChatRequest::new("e2e", "Ciao"), |t| updates.push(t.to_string()))
        .await
        .expect("should succeed");

    assert_eq!(reply.text, "Buongiorno ☕, sono Giulia.");
    assert_eq!(reply.title.as_deref(), Some("Caffè"));
    assert_eq!(updates, vec!["Buongiorno ☕", "Buongiorno ☕, sono Giulia."]);
    assert_eq!(ReplyPolicy::default().render(&Ok(reply)), "Buongiorno ☕, sono Giulia.");
}

#[tokio::test]
async fn jsonl_reply_with_trailing_unterminated_record() {
    let body = concat!(
        "{\"type\":\"item\",\"content\":\"A\"}\n{\"typ",
        "e\":\"item\",\"content\":\"B\"}\nnot json\n",
        "{\"type\":\"item\",\"content\":\"tail\"}",
    )
    .as_bytes();
    let url = serve_chunked("application/x-ndjson", split_bytes(body, &[33, 40])).await;

    let client = WebhookClient::new(url);
    let handle = client
        .send_message(ChatRequest::new("e2e", "hi"))
        .await
        .expect("should succeed");
    let events: Vec<ReplyEvent> = handle.receiver.collect().await;

    let updates: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            ReplyEvent::Update(t) => Some(t.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(updates, vec!["A", "AB", "ABtail"]);
    assert!(matches!(events.last(), Some(ReplyEvent::Complete(r)) if r.text == "ABtail"));
}

#[tokio::test]
async fn empty_stream_shows_fallback_message() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/event-stream"))
        .mount(&mock_server)
        .await;

    let client = WebhookClient::new(format!("{}/webhook/chat", mock_server.uri()));
    let outcome = client
        .send_and_collect(ChatRequest::new("e2e", "hi"), |_| {})
        .await;

    let policy = ReplyPolicy::default();
    assert_eq!(policy.render(&outcome), policy.fallback_message);
}

#[tokio::test]
async fn failed_send_shows_error_message() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&mock_server)
        .await;

    let client = WebhookClient::new(format!("{}/webhook/chat", mock_server.uri()));
    let outcome = client
        .send_and_collect(ChatRequest::new("e2e", "hi"), |_| {})
        .await;

    let policy = ReplyPolicy::default();
    assert!(outcome.is_err());
    assert_eq!(policy.render(&outcome), policy.error_message);
}

#[tokio::test]
async fn connection_dropped_mid_body_shows_error_message() {
    let body = concat!(
        "data: {\"type\":\"item\",\"content\":\"Half a\"}\n\n",
        "data: {\"type\":\"item\",\"con",
    )
    .as_bytes();
    let url = serve_truncated("text/event-stream", vec![body.to_vec()]).await;

    let client = WebhookClient::new(url);
    let mut updates = Vec::new();
    let outcome = client
        .send_and_collect(ChatRequest::new("e2e", "hi"), |t| updates.push(t.to_string()))
        .await;

    assert!(
        matches!(outcome, Err(RelayError::Stream(_))),
        "expected Stream error, got: {outcome:?}"
    );
    assert_eq!(updates, vec!["Half a"]);

    let policy = ReplyPolicy::default();
    assert_eq!(policy.render(&outcome), policy.error_message);
}

#[test]
fn decoder_modes_from_first_bytes() {
    let mut sse = ReplyDecoder::new();
    sse.feed(b"data: {}\n\n");
    assert_eq!(sse.mode(), FramingMode::Sse);

    let mut jsonl = ReplyDecoder::new();
    jsonl.feed(b"[");
    assert_eq!(jsonl.mode(), FramingMode::Jsonl);
}

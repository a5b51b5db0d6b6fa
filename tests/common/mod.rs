#![allow(dead_code)]

use lifeline_tui::api::ResourceClient;
use lifeline_tui::app::App;
use lifeline_tui::events::Event;
use lifeline_tui::location::{LocationProvider, PositionOptions, PositionSource};
use lifeline_tui::runtime::{dispatch, Services};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

/// A request as seen by [`serve_once`].
#[derive(Debug)]
pub struct CapturedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

/// Answers exactly one HTTP request on a loopback port with `status` and
/// `body`. Returns the base URL and a receiver for the captured request.
pub async fn serve_once(status: &str, body: &str) -> (String, oneshot::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\
         connection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let head_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            if n == 0 {
                break buf.len();
            }
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let content_length = head
            .lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < head_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = tx.send(CapturedRequest {
            head,
            body: buf[head_end..].to_vec(),
        });
    });

    (format!("http://{}/api", addr), rx)
}

pub fn services(
    source: impl PositionSource + 'static,
    options: PositionOptions,
    base_url: &str,
) -> Services {
    Services {
        location: Arc::new(LocationProvider::new(Some(Box::new(source)), options)),
        client: Arc::new(ResourceClient::new(base_url, Duration::from_secs(5)).unwrap()),
    }
}

/// Presses the action once and runs effects until the chain settles.
pub async fn run_action(app: &mut App, services: &Services) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut pending = 0;
    if let Some(effect) = app.trigger() {
        dispatch(effect, services, &tx);
        pending += 1;
    }
    while pending > 0 {
        let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("lookup chain stalled")
            .expect("channel closed");
        pending -= 1;
        if let Some(effect) = app.update(event) {
            dispatch(effect, services, &tx);
            pending += 1;
        }
    }
}

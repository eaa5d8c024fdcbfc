//! Remote reference materialization tests.
//!
//! A FileRef is fetched lazily over HTTP and memoized: repeated stream
//! acquisition yields byte-identical content from a single fetch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use slipway_artifact::{File, FileError, FileRef, StreamCapability};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve `body` to every connection, counting requests.
async fn serve_static(body: &'static str) -> (u16, Arc<AtomicUsize>) {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);

            // Drain the request head before answering.
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;

            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    (port, hits)
}

async fn read_all(file: &File) -> Vec<u8> {
    let mut stream = file.to_stream_async().await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    buf
}

#[tokio::test]
async fn remote_content_is_fetched_once_and_repeatable() {
    let (port, hits) = serve_static("export const remote = true;").await;
    let file = File::from(FileRef::new(format!("http://127.0.0.1:{port}/bundle.js")));

    assert_eq!(file.stream_capability(), StreamCapability::AsyncOnly);

    let first = read_all(&file).await;
    let second = read_all(&file).await;
    assert_eq!(first, b"export const remote = true;");
    assert_eq!(first, second);

    // Memoized: one fetch serves every acquisition, clones included.
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    let clone = file.clone();
    assert_eq!(read_all(&clone).await, first);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fetch_failures_carry_the_url() {
    // Nothing listens here; the connection is refused.
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = format!("http://127.0.0.1:{port}/gone.js");
    let file = File::from(FileRef::new(url.clone()));

    match file.to_stream_async().await {
        Err(FileError::Fetch { url: reported, .. }) => assert_eq!(reported, url),
        other => panic!("expected Fetch error, got {:?}", other.map(|_| ())),
    }
}

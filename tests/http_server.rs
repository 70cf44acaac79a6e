// tests/http_server.rs

mod common;
use crate::common::init_tracing;

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use wasmfresh::freshness::{freshness_channel, FreshnessEndpoint, FreshnessPublisher, FreshnessSignal};
use wasmfresh::fs::RealFileSystem;
use wasmfresh::serve::{HttpServer, Routes, ServerHandle, StaticFiles};
use wasmfresh::types::BuildStatus;
use wasmfresh::watch::Digest;

/// Blocking HTTP/1.0 GET returning `(status, body)`.
fn get(addr: SocketAddr, path: &str) -> (u16, Vec<u8>) {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    write!(stream, "GET {path} HTTP/1.0\r\nHost: localhost\r\n\r\n").unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).unwrap();

    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    let head = String::from_utf8_lossy(&raw[..split]).to_string();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("status line");
    (status, raw[split + 4..].to_vec())
}

struct Site {
    _dir: tempfile::TempDir,
    addr: SocketAddr,
    publisher: Option<FreshnessPublisher>,
    server: ServerHandle,
}

fn serve(poll_timeout: Duration) -> Site {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<script src=wasm_exec.js></script>").unwrap();
    std::fs::write(dir.path().join("out.wasm"), b"\0asm\x01\0\0\0").unwrap();

    let (publisher, receiver) = freshness_channel(20, poll_timeout);
    let routes = Routes {
        freshness_path: "/version".to_string(),
        endpoint: FreshnessEndpoint::new(receiver),
        static_files: StaticFiles::new(dir.path(), Arc::new(RealFileSystem)),
    };
    let server = HttpServer::bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = server.addr();
    let server = server.spawn(routes, Handle::current());

    Site {
        _dir: dir,
        addr,
        publisher: Some(publisher),
        server,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn serves_static_files_and_index() {
    let site = serve(Duration::from_millis(200));
    let addr = site.addr;

    let (index, wasm, missing, escape) = tokio::task::spawn_blocking(move || {
        (
            get(addr, "/"),
            get(addr, "/out.wasm?v=3"),
            get(addr, "/nope.js"),
            get(addr, "/../etc/passwd"),
        )
    })
    .await
    .unwrap();

    assert_eq!(index.0, 200);
    assert!(String::from_utf8_lossy(&index.1).contains("wasm_exec.js"));
    assert_eq!(wasm, (200, b"\0asm\x01\0\0\0".to_vec()));
    assert_eq!(missing.0, 404);
    assert!(escape.0 == 403 || escape.0 == 404, "{}", escape.0);

    tokio::task::spawn_blocking(move || site.server.shutdown()).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn freshness_path_long_polls() {
    let mut site = serve(Duration::from_millis(300));
    let addr = site.addr;

    let (status, body) = tokio::task::spawn_blocking(move || get(addr, "/version")).await.unwrap();
    assert_eq!((status, body.as_slice()), (200, b"timeout".as_slice()));

    let digest = Digest::of(b"fresh build");
    site.publisher
        .as_ref()
        .unwrap()
        .publish(FreshnessSignal {
            digest,
            build: BuildStatus::Succeeded,
        })
        .await;
    let (status, body) = tokio::task::spawn_blocking(move || get(addr, "/version")).await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(String::from_utf8(body).unwrap(), digest.to_hex());

    drop(site.publisher.take());
    let (status, _) = tokio::task::spawn_blocking(move || get(addr, "/version")).await.unwrap();
    assert_eq!(status, 500);

    tokio::task::spawn_blocking(move || site.server.shutdown()).await.unwrap();
}

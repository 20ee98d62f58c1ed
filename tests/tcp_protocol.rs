use std::sync::Arc;
use std::time::Duration;

use bloomlist::config::settings::Settings;
use bloomlist::handlers::AppState;
use bloomlist::server;
use bloomlist::services::bloom::{BloomFilterCore, SharedFilter};
use bloomlist::services::storage::{FileStorage, Storage};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

struct Client {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read, write) = stream.into_split();
        Self { reader: BufReader::new(read), writer: write }
    }

    async fn line(&mut self) -> String {
        let mut line = String::new();
        tokio::time::timeout(Duration::from_secs(5), self.reader.read_line(&mut line))
            .await
            .expect("reply timed out")
            .unwrap();
        line.trim_end_matches('\n').to_string()
    }

    async fn send(&mut self, command: &str) -> String {
        self.writer.write_all(format!("{}\n", command).as_bytes()).await.unwrap();
        self.line().await
    }

    async fn get(&mut self, url: &str) -> String {
        assert_eq!(self.send(&format!("GET {}", url)).await, "200 OK");
        assert_eq!(self.line().await, "");
        self.line().await
    }
}

async fn start(settings: Settings) -> (std::net::SocketAddr, Arc<SharedFilter>, oneshot::Sender<()>) {
    let settings = Arc::new(settings);
    let core = BloomFilterCore::new(
        settings.filter.bit_count,
        settings.filter.hash_functions().unwrap(),
    )
    .unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::from_config(&settings.storage));
    let filter = Arc::new(SharedFilter::new(core, storage));
    filter.restore().await.unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    let state = AppState::new(settings, Arc::clone(&filter));
    tokio::spawn(server::serve(listener, state, async {
        let _ = rx.await;
    }));
    (addr, filter, tx)
}

fn settings_in(dir: &std::path::Path, bits: usize) -> Settings {
    let mut settings = Settings::default();
    settings.filter.bit_count = bits;
    settings.storage.data_dir = dir.to_string_lossy().into_owned();
    settings
}

#[tokio::test]
async fn test_protocol_scenarios() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, _filter, _stop) = start(settings_in(dir.path(), 8)).await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.send("POST www.example.com0").await, "201 Created");
    assert_eq!(client.get("www.example.com0").await, "true true");
    assert_eq!(client.get("www.unseen.example.com1").await, "false");
    assert_eq!(client.send("DELETE www.example.com0").await, "204 No Content");
    assert_eq!(client.get("www.example.com0").await, "false");
    assert_eq!(client.send("DELETE www.never-added.com").await, "404 Not Found");
    assert_eq!(client.send("42 www.test.com").await, "400 Bad Request");
}

#[tokio::test]
async fn test_mutations_are_persisted_and_restored() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path(), 64);
    let record_path = settings.storage.record_path();
    {
        let (addr, _filter, stop) = start(settings.clone()).await;
        let mut client = Client::connect(addr).await;
        assert_eq!(client.send("POST www.kept.com").await, "201 Created");
        assert_eq!(client.send("POST www.dropped.com").await, "201 Created");
        assert_eq!(client.send("DELETE www.dropped.com").await, "204 No Content");
        stop.send(()).unwrap();
    }

    let record = std::fs::read_to_string(&record_path).unwrap();
    let lines: Vec<&str> = record.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "ArraySize: 64");
    assert_eq!(lines[2], "HashList: std:1,std:2");
    assert_eq!(lines[3], "Blacklist: www.kept.com");

    // a restart with a different configured size picks up the stored record
    let (addr, filter, _stop) = start(settings_in(dir.path(), 8)).await;
    assert_eq!(filter.snapshot().bit_count(), 64);
    let mut client = Client::connect(addr).await;
    assert_eq!(client.get("www.kept.com").await, "true true");
}

#[tokio::test]
async fn test_concurrent_clients_share_one_filter() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, filter, _stop) = start(settings_in(dir.path(), 4096)).await;

    let clients: Vec<_> = (0..8)
        .map(|c| {
            tokio::spawn(async move {
                let mut client = Client::connect(addr).await;
                for i in 0..10 {
                    let url = format!("www.client{}-item{}.com", c, i);
                    assert_eq!(client.send(&format!("POST {}", url)).await, "201 Created");
                    assert_eq!(client.get(&url).await, "true true");
                }
            })
        })
        .collect();
    for c in clients {
        c.await.unwrap();
    }

    assert_eq!(filter.len(), 80);
    let mut client = Client::connect(addr).await;
    assert_eq!(client.get("www.client3-item7.com").await, "true true");
}

#[tokio::test]
async fn test_connection_limit_queues_extra_clients() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings_in(dir.path(), 64);
    settings.server.max_connections = Some(1);
    let (addr, _filter, _stop) = start(settings).await;

    let mut first = Client::connect(addr).await;
    assert_eq!(first.send("POST www.first.com").await, "201 Created");

    let mut second = Client::connect(addr).await;
    second.writer.write_all(b"GET www.first.com\n").await.unwrap();
    let mut pending = String::new();
    let waited = tokio::time::timeout(
        Duration::from_millis(200),
        second.reader.read_line(&mut pending),
    )
    .await;
    assert!(waited.is_err(), "second client was served while the slot was taken");

    drop(first);
    assert_eq!(second.line().await, "200 OK");
    assert_eq!(second.line().await, "");
    assert_eq!(second.line().await, "true true");
}

#[tokio::test]
async fn test_failed_session_does_not_stop_server() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, _filter, _stop) = start(settings_in(dir.path(), 64)).await;

    let mut broken = Client::connect(addr).await;
    broken.writer.write_all(b"\xff\xfe\n").await.unwrap();
    let mut rest = String::new();
    let read = tokio::time::timeout(Duration::from_secs(5), broken.reader.read_line(&mut rest))
        .await
        .expect("session was not closed")
        .unwrap();
    assert_eq!(read, 0);

    let mut client = Client::connect(addr).await;
    assert_eq!(client.send("POST www.after.com").await, "201 Created");
    assert_eq!(client.get("www.after.com").await, "true true");
}

#[tokio::test]
async fn test_oversized_line_over_tcp() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, filter, _stop) = start(settings_in(dir.path(), 64)).await;
    let mut client = Client::connect(addr).await;

    let long = "a".repeat(bloomlist::session::MAX_LINE_LENGTH * 4);
    assert_eq!(client.send(&format!("POST {}", long)).await, "400 Bad Request");
    assert_eq!(client.send("POST www.short.com").await, "201 Created");
    assert_eq!(filter.len(), 1);
}

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const TRUE_ADDR: &str = "203.0.113.9";

/// Connection counters shared by a group of mock proxies
#[derive(Default)]
pub struct ProxyStats {
    pub connections: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ProxyStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Start counting afresh, e.g. between two runs over the same proxies
    pub fn reset(&self) {
        self.connections.store(0, Ordering::SeqCst);
        self.in_flight.store(0, Ordering::SeqCst);
        self.max_in_flight.store(0, Ordering::SeqCst);
    }

    fn enter(&self) {
        self.connections.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// How a mock proxy answers the reference request
#[derive(Clone)]
pub enum Behavior {
    /// Complete the SOCKS5 handshake and echo this origin after `delay`
    Echo { origin: String, delay: Duration },
    /// Accept the connection and never answer
    Hang,
}

impl Behavior {
    pub fn echo(origin: &str) -> Self {
        Behavior::Echo {
            origin: origin.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn slow_echo(origin: &str, delay: Duration) -> Self {
        Behavior::Echo {
            origin: origin.to_string(),
            delay,
        }
    }
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

fn origin_body(origin: &str) -> String {
    format!(r#"{{"origin": "{}"}}"#, origin)
}

async fn read_http_request<R: AsyncRead + Unpin>(socket: &mut R) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }
    Ok(())
}

/// Address-echo service reporting `origin` for every request
pub async fn spawn_echo_service(status: &'static str, origin: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let response = http_response(status, &origin_body(origin));

    tokio::spawn(async move {
        loop {
            if let Ok((mut socket, _)) = listener.accept().await {
                let response = response.clone();
                tokio::spawn(async move {
                    let _ = read_http_request(&mut socket).await;
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        }
    });

    format!("http://127.0.0.1:{}/ip", port)
}

async fn socks5_handshake(socket: &mut TcpStream) -> std::io::Result<()> {
    // greeting: VER NMETHODS METHODS...
    let mut header = [0u8; 2];
    socket.read_exact(&mut header).await?;
    let mut methods = vec![0u8; header[1] as usize];
    socket.read_exact(&mut methods).await?;
    socket.write_all(&[0x05, 0x00]).await?;

    // request: VER CMD RSV ATYP DST.ADDR DST.PORT
    let mut request = [0u8; 4];
    socket.read_exact(&mut request).await?;
    let addr_len = match request[3] {
        0x01 => 4,
        0x04 => 16,
        _ => {
            let mut len = [0u8; 1];
            socket.read_exact(&mut len).await?;
            len[0] as usize
        }
    };
    let mut rest = vec![0u8; addr_len + 2];
    socket.read_exact(&mut rest).await?;

    socket
        .write_all(&[0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0])
        .await
}

/// Minimal SOCKS5 proxy that answers the tunneled request itself
pub async fn spawn_socks_proxy(behavior: Behavior, stats: Arc<ProxyStats>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            if let Ok((mut socket, _)) = listener.accept().await {
                let behavior = behavior.clone();
                let stats = Arc::clone(&stats);
                tokio::spawn(async move {
                    stats.enter();
                    match behavior {
                        Behavior::Hang => {
                            let mut buf = [0u8; 1024];
                            while let Ok(n) = socket.read(&mut buf).await {
                                if n == 0 {
                                    break;
                                }
                            }
                            stats.leave();
                        }
                        Behavior::Echo { origin, delay } => {
                            let handled = async {
                                socks5_handshake(&mut socket).await?;
                                read_http_request(&mut socket).await?;
                                tokio::time::sleep(delay).await;
                                Ok::<_, std::io::Error>(())
                            }
                            .await;
                            // Leave before answering so the client never sees a stale count
                            stats.leave();
                            if handled.is_ok() {
                                let response = http_response("200 OK", &origin_body(&origin));
                                let _ = socket.write_all(response.as_bytes()).await;
                                let _ = socket.shutdown().await;
                            }
                        }
                    }
                });
            }
        }
    });

    port
}

/// A localhost port with nothing listening on it
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}-{}.txt", name, uuid::Uuid::new_v4()))
}

pub fn read_lines(path: &PathBuf) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

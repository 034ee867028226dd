use std::{collections::HashMap, sync::Arc};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::Notify,
    task::JoinHandle,
};

/// Single-connection RESP2 server that knows PING, GET, SET, SETEX and DEL.
/// Anything else is answered `+OK`. `hang_up` closes the socket server-side.
pub struct FakeRedis {
    pub url: String,
    hangup: Arc<Notify>,
    task: JoinHandle<()>,
}

impl FakeRedis {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("redis://{}/", listener.local_addr().unwrap());
        let hangup = Arc::new(Notify::new());

        let notified = hangup.clone();
        let task = tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut data: HashMap<String, String> = HashMap::new();
            let mut buf: Vec<u8> = Vec::new();
            let mut chunk = [0u8; 1024];

            loop {
                tokio::select! {
                    _ = notified.notified() => break,
                    read = socket.read(&mut chunk) => {
                        let n = match read {
                            Ok(0) | Err(_) => break,
                            Ok(n) => n,
                        };
                        buf.extend_from_slice(&chunk[..n]);

                        while let Some((args, used)) = parse_command(&buf) {
                            buf.drain(..used);
                            let reply = answer(&mut data, &args);
                            if socket.write_all(reply.as_bytes()).await.is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        Self { url, hangup, task }
    }

    pub fn hang_up(&self) {
        self.hangup.notify_one();
    }
}

impl Drop for FakeRedis {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn answer(data: &mut HashMap<String, String>, args: &[String]) -> String {
    let name = args.first().map(|s| s.to_ascii_uppercase()).unwrap_or_default();

    match (name.as_str(), args) {
        ("PING", _) => "+PONG\r\n".to_string(),
        ("GET", [_, key]) => match data.get(key) {
            Some(v) => format!("${}\r\n{}\r\n", v.len(), v),
            None => "$-1\r\n".to_string(),
        },
        ("SET", [_, key, value, ..]) => {
            data.insert(key.clone(), value.clone());
            "+OK\r\n".to_string()
        }
        ("SETEX", [_, key, _ttl, value]) => {
            data.insert(key.clone(), value.clone());
            "+OK\r\n".to_string()
        }
        ("DEL", [_, key]) => format!(":{}\r\n", u8::from(data.remove(key).is_some())),
        _ => "+OK\r\n".to_string(),
    }
}

/// Parses one `*N` array of bulk strings. `None` until the whole command is buffered.
fn parse_command(buf: &[u8]) -> Option<(Vec<String>, usize)> {
    let (count, mut pos) = read_header(buf, 0, b'*')?;
    let mut args = Vec::with_capacity(count);

    for _ in 0..count {
        let (len, next) = read_header(buf, pos, b'$')?;
        if buf.len() < next + len + 2 {
            return None;
        }
        args.push(String::from_utf8_lossy(&buf[next..next + len]).into_owned());
        pos = next + len + 2;
    }

    Some((args, pos))
}

fn read_header(buf: &[u8], pos: usize, prefix: u8) -> Option<(usize, usize)> {
    if *buf.get(pos)? != prefix {
        return None;
    }
    let end = pos + buf[pos..].windows(2).position(|w| w == b"\r\n")?;
    let n = std::str::from_utf8(&buf[pos + 1..end]).ok()?.parse().ok()?;
    Some((n, end + 2))
}

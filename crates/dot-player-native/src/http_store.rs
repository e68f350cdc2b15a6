use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use dot_player::store::{delete_url, parse_delete_response, DeleteOutcome, SongStore};
use dot_player::DeleteError;

/// Deletes songs over HTTP. Each request runs on its own thread and reports
/// back through a channel drained once per frame.
pub struct HttpSongStore {
    agent: ureq::Agent,
    server_url: String,
    endpoint: String,
    tx: Sender<DeleteOutcome>,
    rx: Receiver<DeleteOutcome>,
}

impl HttpSongStore {
    pub fn new(server_url: &str, endpoint: &str, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        let (tx, rx) = channel::unbounded();
        Self {
            agent,
            server_url: server_url.to_string(),
            endpoint: endpoint.to_string(),
            tx,
            rx,
        }
    }
}

fn post(agent: &ureq::Agent, url: &str) -> Result<(), DeleteError> {
    let mut response = agent
        .post(url)
        .send_empty()
        .map_err(|e| DeleteError::Transport(e.to_string()))?;
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| DeleteError::BadResponse(e.to_string()))?;
    parse_delete_response(&body)
}

impl SongStore for HttpSongStore {
    fn delete_song(&mut self, song_id: &str) {
        let url = delete_url(&self.server_url, &self.endpoint, song_id);
        let agent = self.agent.clone();
        let tx = self.tx.clone();
        let song_id = song_id.to_string();

        let spawned = thread::Builder::new()
            .name(format!("delete-{song_id}"))
            .spawn(move || {
                log::debug!("POST {url}");
                let result = post(&agent, &url);
                let _ = tx.send(DeleteOutcome { song_id, result });
            });
        if let Err(err) = spawned {
            log::error!("Failed to spawn delete worker: {err}");
        }
    }

    fn drain_finished(&mut self) -> Vec<DeleteOutcome> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Answers a single request with `body` and returns the request line.
    fn serve_once(body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 2048];
            let n = stream.read(&mut buf).unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            request.lines().next().unwrap_or_default().to_string()
        });
        (addr, handle)
    }

    fn wait_for_outcome(store: &mut HttpSongStore) -> DeleteOutcome {
        let outcome = store.rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(store.drain_finished().is_empty());
        outcome
    }

    #[test]
    fn successful_delete_is_reported() {
        let (addr, server) = serve_once(r#"{"success": true}"#);
        let mut store = HttpSongStore::new(&addr, "/delete_song", Duration::from_secs(5));
        store.delete_song("42");

        let outcome = wait_for_outcome(&mut store);
        assert_eq!(outcome.song_id, "42");
        assert_eq!(outcome.result, Ok(()));
        assert_eq!(server.join().unwrap(), "POST /delete_song/42 HTTP/1.1");
    }

    #[test]
    fn refused_delete_carries_the_server_error() {
        let (addr, server) = serve_once(r#"{"success": false, "error": "Song not found"}"#);
        let mut store = HttpSongStore::new(&addr, "/delete_song", Duration::from_secs(5));
        store.delete_song("7");

        let outcome = wait_for_outcome(&mut store);
        assert_eq!(outcome.result, Err(DeleteError::Rejected("Song not found".to_string())));
        server.join().unwrap();
    }

    #[test]
    fn unreachable_server_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let mut store = HttpSongStore::new(&addr, "/delete_song", Duration::from_secs(2));
        store.delete_song("1");
        let outcome = wait_for_outcome(&mut store);
        assert!(matches!(outcome.result, Err(DeleteError::Transport(_))));
    }
}

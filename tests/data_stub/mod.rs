use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How the stub answers one relative data path.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Reply {
    Json(String),
    Status(u16),
    Slow(Duration, String),
}

/// Serves `routes` under `/site/` and counts requests per relative path.
pub struct DataStub {
    pub base_url: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl DataStub {
    pub fn spawn(routes: Vec<(&str, Reply)>) -> Self {
        let routes: HashMap<String, Reply> = routes
            .into_iter()
            .map(|(path, reply)| (path.to_owned(), reply))
            .collect();

        let server = tiny_http::Server::http("127.0.0.1:0").expect("start data stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/site/");

        let hits: Arc<Mutex<HashMap<String, usize>>> = Arc::default();
        let hits_for_server = Arc::clone(&hits);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                let Some(path) = url.strip_prefix("/site/") else {
                    let _ = request.respond(
                        tiny_http::Response::from_string("outside /site/").with_status_code(404),
                    );
                    continue;
                };
                let path = path.to_owned();
                *hits_for_server
                    .lock()
                    .expect("lock hits")
                    .entry(path.clone())
                    .or_default() += 1;

                let reply = routes.get(&path).cloned().unwrap_or(Reply::Status(404));
                thread::spawn(move || {
                    let (status, body) = match reply {
                        Reply::Json(body) => (200, body),
                        Reply::Status(status) => (status, format!("status {status}")),
                        Reply::Slow(delay, body) => {
                            thread::sleep(delay);
                            (200, body)
                        }
                    };
                    let header = tiny_http::Header::from_bytes(
                        &b"Content-Type"[..],
                        &b"application/json"[..],
                    )
                    .expect("build header");
                    let response = tiny_http::Response::from_string(body)
                        .with_status_code(status)
                        .with_header(header);
                    let _ = request.respond(response);
                });
            }
        });

        Self {
            base_url,
            hits,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits
            .lock()
            .expect("lock hits")
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

impl Drop for DataStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[allow(dead_code)]
pub const MANIFEST: &str = r#"{
    "version": "stub-1",
    "books": {
        "tanakh": {"torah": ["genesis"], "neviim": ["samuel1", "samuel2"]},
        "newTestament": {"gospels": ["luke"]}
    }
}"#;

#[allow(dead_code)]
pub const GENESIS: &str = r#"{
    "book": {"id": "genesis", "name": "Genesis", "hebrew": "בְּרֵאשִׁית", "characterCount": 3},
    "characters": [
        {"id": "abraham", "name": "Abraham", "hebrew": "אַבְרָהָם", "gender": "male",
         "meaning": "Father of many; formerly Abram", "references": ["Genesis 17:5"], "tags": ["patriarch"]},
        {"id": "sarah", "name": "Sarah", "gender": "female",
         "summary": "Shared in Abram's journey from Ur", "tags": ["matriarch"]},
        {"id": "hagar", "name": "Hagar", "gender": "female"}
    ]
}"#;

#[allow(dead_code)]
pub const SAMUEL: &str = r#"{
    "book": {"id": "samuel", "name": "Samuel"},
    "characters": [
        {"id": "hannah", "name": "Hannah", "gender": "female"},
        {"id": "david", "name": "David", "gender": "male"},
        {"id": "witch-of-endor", "name": "Medium of Endor"}
    ]
}"#;

#[allow(dead_code)]
pub const LUKE: &str = r#"{
    "book": {"id": "luke", "name": "Luke"},
    "characters": [
        {"id": "mary", "name": "Mary", "greek": "Μαρία", "gender": "female"},
        {"id": "zacchaeus", "name": "Zacchaeus", "gender": "male"}
    ]
}"#;

/// Writes the standard data set under `root` as a site directory.
#[allow(dead_code)]
pub fn write_site(root: &std::path::Path) -> anyhow::Result<()> {
    let books = root.join("assets").join("data").join("books");
    std::fs::create_dir_all(&books)?;
    std::fs::write(root.join("assets/data/manifest.json"), MANIFEST)?;
    std::fs::write(books.join("genesis.json"), GENESIS)?;
    std::fs::write(books.join("samuel.json"), SAMUEL)?;
    std::fs::write(books.join("luke.json"), LUKE)?;
    Ok(())
}

//! Local HTTP stand-in for the Google endpoints, used by the client tests.

use std::{
    collections::HashMap,
    net::TcpListener,
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use actix_web::{dev::ServerHandle, http::StatusCode, web, App, HttpResponse, HttpServer};
use serde_json::Value;

use crate::config::ApiConfig;

pub const TEST_KEY: &str = "test-key";

type Queries = Arc<Mutex<Vec<HashMap<String, String>>>>;

struct Reply {
    status: StatusCode,
    body: Value,
    queries: Queries,
}

async fn reply(
    reply: web::Data<Reply>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    reply.queries.lock().unwrap().push(query.into_inner());
    HttpResponse::build(reply.status).json(&reply.body)
}

/// Answers every request with a fixed status and JSON body and records the query string.
pub struct StubServer {
    url: String,
    queries: Queries,
    handle: ServerHandle,
    thread: Option<JoinHandle<()>>,
}

impl StubServer {
    pub fn start(status: u16, body: Value) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/json", listener.local_addr().unwrap());

        let queries = Queries::default();
        let data = web::Data::new(Reply {
            status: StatusCode::from_u16(status).unwrap(),
            body,
            queries: queries.clone(),
        });

        let (tx, rx) = mpsc::channel();
        let thread = thread::spawn(move || {
            actix_web::rt::System::new()
                .block_on(async move {
                    let server = HttpServer::new(move || {
                        App::new()
                            .app_data(data.clone())
                            .default_service(web::to(reply))
                    })
                    .workers(1)
                    .listen(listener)
                    .unwrap()
                    .run();
                    tx.send(server.handle()).unwrap();
                    server.await
                })
                .unwrap();
        });

        Self {
            url,
            queries,
            handle: rx.recv().unwrap(),
            thread: Some(thread),
        }
    }

    /// Client config pointing both endpoints at this server.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            api_key: Some(TEST_KEY.to_owned()),
            directions_url: self.url.clone(),
            geocode_url: self.url.clone(),
            timeout_secs: 5,
        }
    }

    pub fn queries(&self) -> Vec<HashMap<String, String>> {
        self.queries.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        actix_web::rt::System::new().block_on(self.handle.stop(false));
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use student_mentor::error::ClientError;
use student_mentor::message::{ReplyChunk, StudentProfile};
use student_mentor::services::mentor_client::{ClientMode, MentorClient};
use student_mentor::services::sse_decoder::ReplyStream;
use tokio::sync::Notify;

pub fn profile() -> StudentProfile {
    StudentProfile {
        id: "student-1".to_string(),
        name: "Maya Chen".to_string(),
        dream_job: "a marine biologist".to_string(),
        subjects: vec!["Biology".to_string()],
        ..Default::default()
    }
}

/// Serve `app` on an ephemeral local port and return its base url.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base url nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[derive(Clone, Copy)]
pub enum Step {
    Text(&'static str),
    Fail(&'static str),
    /// Wait until the test calls `release`.
    Gate,
}

/// Replays a fixed script for every exchange.
pub struct ScriptedClient {
    script: Vec<Step>,
    gate: Arc<Notify>,
    hold_open: bool,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(script: Vec<Step>) -> Self {
        Self {
            script,
            gate: Arc::new(Notify::new()),
            hold_open: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Also wait on the gate before handing back the reply stream, so the
    /// session sits in `Sending` until `release`.
    pub fn held_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MentorClient for ScriptedClient {
    fn mode(&self) -> ClientMode {
        ClientMode::Backend
    }

    async fn healthcheck(&self) -> Result<(), ClientError> {
        Ok(())
    }

    async fn send_message_stream(
        &self,
        _student_id: &str,
        _message: &str,
    ) -> Result<ReplyStream, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_open {
            self.gate.notified().await;
        }
        let script = self.script.clone();
        let gate = self.gate.clone();

        Ok(Box::pin(async_stream::stream! {
            for step in script {
                match step {
                    Step::Text(text) => {
                        yield Ok::<_, ClientError>(ReplyChunk::new(text));
                    }
                    Step::Fail(reason) => {
                        yield Err(ClientError::Stream(reason.to_string()));
                        return;
                    }
                    Step::Gate => gate.notified().await,
                }
            }
        }))
    }
}

use std::collections::HashMap;
use std::io::Write;

use anyhow::Context;
use student_mentor::config::MentorConfig;
use student_mentor::message::{ChatMessage, ChatRole};
use student_mentor::services::chat_session::{SendOutcome, StreamingChatSession, Transcript};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = MentorConfig::from_env().context("invalid mentor configuration")?;
    let session = StreamingChatSession::connect(&config).await;
    info!(mode = ?session.mode(), student = %session.profile().id, "mentor session ready");

    tokio::spawn(render_transcript(session.subscribe()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/clear" => {
                session.clear_transcript();
                println!("(transcript cleared)");
                continue;
            }
            _ => {}
        }

        let cancel = CancellationToken::new();
        let send = session.send(&line, cancel.clone());
        tokio::pin!(send);

        let outcome = tokio::select! {
            outcome = &mut send => outcome,
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                send.await
            }
        };

        match outcome {
            SendOutcome::Completed { activity: Some(activity), .. } => {
                info!(category = activity.category, alert = activity.alert.is_some(), "activity detected");
            }
            SendOutcome::Cancelled => println!("\n(stopped)"),
            _ => {}
        }
        println!();
    }

    Ok(())
}

/// Print model text as it streams in. Replaced content (a fallback after
/// a failed reply) is printed again in full.
async fn render_transcript(mut rx: watch::Receiver<Transcript>) {
    let mut printer = ReplyPrinter::default();

    loop {
        let transcript = rx.borrow_and_update().clone();
        {
            let mut out = std::io::stdout().lock();
            let _ = printer.render(&transcript, &mut out);
            let _ = out.flush();
        }

        if rx.changed().await.is_err() {
            break;
        }
    }
}

/// Remembers how much of each model reply has been printed.
#[derive(Default)]
struct ReplyPrinter {
    shown: HashMap<String, String>,
    last_len: usize,
}

impl ReplyPrinter {
    fn render<W: Write>(&mut self, transcript: &[ChatMessage], out: &mut W) -> std::io::Result<()> {
        if transcript.len() < self.last_len {
            // cleared, or an empty reply was dropped
            self.shown
                .retain(|id, _| transcript.iter().any(|m| &m.id == id));
        }
        self.last_len = transcript.len();

        for msg in transcript.iter().filter(|m| m.role == ChatRole::Model) {
            let seen = self.shown.entry(msg.id.clone()).or_default();
            if msg.content == *seen {
                continue;
            }
            if let Some(rest) = msg.content.strip_prefix(seen.as_str()) {
                write!(out, "{}", rest)?;
            } else {
                write!(out, "\n{}", msg.content)?;
            }
            *seen = msg.content.clone();
        }
        Ok(())
    }
}

// src/services/demo_client.rs
use std::time::Duration;

use async_trait::async_trait;

use crate::config::DEFAULT_DEMO_DELAY;
use crate::error::ClientError;
use crate::message::{ReplyChunk, StudentProfile};
use crate::services::mentor_client::{ClientMode, MentorClient};
use crate::services::sse_decoder::ReplyStream;

const CHUNK_CHARS: usize = 60;

/// Offline stand-in for the mentor backend. Replies are canned and streamed
/// in small pieces so the UI behaves the same as with the real service.
#[derive(Debug, Clone)]
pub struct DemoChatClient {
    first_name: String,
    delay: Duration,
}

impl DemoChatClient {
    pub fn new(profile: &StudentProfile) -> Self {
        Self {
            first_name: profile.first_name().to_string(),
            delay: DEFAULT_DEMO_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn canned_reply(&self, message: &str) -> String {
        format!(
            "Hi {}! I'm running in demo mode because the mentor backend isn't reachable yet. \
             Here's a canned thought about \"{}\".\n\n\
             Try exploring homework, wellness, or goal prompts while we finish setup.",
            self.first_name, message
        )
    }
}

/// Split on char boundaries into pieces of at most `size` chars.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|piece| piece.iter().collect())
        .collect()
}

#[async_trait]
impl MentorClient for DemoChatClient {
    fn mode(&self) -> ClientMode {
        ClientMode::Demo
    }

    async fn healthcheck(&self) -> Result<(), ClientError> {
        Ok(())
    }

    async fn send_message_stream(
        &self,
        _student_id: &str,
        message: &str,
    ) -> Result<ReplyStream, ClientError> {
        let chunks = chunk_text(&self.canned_reply(message), CHUNK_CHARS);
        let delay = self.delay;

        Ok(Box::pin(async_stream::stream! {
            for text in chunks {
                tokio::time::sleep(delay).await;
                yield Ok::<_, ClientError>(ReplyChunk { text });
            }
        }))
    }
}

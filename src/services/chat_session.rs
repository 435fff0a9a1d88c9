// src/services/chat_session.rs
use std::{fmt::Debug, sync::Arc};

use chrono::{Local, Timelike};
use futures::StreamExt;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::MentorConfig;
use crate::error::ClientError;
use crate::message::{ChatMessage, ChatRole, StudentProfile};
use crate::services::classifier::{ActivityDraft, ClassifierContext, classify};
use crate::services::demo_client::DemoChatClient;
use crate::services::mentor_client::{BackendChatClient, ClientMode, MentorClient};

pub type Transcript = Arc<Vec<ChatMessage>>;

pub const OFFLINE_FALLBACK: &str = "The mentor backend is offline. Switching to demo mode soon.";
pub const CONNECTION_FALLBACK: &str =
    "I'm having trouble connecting. Please check your internet and try again.";
pub const GENERIC_FALLBACK: &str =
    "I'm having a little trouble thinking right now. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sending,
    Streaming,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyMessage,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Completed {
        reply: String,
        activity: Option<ActivityDraft>,
    },
    /// Stopped by the caller. Text already streamed stays; a reply that
    /// never got any text is removed.
    Cancelled,
    Failed {
        fallback: &'static str,
    },
    Rejected(RejectReason),
}

enum ExchangeError {
    Cancelled,
    Transport(ClientError),
}

/// Pick the user-facing text that replaces a failed reply.
pub fn fallback_message(error: &str) -> &'static str {
    let lowered = error.to_lowercase();
    if lowered.contains("backend") {
        OFFLINE_FALLBACK
    } else if lowered.contains("network") || lowered.contains("fetch") {
        CONNECTION_FALLBACK
    } else {
        GENERIC_FALLBACK
    }
}

/// One conversation with the mentor.
///
/// The transcript and the session state are published on watch channels;
/// every mutation swaps in a new `Arc<Vec<_>>` (cloning only when a reader
/// still holds the previous snapshot), so subscribers always see whole,
/// consistent transcripts. At most one `send` runs at a time.
pub struct StreamingChatSession {
    client: Arc<dyn MentorClient>,
    profile: StudentProfile,
    classifier: ClassifierContext,
    transcript: watch::Sender<Transcript>,
    state: StateBus,
}

impl Debug for StreamingChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingChatSession")
            .field("mode", &self.client.mode())
            .field("student_id", &self.profile.id)
            .field("state", &self.state.get())
            .field("messages", &self.transcript.borrow().len())
            .finish()
    }
}

impl StreamingChatSession {
    pub fn new(client: Arc<dyn MentorClient>, profile: StudentProfile) -> Self {
        let classifier = ClassifierContext {
            student_id: profile.id.clone(),
            student_name: profile.name.clone(),
            academic_challenge_checkins: 0,
        };
        let (transcript, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            client,
            profile,
            classifier,
            transcript,
            state: StateBus::new(),
        }
    }

    /// Health-check the backend and open a session against it, or against the
    /// local demo client when that check fails. The choice holds for the
    /// session's lifetime.
    pub async fn connect(config: &MentorConfig) -> Self {
        let backend = BackendChatClient::new(&config.backend_url)
            .with_token(config.auth_token.clone())
            .with_endpoint(config.endpoint);

        let client: Arc<dyn MentorClient> = match backend.healthcheck().await {
            Ok(()) => {
                info!(base_url = %backend.base_url(), "connected to mentor backend");
                Arc::new(backend)
            }
            Err(e) => {
                warn!(error = %e, "backend unreachable, switching to demo mode");
                Arc::new(DemoChatClient::new(&config.profile).with_delay(config.demo_delay))
            }
        };

        let session = Self::new(client, config.profile.clone());
        session.push(welcome_message(&session.profile, session.mode()));
        session
    }

    pub fn with_academic_challenge_checkins(mut self, count: usize) -> Self {
        self.classifier.academic_challenge_checkins = count;
        self
    }

    pub fn mode(&self) -> ClientMode {
        self.client.mode()
    }

    pub fn profile(&self) -> &StudentProfile {
        &self.profile
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Transcript> {
        self.transcript.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// Latest state only; quick transitions may be skipped.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.current.subscribe()
    }

    /// Every transition in order, starting from the next one.
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<SessionState> {
        self.state.transitions.subscribe()
    }

    pub fn is_streaming(&self) -> bool {
        self.state() != SessionState::Idle
    }

    /// Drop every message. Refused while a reply is in flight.
    pub fn clear_transcript(&self) -> bool {
        if self.is_streaming() {
            return false;
        }
        self.transcript.send_replace(Arc::new(Vec::new()));
        true
    }

    /// Send one message and stream the mentor's reply into the transcript.
    pub async fn send(&self, message: &str, cancel: CancellationToken) -> SendOutcome {
        let message = message.trim();
        if message.is_empty() {
            return SendOutcome::Rejected(RejectReason::EmptyMessage);
        }

        let Some(_guard) = InFlight::acquire(&self.state) else {
            debug!("send ignored, a reply is already in flight");
            return SendOutcome::Rejected(RejectReason::Busy);
        };

        self.push(ChatMessage::user(message));
        let placeholder = ChatMessage::model_placeholder();
        let reply_id = placeholder.id.clone();
        self.push(placeholder);

        match self.stream_reply(message, &reply_id, &cancel).await {
            Ok(reply) => {
                debug!(chars = reply.len(), "mentor reply complete");
                SendOutcome::Completed {
                    reply,
                    activity: classify(message, &self.classifier),
                }
            }
            Err(ExchangeError::Cancelled) => {
                info!("mentor reply cancelled");
                self.remove_if_empty(&reply_id);
                SendOutcome::Cancelled
            }
            Err(ExchangeError::Transport(e)) => {
                error!(error = %e, "failed to stream mentor reply");
                self.state.set(SessionState::Errored);
                let fallback = fallback_message(&e.to_string());
                self.update(&reply_id, |msg| msg.content = fallback.to_string());
                SendOutcome::Failed { fallback }
            }
        }
    }

    async fn stream_reply(
        &self,
        message: &str,
        reply_id: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ExchangeError> {
        let mut stream = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ExchangeError::Cancelled),
            result = self.client.send_message_stream(&self.profile.id, message) => {
                result.map_err(ExchangeError::Transport)?
            }
        };
        self.state.set(SessionState::Streaming);

        let mut reply = String::new();
        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ExchangeError::Cancelled),
                next = stream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    reply.push_str(&chunk.text);
                    self.update(reply_id, |msg| msg.content.push_str(&chunk.text));
                }
                Some(Err(e)) => return Err(ExchangeError::Transport(e)),
                None => return Ok(reply),
            }
        }
    }

    fn push(&self, message: ChatMessage) {
        self.transcript
            .send_modify(|transcript| Arc::make_mut(transcript).push(message));
    }

    fn update<F>(&self, id: &str, apply: F)
    where
        F: FnOnce(&mut ChatMessage),
    {
        self.transcript.send_modify(|transcript| {
            if let Some(msg) = Arc::make_mut(transcript).iter_mut().find(|m| m.id == id) {
                apply(msg);
            }
        });
    }

    fn remove_if_empty(&self, id: &str) {
        self.transcript.send_if_modified(|transcript| {
            let Some(pos) = transcript
                .iter()
                .position(|m| m.id == id && m.content.is_empty())
            else {
                return false;
            };
            Arc::make_mut(transcript).remove(pos);
            true
        });
    }
}

const TRANSITION_BACKLOG: usize = 16;

/// Current exchange state plus an ordered log of every transition.
struct StateBus {
    current: watch::Sender<SessionState>,
    transitions: broadcast::Sender<SessionState>,
}

impl StateBus {
    fn new() -> Self {
        let (current, _) = watch::channel(SessionState::Idle);
        let (transitions, _) = broadcast::channel(TRANSITION_BACKLOG);
        Self {
            current,
            transitions,
        }
    }

    fn get(&self) -> SessionState {
        *self.current.borrow()
    }

    fn set(&self, next: SessionState) {
        self.current.send_replace(next);
        // no listeners is fine
        let _ = self.transitions.send(next);
    }

    /// Move `Idle` to `Sending`; false if an exchange is already running.
    fn try_begin(&self) -> bool {
        let begun = self.current.send_if_modified(|current| {
            if *current == SessionState::Idle {
                *current = SessionState::Sending;
                true
            } else {
                false
            }
        });
        if begun {
            let _ = self.transitions.send(SessionState::Sending);
        }
        begun
    }
}

/// Holds the session out of `Idle` for the duration of one exchange and
/// puts it back on drop, including when the `send` future is dropped.
struct InFlight<'a> {
    state: &'a StateBus,
}

impl<'a> InFlight<'a> {
    fn acquire(state: &'a StateBus) -> Option<Self> {
        state.try_begin().then(|| Self { state })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.set(SessionState::Idle);
    }
}

pub fn welcome_message(profile: &StudentProfile, mode: ClientMode) -> ChatMessage {
    match mode {
        ClientMode::Backend => {
            let hour = Local::now().hour();
            let time_of_day = if hour < 12 {
                "morning"
            } else if hour < 18 {
                "afternoon"
            } else {
                "evening"
            };
            let dream = if profile.dream_job.is_empty() {
                "your goals".to_string()
            } else {
                format!("your dream of becoming {}", profile.dream_job)
            };
            let subject = profile
                .subjects
                .first()
                .map_or("your studies", String::as_str);

            ChatMessage::new(
                "model-welcome",
                ChatRole::Model,
                format!(
                    "Good {}, {}!\n\nI'm your personal AI mentor, here to support you in achieving {}.\n\n\
                     Whether you need help with {}, want to talk about your goals, or just need someone \
                     to listen, I'm here for you. What's on your mind today?",
                    time_of_day, profile.name, dream, subject
                ),
            )
        }
        ClientMode::Demo => ChatMessage::new(
            "demo-welcome",
            ChatRole::Model,
            format!(
                "Hello {}!\n\nThe mentor brain is warming up, so you're chatting with a local demo \
                 agent until the backend connects.",
                profile.first_name()
            ),
        ),
    }
}

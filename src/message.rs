// src/message.rs
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One entry of the transcript shown to the student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(prefix: &str, role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: format!("{}-{}", prefix, Uuid::new_v4()),
            role,
            content: content.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", ChatRole::User, content)
    }

    /// Empty model reply that stream chunks get appended to.
    pub fn model_placeholder() -> Self {
        Self::new("model", ChatRole::Model, String::new())
    }
}

// Body of POST /chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPayload {
    pub student_id: String,
    pub message: String,
}

// Body of POST /onboarding/chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingChatPayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyChunk {
    pub text: String,
}

impl ReplyChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub dream_job: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_style: Option<String>,
    #[serde(default)]
    pub academic_goals: String,
    #[serde(default)]
    pub career_aspirations: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_models: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default)]
    pub sports_activities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness_goals: Option<String>,
    #[serde(default)]
    pub academic_challenges: Vec<String>,
    #[serde(default)]
    pub personal_challenges: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mental_health_concerns: Option<String>,
}

impl StudentProfile {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

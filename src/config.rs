// src/config.rs
use std::{env, time::Duration};

use crate::error::ConfigError;
use crate::message::StudentProfile;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_DEMO_DELAY: Duration = Duration::from_millis(110);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatEndpoint {
    /// `POST /chat` with the student id in the body.
    #[default]
    Mentor,
    /// `POST /onboarding/chat`, student resolved from the bearer token.
    Onboarding,
}

impl ChatEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            ChatEndpoint::Mentor => "/chat",
            ChatEndpoint::Onboarding => "/onboarding/chat",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MentorConfig {
    pub backend_url: String,
    pub auth_token: Option<String>,
    pub endpoint: ChatEndpoint,
    pub demo_delay: Duration,
    pub profile: StudentProfile,
}

impl Default for MentorConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            auth_token: None,
            endpoint: ChatEndpoint::Mentor,
            demo_delay: DEFAULT_DEMO_DELAY,
            profile: StudentProfile {
                id: "demo-student".to_string(),
                name: "Student".to_string(),
                ..Default::default()
            },
        }
    }
}

impl MentorConfig {
    /// Read the config from `MENTOR_*` variables. Call `dotenvy::dotenv()`
    /// first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        if let Some(url) = get("MENTOR_BACKEND_URL") {
            if url.is_empty() {
                return Err(ConfigError::Empty { key: "MENTOR_BACKEND_URL" });
            }
            config.backend_url = url;
        }
        config.backend_url = normalize_base_url(&config.backend_url);

        config.auth_token = get("MENTOR_AUTH_TOKEN").filter(|t| !t.is_empty());

        if let Some(endpoint) = get("MENTOR_CHAT_ENDPOINT") {
            config.endpoint = match endpoint.to_lowercase().as_str() {
                "chat" | "mentor" => ChatEndpoint::Mentor,
                "onboarding" => ChatEndpoint::Onboarding,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "MENTOR_CHAT_ENDPOINT",
                        value: endpoint,
                    });
                }
            };
        }

        if let Some(delay) = get("MENTOR_DEMO_DELAY_MS") {
            let millis = delay.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: "MENTOR_DEMO_DELAY_MS",
                value: delay.clone(),
            })?;
            config.demo_delay = Duration::from_millis(millis);
        }

        if let Some(id) = get("MENTOR_STUDENT_ID") {
            if id.is_empty() {
                return Err(ConfigError::Empty { key: "MENTOR_STUDENT_ID" });
            }
            config.profile.id = id;
        }
        if let Some(name) = get("MENTOR_STUDENT_NAME").filter(|n| !n.is_empty()) {
            config.profile.name = name;
        }
        if let Some(job) = get("MENTOR_DREAM_JOB") {
            config.profile.dream_job = job;
        }
        if let Some(subjects) = get("MENTOR_SUBJECTS") {
            config.profile.subjects = subjects
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }
}

pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = MentorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.endpoint, ChatEndpoint::Mentor);
        assert_eq!(config.demo_delay, DEFAULT_DEMO_DELAY);
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn reads_overrides_and_strips_trailing_slash() {
        let config = MentorConfig::from_lookup(lookup(&[
            ("MENTOR_BACKEND_URL", "http://mentor.local:9000/"),
            ("MENTOR_AUTH_TOKEN", "tok"),
            ("MENTOR_CHAT_ENDPOINT", "onboarding"),
            ("MENTOR_DEMO_DELAY_MS", "5"),
            ("MENTOR_STUDENT_ID", "s-42"),
            ("MENTOR_STUDENT_NAME", "Ada Lovelace"),
            ("MENTOR_SUBJECTS", "Math, Physics,,"),
        ]))
        .unwrap();

        assert_eq!(config.backend_url, "http://mentor.local:9000");
        assert_eq!(config.auth_token.as_deref(), Some("tok"));
        assert_eq!(config.endpoint, ChatEndpoint::Onboarding);
        assert_eq!(config.demo_delay, Duration::from_millis(5));
        assert_eq!(config.profile.id, "s-42");
        assert_eq!(config.profile.first_name(), "Ada");
        assert_eq!(config.profile.subjects, vec!["Math", "Physics"]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            MentorConfig::from_lookup(lookup(&[("MENTOR_DEMO_DELAY_MS", "soon")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            MentorConfig::from_lookup(lookup(&[("MENTOR_CHAT_ENDPOINT", "admin")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            MentorConfig::from_lookup(lookup(&[("MENTOR_STUDENT_ID", "  ")])),
            Err(ConfigError::Empty { .. })
        ));
    }
}

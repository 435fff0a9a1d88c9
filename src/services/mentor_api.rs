// src/services/mentor_api.rs
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::config::normalize_base_url;
use crate::error::ClientError;

/// Profile document as stored by the backend. Unknown fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfileRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_complete: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalsResponse {
    pub goals: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeworkResponse {
    #[serde(default)]
    pub homework: Vec<Value>,
}

#[derive(Serialize)]
struct GoalsPayload<'a> {
    goals: &'a Value,
}

/// Authenticated JSON endpoints next to the chat stream.
#[derive(Debug, Clone)]
pub struct MentorApi {
    http: Client,
    base_url: String,
    token: String,
}

impl MentorApi {
    pub fn new(base_url: &str, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: normalize_base_url(base_url),
            token: token.into(),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> RequestBuilder {
        self.http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(body)
    }

    /// `None` when the student has no profile yet.
    pub async fn get_profile(&self) -> Result<Option<StudentProfileRecord>, ClientError> {
        let response = self.get("/profile").send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response, "Failed to load profile").await.map(Some)
    }

    pub async fn update_profile(
        &self,
        fields: &Map<String, Value>,
    ) -> Result<StudentProfileRecord, ClientError> {
        let response = self.post("/profile/update", fields).send().await?;
        read_json(response, "Failed to update profile").await
    }

    /// Submit a daily check-in; returns the stored record.
    pub async fn post_check_in(&self, check_in: &Map<String, Value>) -> Result<Value, ClientError> {
        let response = self.post("/checkin", check_in).send().await?;
        read_json(response, "Failed to submit check-in").await
    }

    pub async fn get_goals(&self) -> Result<GoalsResponse, ClientError> {
        let response = self.get("/goals").send().await?;
        read_json(response, "Failed to load goals").await
    }

    pub async fn update_goals(&self, goals: &Value) -> Result<GoalsResponse, ClientError> {
        let response = self.post("/goal", &GoalsPayload { goals }).send().await?;
        read_json(response, "Failed to save goals").await
    }

    pub async fn get_homework(&self) -> Result<HomeworkResponse, ClientError> {
        let response = self.get("/homework").send().await?;
        read_json(response, "Failed to load homework").await
    }
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    context: &'static str,
) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Request {
            context,
            status: status.as_u16(),
            body,
        });
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

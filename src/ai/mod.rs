//! Brain-dump text-to-tasks integration.
//!
//! Sends free text to an OpenAI-compatible chat-completions endpoint and
//! parses the answer into structured tasks. A convenience feature: the
//! rest of the application works without it.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::models::Task;

#[derive(Debug)]
pub enum AiError {
    /// No api_key in config
    NotConfigured,
    /// Transport-level failure
    Http(String),
    /// Server answered with a non-success status
    Status(u16),
    /// Model output could not be parsed into tasks
    Parse(String),
}

impl std::fmt::Display for AiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiError::NotConfigured => {
                write!(f, "AI not configured. Add an ai.api_key to config.")
            }
            AiError::Http(e) => write!(f, "HTTP error: {}", e),
            AiError::Status(code) => write!(f, "AI endpoint returned {}", code),
            AiError::Parse(e) => write!(f, "Failed to parse model output: {}", e),
        }
    }
}

impl std::error::Error for AiError {}

/// One task extracted from free text.
#[derive(Debug, Clone, Deserialize)]
pub struct BrainDumpTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// "YYYY-MM-DD", when the model inferred one
    #[serde(default)]
    pub date: Option<String>,
    /// "HH:MM", when the model inferred one
    #[serde(default)]
    pub time: Option<String>,
}

impl BrainDumpTask {
    /// Converts into a regular task, resolving date and time into a due
    /// timestamp when both parse.
    pub fn into_task(self) -> Task {
        let mut task = Task::new(self.title).with_description(self.description);
        if let Some(due) = resolve_due(self.date.as_deref(), self.time.as_deref()) {
            task = task.with_due_date(due);
        }
        task
    }
}

fn resolve_due(date: Option<&str>, time: Option<&str>) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date?, "%Y-%m-%d").ok()?;
    let time = match time.and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok()) {
        Some(t) => t,
        None => NaiveTime::from_hms_opt(9, 0, 0)?,
    };
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

pub struct BrainDumpClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl BrainDumpClient {
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let api_key = config.api_key.clone().ok_or(AiError::NotConfigured)?;
        Ok(Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }

    /// Turns free text into structured tasks.
    pub async fn generate_tasks(&self, input: &str) -> Result<Vec<BrainDumpTask>, AiError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(Utc::now().date_naive()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: input.to_string(),
                },
            ],
            temperature: 0.7,
        };

        let url = format!("{}/chat/completions", self.api_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AiError::Status(response.status().as_u16()));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;

        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("[]");

        parse_tasks(content)
    }
}

fn system_prompt(today: NaiveDate) -> String {
    format!(
        "You are a productivity assistant. Extract concrete, actionable tasks \
         from the user's text. Today is {today}. Resolve relative dates \
         (\"tomorrow\", \"on friday\") against that. Respond ONLY with a JSON \
         array of objects shaped {{\"title\": string, \"description\": string, \
         \"date\": \"YYYY-MM-DD\" or null, \"time\": \"HH:MM\" or null}}. \
         When no date is mentioned use \"{today}\". When no time is mentioned \
         use null."
    )
}

/// Parses the model's answer, tolerating prose around the JSON array.
fn parse_tasks(content: &str) -> Result<Vec<BrainDumpTask>, AiError> {
    let json = extract_json_array(content);
    serde_json::from_str(json).map_err(|e| AiError::Parse(e.to_string()))
}

/// Slices from the first `[` to the last `]`, falling back to an empty
/// array when no brackets are found.
fn extract_json_array(text: &str) -> &str {
    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => "[]",
    }
}

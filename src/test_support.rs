//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::pipeline::PipelineSettings;
use crate::core::store::{IdeaStore, StoreError};
use crate::delivery::Messenger;
use crate::inference::{GenerationProvider, GenerationRequest, GenerationResult, PromptPair};

/// Owned copy of a request a provider received.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
}

/// Provider that returns a fixed result and records every request.
pub struct ScriptedProvider {
    result: GenerationResult,
    seen: Mutex<Vec<SeenRequest>>,
}

impl ScriptedProvider {
    pub fn succeeding(text: &str) -> Self {
        Self {
            result: GenerationResult::completed(200, text.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: Option<u16>, diagnostic: &str) -> Self {
        Self {
            result: GenerationResult::failed(status, diagnostic),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerationRequest<'_>) -> GenerationResult {
        self.seen.lock().unwrap().push(SeenRequest {
            system_prompt: request.system_prompt.to_string(),
            user_prompt: request.user_prompt.to_string(),
            model: request.model.to_string(),
        });
        self.result.clone()
    }
}

/// Messenger that records `(destination, message)` pairs.
pub struct RecordingMessenger {
    accept: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMessenger {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            accept: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, destination_id: &str, message: &str) -> bool {
        self.sent
            .lock()
            .unwrap()
            .push((destination_id.to_string(), message.to_string()));
        self.accept
    }
}

/// In-memory store. `broken()` fails every call; `rejecting_appends()`
/// reads fine but refuses writes.
#[derive(Default)]
pub struct MemoryStore {
    ideas: Mutex<Vec<String>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn with(ideas: &[&str]) -> Self {
        Self {
            ideas: Mutex::new(ideas.iter().map(|s| s.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn broken() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn rejecting_appends(ideas: &[&str]) -> Self {
        Self {
            fail_writes: true,
            ..Self::with(ideas)
        }
    }
}

impl IdeaStore for MemoryStore {
    fn list_all(&self) -> Result<Vec<String>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows));
        }
        Ok(self.ideas.lock().unwrap().clone())
    }

    fn append(&self, text: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows));
        }
        self.ideas.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub fn test_settings() -> PipelineSettings {
    PipelineSettings {
        prompt: PromptPair::new(
            "You suggest one weekend activity.",
            "Suggest an activity. Start with \"Идея: \".",
        ),
        model: "test-model".to_string(),
        dedup_lead_in: "Do not suggest these again:".to_string(),
        idea_marker: crate::core::idea::DEFAULT_IDEA_MARKER.to_string(),
        chat_id: "main-chat".to_string(),
        admin_chat_id: "admin-chat".to_string(),
        admin_prefix: "Generation failed:".to_string(),
    }
}

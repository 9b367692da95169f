//! # Run Pipeline
//!
//! One linear pass per invocation:
//!
//! ```text
//! Start ──► PromptBuilt ──► Generated ──► Delivered ──► Persisted
//!                              │              │
//!                              ▼              └──(send failed)──► stop
//!                        FailedNotify
//! ```
//!
//! An idea is written to the store only after the primary destination has
//! acknowledged the message, so a failed delivery never burns an idea.

use log::{error, info, warn};

use crate::core::idea::extract_idea;
use crate::core::store::{IdeaStore, StoreError};
use crate::delivery::Messenger;
use crate::inference::{GenerationProvider, GenerationRequest, PromptPair};

/// Everything one run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub prompt: PromptPair,
    pub model: String,
    /// Text placed before the quoted list of already used ideas.
    pub dedup_lead_in: String,
    pub idea_marker: String,
    pub chat_id: String,
    pub admin_chat_id: String,
    /// First line of the admin notification sent on generation failure.
    pub admin_prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    PromptBuilt,
    Generated,
    Delivered,
    Persisted,
    FailedNotify,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Delivered and stored.
    Persisted { idea: String },
    /// Delivered, but the marker was missing so nothing was stored.
    DeliveredWithoutIdea,
    /// Delivered, but writing the idea failed.
    PersistFailed { idea: String, error: String },
    /// The primary destination did not acknowledge the message.
    DeliveryFailed,
    /// The provider failed; the diagnostic went to the admin destination.
    GenerationFailed {
        diagnostic: String,
        admin_notified: bool,
    },
}

impl RunOutcome {
    /// Last stage the run reached.
    pub fn stage(&self) -> Stage {
        match self {
            RunOutcome::Persisted { .. } => Stage::Persisted,
            RunOutcome::DeliveredWithoutIdea | RunOutcome::PersistFailed { .. } => Stage::Delivered,
            RunOutcome::DeliveryFailed => Stage::Generated,
            RunOutcome::GenerationFailed { .. } => Stage::FailedNotify,
        }
    }
}

pub struct Pipeline<'a> {
    provider: &'a dyn GenerationProvider,
    store: &'a dyn IdeaStore,
    messenger: &'a dyn Messenger,
    settings: &'a PipelineSettings,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        provider: &'a dyn GenerationProvider,
        store: &'a dyn IdeaStore,
        messenger: &'a dyn Messenger,
        settings: &'a PipelineSettings,
    ) -> Self {
        Self {
            provider,
            store,
            messenger,
            settings,
        }
    }

    /// The prompt for this run: the configured pair plus the dedup clause.
    pub fn build_prompt(&self, used_ideas: &[String]) -> PromptPair {
        let mut prompt = self.settings.prompt.clone();
        prompt.exclude_ideas(&self.settings.dedup_lead_in, used_ideas);
        prompt
    }

    /// Executes one pass. Only a failure to read the store is an error;
    /// everything after that is reported through [`RunOutcome`].
    pub async fn run(&self) -> Result<RunOutcome, StoreError> {
        enter(Stage::Start);
        let used_ideas = self.store.list_all()?;

        let prompt = self.build_prompt(&used_ideas);
        enter(Stage::PromptBuilt);
        info!(
            "Prompt built with {} used ideas for {} model {}",
            used_ideas.len(),
            self.provider.name(),
            self.settings.model
        );

        let result = self
            .provider
            .generate(GenerationRequest {
                system_prompt: &prompt.system_prompt,
                user_prompt: &prompt.user_prompt,
                model: &self.settings.model,
            })
            .await;

        if !result.success {
            enter(Stage::FailedNotify);
            let notice = admin_notice(&self.settings.admin_prefix, result.status, &result.text);
            let admin_notified = self
                .messenger
                .send(&self.settings.admin_chat_id, &notice)
                .await;
            if !admin_notified {
                error!(
                    "Admin notification via {} failed; diagnostic was: {}",
                    self.messenger.name(),
                    result.text
                );
            }
            return Ok(RunOutcome::GenerationFailed {
                diagnostic: result.text,
                admin_notified,
            });
        }
        enter(Stage::Generated);

        if !self.messenger.send(&self.settings.chat_id, &result.text).await {
            warn!("Delivery via {} failed, idea not stored", self.messenger.name());
            return Ok(RunOutcome::DeliveryFailed);
        }
        enter(Stage::Delivered);

        let Some(idea) = extract_idea(&result.text, &self.settings.idea_marker) else {
            warn!(
                "Marker {:?} not found in delivered text, idea not stored",
                self.settings.idea_marker
            );
            return Ok(RunOutcome::DeliveredWithoutIdea);
        };

        if let Err(e) = self.store.append(idea) {
            error!("Failed to store idea {:?}: {}", idea, e);
            return Ok(RunOutcome::PersistFailed {
                idea: idea.to_string(),
                error: e.to_string(),
            });
        }
        enter(Stage::Persisted);

        Ok(RunOutcome::Persisted {
            idea: idea.to_string(),
        })
    }
}

fn enter(stage: Stage) {
    info!("Pipeline stage: {:?}", stage);
}

/// Formats the admin message. The payload goes in a code block so stray
/// Markdown in provider errors cannot break the Telegram parser.
///
/// The diagnostic is copied verbatim except for triple backticks, which
/// become `'''` so they cannot close the block early.
fn admin_notice(prefix: &str, status: Option<u16>, diagnostic: &str) -> String {
    let status = status
        .map(|s| format!(" (HTTP {s})"))
        .unwrap_or_default();
    format!(
        "{}{}\n```\n{}\n```",
        prefix,
        status,
        diagnostic.replace("```", "'''")
    )
}

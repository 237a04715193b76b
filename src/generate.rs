// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// Generation orchestration.
//
// Builds the request payload for a feature from persisted settings,
// starts the stream via the backend client, and runs the session to
// completion. Holds the single abort slot: starting a new generation
// cancels whichever one is still in flight. The superseded session ends
// quietly — only the newest request owns the UI.

use crate::client::{ApiError, BackendClient};
use crate::feature::{Feature, GenerationRequest};
use crate::notify::{LifecycleMessage, Notifier};
use crate::render::RenderTarget;
use crate::settings::{keys, SettingsError, SettingsStore};
use crate::stream::{SessionOutcome, StreamSession};
use std::sync::Arc;
use std::sync::Mutex;
use tokio::sync::oneshot;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("no element source captured, pick an element first")]
    MissingElementSource,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Runs generations against the backend, one authoritative request at a
/// time.
pub struct Generator {
    client: Arc<dyn BackendClient>,
    settings: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
    abort_slot: Mutex<Option<oneshot::Sender<()>>>,
}

impl Generator {
    pub fn new(
        client: Arc<dyn BackendClient>,
        settings: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            settings,
            notifier,
            abort_slot: Mutex::new(None),
        }
    }

    /// Run one generation, rendering into `target`.
    ///
    /// HTTP-level failures notify the lifecycle bus (the result surface
    /// shows the status) before returning the error to the caller.
    pub async fn run(
        &self,
        feature: Feature,
        target: &dyn RenderTarget,
    ) -> Result<SessionOutcome, GenerateError> {
        let (request, language) = self.build_request(feature).await?;

        let stream = match self.client.start_stream(feature, &request).await {
            Ok(stream) => stream,
            Err(err) => {
                self.notifier
                    .notify(LifecycleMessage::error(err.error_key()));
                return Err(err.into());
            }
        };

        let abort_rx = self.arm_abort();
        let session = StreamSession::new(feature, language, target, self.notifier.as_ref());
        Ok(session.run(stream, Some(abort_rx)).await)
    }

    /// Cancel the previous in-flight request, if any, and install a
    /// fresh abort channel for the one about to start.
    fn arm_abort(&self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let previous = self
            .abort_slot
            .lock()
            .expect("abort slot poisoned")
            .replace(tx);
        if let Some(prev) = previous {
            // Receiver may already be gone; either way the old request ends.
            let _ = prev.send(());
        }
        rx
    }

    /// Assemble the payload the way the capture surface recorded it.
    async fn build_request(
        &self,
        feature: Feature,
    ) -> Result<(GenerationRequest, String), GenerateError> {
        let source_code = self
            .settings
            .get_string(keys::ELEMENT_SOURCE)
            .await?
            .ok_or(GenerateError::MissingElementSource)?;

        let mut request = GenerationRequest {
            source_code,
            ..Default::default()
        };
        let mut language = String::new();

        if feature.is_code_generation() {
            request.base_url = self.settings.get_string(keys::SITE_URL).await?;
            request.framework = self.settings.get_string(keys::FRAMEWORK_SELECTED).await?;
            request.language = self.settings.get_string(keys::LANGUAGE_SELECTED).await?;
            request.pom = self.settings.get_string(keys::POM).await?;
            language = request.language.clone().unwrap_or_default();
        }

        if feature == Feature::AutomateFromIdeas {
            request.ideas = self
                .settings
                .get(keys::IDEAS)
                .await?
                .and_then(|v| serde_json::from_value(v).ok());
        }

        if let Some(api_key) = self.settings.get_string(keys::OPENAI_API_KEY).await? {
            request.open_ai_api_key = Some(api_key);
        }
        if let Some(model) = self.settings.get_string(keys::OPENAI_MODEL).await? {
            tracing::debug!(%model, "model override in use");
            request.model = Some(model);
        }

        Ok((request, language))
    }
}

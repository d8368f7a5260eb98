use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::config::Settings;
use crate::error::{GenerationError, ReadingError, USER_ERROR_MESSAGE};
use crate::gemini::{build_prompt, TextGenerator};
use crate::zodiac::ZodiacSign;

/// What the display surface renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestState {
    pub selected_sign: String,
    pub reading_text: String,
    pub is_loading: bool,
    pub error_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Failed,
}

impl RequestState {
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if !self.reading_text.is_empty() {
            Phase::Success
        } else if !self.error_message.is_empty() {
            Phase::Failed
        } else {
            Phase::Idle
        }
    }

    /// Text fields are empty while loading, and never both set.
    pub fn is_consistent(&self) -> bool {
        let has_reading = !self.reading_text.is_empty();
        let has_error = !self.error_message.is_empty();
        if self.is_loading {
            !has_reading && !has_error
        } else {
            !(has_reading && has_error)
        }
    }
}

struct Inner {
    state: RequestState,
    // Ticket of the most recently issued request. Only its completion may write.
    latest_ticket: u64,
}

/// Owns the `RequestState` and drives one reading request per selection.
///
/// Overlapping requests are allowed. Each one is tagged with a ticket when it
/// starts and a completion is dropped if a newer request was issued since, so
/// the state always reflects the latest selection.
pub struct HoroscopeController {
    settings: Settings,
    generator: Arc<dyn TextGenerator>,
    inner: Mutex<Inner>,
    updates: broadcast::Sender<RequestState>,
}

impl HoroscopeController {
    pub fn new(settings: Settings, generator: Arc<dyn TextGenerator>) -> Self {
        let (updates, _) = broadcast::channel(32);
        Self {
            settings,
            generator,
            inner: Mutex::new(Inner {
                state: RequestState::default(),
                latest_ticket: 0,
            }),
            updates,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> RequestState {
        self.lock().state.clone()
    }

    /// Receives a snapshot after every state change.
    pub fn subscribe(&self) -> broadcast::Receiver<RequestState> {
        self.updates.subscribe()
    }

    /// Requests a reading for `sign` and returns the state once this request
    /// has completed (or been superseded).
    pub async fn request_reading(&self, sign: &'static ZodiacSign) -> RequestState {
        let ticket = self.begin(sign);
        let outcome = self.fetch(sign).await;
        self.finish(ticket, sign, outcome)
    }

    fn begin(&self, sign: &ZodiacSign) -> u64 {
        let mut inner = self.lock();
        inner.latest_ticket += 1;
        inner.state = RequestState {
            selected_sign: sign.name.to_string(),
            reading_text: String::new(),
            is_loading: true,
            error_message: String::new(),
        };
        let ticket = inner.latest_ticket;
        self.publish(&inner.state);
        info!(sign = sign.name, ticket, "Reading requested");
        ticket
    }

    async fn fetch(&self, sign: &ZodiacSign) -> Result<String, ReadingError> {
        let api_key = self.settings.credential().ok_or(ReadingError::Configuration)?;
        let prompt = build_prompt(sign.name);
        let text = self
            .generator
            .generate(api_key, &self.settings.model, &prompt)
            .await?;
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse.into());
        }
        Ok(text)
    }

    fn finish(
        &self,
        ticket: u64,
        sign: &ZodiacSign,
        outcome: Result<String, ReadingError>,
    ) -> RequestState {
        let mut inner = self.lock();
        if ticket != inner.latest_ticket {
            debug!(
                sign = sign.name,
                ticket,
                latest = inner.latest_ticket,
                "Discarding result of superseded request"
            );
            return inner.state.clone();
        }

        match outcome {
            Ok(text) => {
                inner.state.reading_text = text;
                inner.state.error_message.clear();
                info!(sign = sign.name, ticket, "Reading received");
            }
            Err(e) => {
                error!(sign = sign.name, ticket, error = %e, "Reading request failed");
                inner.state.reading_text.clear();
                inner.state.error_message = e.user_message().to_string();
            }
        }
        inner.state.is_loading = false;
        self.publish(&inner.state);
        inner.state.clone()
    }

    fn publish(&self, state: &RequestState) {
        // No subscribers is fine
        let _ = self.updates.send(state.clone());
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for HoroscopeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoroscopeController")
            .field("model", &self.settings.model)
            .field("state", &self.state())
            .finish()
    }
}

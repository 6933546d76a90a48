//! # Journal Submission Pipeline
//!
//! Validates trade annotations locally, then either simulates the AI review
//! (demo mode) or PATCHes the journal endpoint and invalidates the cached
//! journal entry of that position (live mode).

use crate::app::events::{DashboardEvent, EventSink, InvalidationReason};
use crate::cache::{ResourceCache, ResourceKey, ResourceKind, ResourceScope};
use crate::core::error::{AppError, Result};
use crate::core::service::ApiService;
use crate::debug::with_trace_id_async;
use crate::demo::DemoDataProvider;
use crate::session::ConnectionStateTracker;
use crate::utils::validation::{
    validate_emotion, validate_exit_price, validate_notes, validate_rating, ValidationResult,
};
use shared::dto::{Emotion, JournalPayload, JournalResponse};
use std::sync::Arc;
use std::time::Duration;

/// Cache key of the journal entry of `position_id`.
pub fn journal_key(wallet: &str, position_id: &str) -> ResourceKey {
    ResourceKey::wallet_scoped(ResourceKind::Journal, wallet).with_params(position_id)
}

/// Raw form input, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalDraft {
    pub notes: Option<String>,
    pub emotion: Option<String>,
    pub rating: Option<i64>,
    pub hypothetical_exit_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Field-level validation outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// All field errors folded into one [`AppError::Validation`].
    pub fn to_error(&self) -> Option<AppError> {
        if self.is_valid() {
            return None;
        }
        let fields: Vec<&str> = self.errors.iter().map(|e| e.field).collect();
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        Some(AppError::validation(fields.join(", "), messages.join("; ")))
    }

    fn check(&mut self, field: &'static str, result: ValidationResult) {
        if !result.is_valid {
            self.errors.push(FieldError {
                field,
                message: result.error.unwrap_or_else(|| "Invalid value".to_string()),
            });
        }
    }
}

/// Validate a draft. Empty notes and blank emotion count as omitted.
pub fn validate(draft: &JournalDraft) -> ValidationReport {
    let mut report = ValidationReport::default();

    if let Some(notes) = &draft.notes {
        report.check("notes", validate_notes(notes));
    }
    if let Some(emotion) = draft.emotion.as_deref().filter(|e| !e.trim().is_empty()) {
        report.check("emotion", validate_emotion(emotion));
    }
    if let Some(rating) = draft.rating {
        report.check("rating", validate_rating(rating));
    }
    if let Some(price) = draft.hypothetical_exit_price {
        report.check("hypotheticalExitPrice", validate_exit_price(price));
    }

    report
}

/// Validate and convert a draft into the wire payload.
pub fn to_payload(draft: &JournalDraft) -> Result<JournalPayload> {
    if let Some(error) = validate(draft).to_error() {
        return Err(error);
    }

    let emotion = match draft.emotion.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(e) => Some(e.parse::<Emotion>().map_err(|msg| AppError::validation("emotion", msg))?),
        None => None,
    };
    let rating = match draft.rating {
        Some(r) => Some(u8::try_from(r).map_err(|e| AppError::validation("rating", e.to_string()))?),
        None => None,
    };

    Ok(JournalPayload {
        notes: draft.notes.clone().filter(|n| !n.is_empty()),
        emotion,
        rating,
        hypothetical_exit_price: draft.hypothetical_exit_price,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    Demo,
    Live,
}

/// A completed submission.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalSubmission {
    pub position_id: String,
    pub payload: JournalPayload,
    pub mode: SubmissionMode,
    pub response: JournalResponse,
}

pub struct JournalSubmissionPipeline {
    api: Arc<dyn ApiService>,
    cache: ResourceCache,
    tracker: Arc<ConnectionStateTracker>,
    demo: DemoDataProvider,
    demo_latency: Duration,
    events: EventSink,
}

impl JournalSubmissionPipeline {
    pub fn new(
        api: Arc<dyn ApiService>,
        cache: ResourceCache,
        tracker: Arc<ConnectionStateTracker>,
        demo_latency: Duration,
        events: EventSink,
    ) -> Self {
        Self {
            api,
            cache,
            tracker,
            demo: DemoDataProvider::new(),
            demo_latency,
            events,
        }
    }

    pub fn validate(&self, draft: &JournalDraft) -> ValidationReport {
        validate(draft)
    }

    /// Validate and submit. Validation failures never reach the network;
    /// a failed PATCH leaves cached journal data untouched.
    pub async fn submit(&self, position_id: &str, draft: &JournalDraft) -> Result<JournalSubmission> {
        let payload = to_payload(draft)?;

        with_trace_id_async(|_trace_id| async move {
            match self.tracker.wallet_id() {
                None => self.submit_demo(position_id, payload).await,
                Some(wallet) => self.submit_live(&wallet, position_id, payload).await,
            }
        })
        .await
    }

    async fn submit_demo(&self, position_id: &str, payload: JournalPayload) -> Result<JournalSubmission> {
        tokio::time::sleep(self.demo_latency).await;
        let response = self.demo.journal_response(position_id, &payload);

        crate::trace_info!(position_id, "Simulated journal submission");
        self.events.emit(DashboardEvent::JournalSubmitted {
            position_id: position_id.to_string(),
            demo: true,
        });

        Ok(JournalSubmission {
            position_id: position_id.to_string(),
            payload,
            mode: SubmissionMode::Demo,
            response,
        })
    }

    async fn submit_live(
        &self,
        wallet: &str,
        position_id: &str,
        payload: JournalPayload,
    ) -> Result<JournalSubmission> {
        let response = match self.api.update_journal(position_id, &payload).await {
            Ok(response) => response,
            Err(e) => {
                crate::trace_warn!(position_id, error = %e, "Journal submission failed");
                return Err(e);
            }
        };

        let outcome = self
            .cache
            .invalidate(&[ResourceScope::exact(&journal_key(wallet, position_id))]);

        crate::trace_info!(
            position_id,
            wallet = %shared::short_wallet(wallet),
            refetched = outcome.refetched,
            "Journal submitted"
        );
        self.events.emit(DashboardEvent::Invalidated {
            wallet: Some(wallet.to_string()),
            reason: InvalidationReason::JournalUpdated,
            matched: outcome.matched,
            refetched: outcome.refetched,
        });
        self.events.emit(DashboardEvent::JournalSubmitted {
            position_id: position_id.to_string(),
            demo: false,
        });

        Ok(JournalSubmission {
            position_id: position_id.to_string(),
            payload,
            mode: SubmissionMode::Live,
            response,
        })
    }
}

//! Outbound event publication from `after` hooks.
//!
//! Publication happens strictly after commit. A failed publish surfaces as
//! `FireError::AfterHookFailed` and must be retried out of band; the state
//! change it announces is already durable.

use crate::core::State;
use crate::engine::{AfterHook, HookContext, HookError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Entities that can be named in a publication.
pub trait Identified {
    fn entity_id(&self) -> &str;
}

/// Message announcing a committed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub event: String,
    pub entity_id: String,
    pub from: String,
    pub to: String,
    /// The event arguments as JSON
    pub payload: serde_json::Value,
    pub published_at: DateTime<Utc>,
}

pub trait Publisher: Send + Sync {
    fn publish(&self, publication: Publication) -> Result<(), HookError>;
}

/// Build an `after` hook that publishes every committed transition.
pub fn publish_after<S, E, A, P>(publisher: Arc<P>) -> AfterHook<S, E, A>
where
    S: State + 'static,
    E: Identified + 'static,
    A: Serialize + 'static,
    P: Publisher + ?Sized + 'static,
{
    Arc::new(move |entity: &E, args: &A, ctx: &HookContext<'_, S>| -> Result<(), HookError> {
        let publication = Publication {
            event: ctx.event().to_string(),
            entity_id: entity.entity_id().to_string(),
            from: ctx.from().name().to_string(),
            to: ctx.to().name().to_string(),
            payload: serde_json::to_value(args)?,
            published_at: Utc::now(),
        };
        debug!(
            event = %publication.event,
            entity_id = %publication.entity_id,
            "publishing transition"
        );
        publisher.publish(publication)
    })
}

/// Publisher that keeps publications in memory.
#[derive(Debug, Default)]
pub struct InMemoryPublisher {
    published: Mutex<Vec<Publication>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Publication> {
        self.published
            .lock()
            .map(|published| published.clone())
            .unwrap_or_default()
    }
}

impl Publisher for InMemoryPublisher {
    fn publish(&self, publication: Publication) -> Result<(), HookError> {
        self.published
            .lock()
            .map_err(|_| "publisher mutex poisoned")?
            .push(publication);
        Ok(())
    }
}

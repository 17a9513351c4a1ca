//! Dependency summarization.
//!
//! [`SummaryService::summarize`] gathers a ticket and its direct dependencies
//! (optionally also its whole upstream chain) into a [`SummaryContext`] and
//! hands it to a [`Summarizer`]:
//!
//! - [`TemplateSummarizer`] renders a fixed template and never fails
//! - [`LlmSummarizer`] asks a chat-completions endpoint, bounded by a timeout
//!
//! A ticket with no dependencies always gets the template; the AI backend is
//! not contacted. Nothing is cached.

mod context;
mod llm;
mod template;

pub use context::SummaryContext;
pub use llm::{DEFAULT_LLM_MODEL, DEFAULT_LLM_URL, DEFAULT_TIMEOUT, LlmSettings, LlmSummarizer};
pub use template::TemplateSummarizer;

use crate::dependency::{GraphOptions, build_dependency_graph};
use crate::domain::{TicketId, TicketRef};
use crate::error::{Error, Result};
use crate::store::SharedStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A summarization backend.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Whether this backend calls out to an AI service.
    fn is_ai(&self) -> bool;

    /// Produce summary text for the context.
    ///
    /// # Errors
    ///
    /// Returns `Error::SummarizationFailed` if the backend fails or times out.
    async fn summarize(&self, ctx: &SummaryContext) -> Result<String>;
}

/// The result of summarizing one ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// The summary text
    pub summary: String,
    /// Number of direct dependencies the summary covers
    pub dependencies_count: usize,
    /// Whether an AI backend produced the text
    pub ai_enabled: bool,
}

/// Options for [`SummaryService`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Also gather the flattened upstream chain
    pub include_upstream: bool,
    /// Return the template summary when the AI backend fails
    pub fallback_to_template: bool,
}

/// Summarizes tickets from a shared store.
#[derive(Clone)]
pub struct SummaryService {
    store: SharedStore,
    summarizer: Arc<dyn Summarizer>,
    options: SummaryOptions,
}

impl SummaryService {
    /// Create a service over the given backend.
    pub fn new(
        store: SharedStore,
        summarizer: Arc<dyn Summarizer>,
        options: SummaryOptions,
    ) -> Self {
        Self {
            store,
            summarizer,
            options,
        }
    }

    /// Create a service that only ever uses the template.
    pub fn template_only(store: SharedStore) -> Self {
        Self::new(store, Arc::new(TemplateSummarizer), SummaryOptions::default())
    }

    /// Whether the configured backend is an AI backend.
    pub fn ai_configured(&self) -> bool {
        self.summarizer.is_ai()
    }

    /// Summarize a ticket's dependencies.
    ///
    /// # Errors
    ///
    /// - `Error::TicketNotFound` if the ticket doesn't exist
    /// - `Error::SummarizationFailed` if the AI backend fails and fallback is off
    #[tracing::instrument(skip(self), fields(backend = self.summarizer.name()))]
    pub async fn summarize(&self, ticket_id: TicketId) -> Result<Summary> {
        let ticket = self
            .store
            .get_ticket(ticket_id)
            .await?
            .ok_or(Error::TicketNotFound(ticket_id))?;
        let dependencies = self.store.dependencies_of(ticket_id).await?;

        let upstream = if self.options.include_upstream {
            let graph =
                build_dependency_graph(self.store.as_ref(), ticket_id, &GraphOptions::default())
                    .await?;
            Some(graph.upstream_chain().into_iter().cloned().collect::<Vec<TicketRef>>())
        } else {
            None
        };

        let ctx = SummaryContext {
            ticket,
            dependencies,
            upstream,
        };
        let dependencies_count = ctx.dependencies.len();

        if ctx.dependencies.is_empty() || !self.summarizer.is_ai() {
            return Ok(Summary {
                summary: TemplateSummarizer::render(&ctx),
                dependencies_count,
                ai_enabled: false,
            });
        }

        match self.summarizer.summarize(&ctx).await {
            Ok(summary) => Ok(Summary {
                summary,
                dependencies_count,
                ai_enabled: true,
            }),
            Err(e) if self.options.fallback_to_template => {
                tracing::warn!(error = %e, "AI summarization failed, using template");
                Ok(Summary {
                    summary: TemplateSummarizer::render(&ctx),
                    dependencies_count,
                    ai_enabled: false,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "AI summarization failed");
                Err(e)
            }
        }
    }
}

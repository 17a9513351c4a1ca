//! Deterministic summarizer: a fixed text template, no external calls.

use super::Summarizer;
use super::context::SummaryContext;
use crate::error::Result;
use async_trait::async_trait;

const CLOSING_LINE: &str =
    "This is a basic summary. Configure an LLM summarizer backend for AI-assisted insights.";

/// Renders the dependency context into a fixed template. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSummarizer;

impl TemplateSummarizer {
    /// Render the summary text.
    pub fn render(ctx: &SummaryContext) -> String {
        let heading = if ctx.dependencies.is_empty() {
            "No dependencies found."
        } else {
            "Dependent Tickets:"
        };

        let mut text = format!(
            "Dependency Summary for Ticket #{} - {}\n\nDependencies Found: {}\n\n{}\n{}\n\n",
            ctx.ticket.id,
            ctx.ticket.title,
            ctx.dependencies.len(),
            heading,
            ctx.dependency_entries(),
        );
        if let Some(section) = ctx.upstream_section() {
            text.push_str(&section);
            text.push_str("\n\n");
        }
        text.push_str(CLOSING_LINE);
        text
    }
}

#[async_trait]
impl Summarizer for TemplateSummarizer {
    fn name(&self) -> &'static str {
        "template"
    }

    fn is_ai(&self) -> bool {
        false
    }

    async fn summarize(&self, ctx: &SummaryContext) -> Result<String> {
        Ok(Self::render(ctx))
    }
}

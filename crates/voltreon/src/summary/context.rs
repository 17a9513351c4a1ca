//! The ticket-plus-dependencies payload handed to a summarizer.

use crate::domain::{Ticket, TicketRef};
use std::fmt::Write;

const NOT_SPECIFIED: &str = "Not specified";

/// Everything a summarizer sees about one ticket.
#[derive(Debug, Clone)]
pub struct SummaryContext {
    /// The ticket being summarized
    pub ticket: Ticket,

    /// Its direct dependencies, in ascending id order
    pub dependencies: Vec<Ticket>,

    /// The flattened upstream chain, when requested
    pub upstream: Option<Vec<TicketRef>>,
}

impl SummaryContext {
    /// One bullet per direct dependency with its ADR fields, separated by
    /// blank lines.
    pub fn dependency_entries(&self) -> String {
        self.dependencies
            .iter()
            .map(|dep| {
                format!(
                    "• #{}: {} ({})\n  Context: {}\n  Decision: {}\n  Consequences: {}",
                    dep.id,
                    dep.title,
                    dep.status,
                    field(dep.context.as_deref()),
                    field(dep.decision.as_deref()),
                    field(dep.consequences.as_deref()),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The upstream chain section, or `None` if it wasn't gathered.
    pub fn upstream_section(&self) -> Option<String> {
        let chain = self.upstream.as_ref()?;
        let mut section = format!("Full Upstream Chain ({}):", chain.len());
        for ticket in chain {
            let _ = write!(
                section,
                "\n• #{}: {} ({})",
                ticket.id, ticket.title, ticket.status
            );
        }
        Some(section)
    }

    /// The user message sent to a language model.
    pub fn prompt(&self) -> String {
        let mut prompt = format!(
            "Ticket #{}: {} ({})\nContext: {}\nDecision: {}\nConsequences: {}\n\n\
             Direct dependencies ({}):\n\n{}",
            self.ticket.id,
            self.ticket.title,
            self.ticket.status,
            field(self.ticket.context.as_deref()),
            field(self.ticket.decision.as_deref()),
            field(self.ticket.consequences.as_deref()),
            self.dependencies.len(),
            self.dependency_entries(),
        );
        if let Some(section) = self.upstream_section() {
            prompt.push_str("\n\n");
            prompt.push_str(&section);
        }
        prompt
    }
}

fn field(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_SPECIFIED,
    }
}

//! Output formatting for CLI commands.
//!
//! This module provides utilities for formatting command output in both
//! human-readable text format and JSON format for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)
//! - [`tree`]: Dependency tree rendering with ASCII/Unicode connectors

pub mod color;
pub mod tree;

use crate::dependency::DirectLinks;
use crate::domain::{Person, Project, Ticket, TicketRef};
use crate::summary::Summary;
use colored::Colorize;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};
pub use tree::print_dependency_graph;

use color::{
    ai_marker, bold, colored_status_icon, colorize_id, colorize_status, cyan, dimmed, yellow,
};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;

/// Configuration for output formatting.
///
/// This struct holds settings that control how output is formatted,
/// including terminal width limits, ASCII fallback mode, and color output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons and connectors instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `VOLTREON_MAX_WIDTH`: Maximum content width (default: 80)
    /// - `VOLTREON_ASCII`: Set to "1" or "true" for ASCII-only output (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `VOLTREON_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`OutputConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_width = match lookup("VOLTREON_MAX_WIDTH") {
            Some(s) if !s.is_empty() => match s.parse() {
                Ok(width) => width,
                Err(_) => {
                    tracing::warn!(
                        env_var = "VOLTREON_MAX_WIDTH",
                        value = %s,
                        default = DEFAULT_MAX_CONTENT_WIDTH,
                        "Invalid value, using default"
                    );
                    DEFAULT_MAX_CONTENT_WIDTH
                }
            },
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match lookup("VOLTREON_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "VOLTREON_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // NO_COLOR standard (https://no-color.org/), plus VOLTREON_COLOR for
        // explicit control
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("VOLTREON_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Get the current terminal width, falling back to default if detection fails.
fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH as usize)
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Write to a locked stdout using the environment's output config.
fn with_stdout(
    f: impl FnOnce(&mut io::StdoutLock<'_>, &OutputConfig) -> io::Result<()>,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();
    f(&mut handle, &config)
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", msg)
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(w, "{}", json)
}

/// Print a single project
pub fn print_project(project: &Project, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(project),
        OutputMode::Text => with_stdout(|w, config| print_project_text(w, project, config)),
    }
}

/// Print a project with its tickets (for `project show`)
pub fn print_project_details(
    project: &Project,
    tickets: &[Ticket],
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            #[derive(Serialize)]
            struct ProjectDetails<'a> {
                #[serde(flatten)]
                project: &'a Project,
                tickets: &'a [Ticket],
            }
            print_json(&ProjectDetails { project, tickets })
        }
        OutputMode::Text => with_stdout(|w, config| {
            print_project_text(w, project, config)?;
            writeln!(w)?;
            print_tickets_text(w, tickets, config)
        }),
    }
}

/// Print a list of projects
pub fn print_projects(projects: &[Project], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(projects),
        OutputMode::Text => with_stdout(|w, config| print_projects_text(w, projects, config)),
    }
}

/// Print a single ticket summary line
pub fn print_ticket(ticket: &Ticket, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(ticket),
        OutputMode::Text => with_stdout(|w, config| print_ticket_line(w, ticket, config)),
    }
}

/// Print a list of tickets
pub fn print_tickets(tickets: &[Ticket], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(tickets),
        OutputMode::Text => with_stdout(|w, config| print_tickets_text(w, tickets, config)),
    }
}

/// Everything `ticket show` displays.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetails<'a> {
    /// The ticket
    #[serde(flatten)]
    pub ticket: &'a Ticket,
    /// Assigned people
    pub assigned_people: &'a [Person],
    /// Direct dependency links
    #[serde(flatten)]
    pub links: &'a DirectLinks,
}

/// Print a ticket with full details (for `ticket show`)
pub fn print_ticket_details(details: &TicketDetails<'_>, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(details),
        OutputMode::Text => with_stdout(|w, config| print_ticket_details_text(w, details, config)),
    }
}

/// Print a list of people
pub fn print_people(people: &[Person], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(people),
        OutputMode::Text => with_stdout(|w, config| print_people_text(w, people, config)),
    }
}

/// Print a single person
pub fn print_person(person: &Person, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(person),
        OutputMode::Text => with_stdout(|w, config| print_person_line(w, person, config)),
    }
}

/// Print direct dependency links (for `dep list`)
pub fn print_direct_links(links: &DirectLinks, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(links),
        OutputMode::Text => with_stdout(|w, config| print_links_text(w, links, config)),
    }
}

/// Print a dependency summary
pub fn print_summary(summary: &Summary, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(summary),
        OutputMode::Text => with_stdout(|w, config| print_summary_text(w, summary, config)),
    }
}

// ============================================================================
// Text Formatting
// ============================================================================

fn print_project_text<W: Write>(
    w: &mut W,
    project: &Project,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{} {}", colorize_id(project.id, config), bold(&project.name, config))?;
    if let Some(description) = &project.description {
        let width = get_terminal_width().min(config.max_width);
        for line in wrap_text(description, width.saturating_sub(2)) {
            writeln!(w, "  {line}")?;
        }
    }
    writeln!(
        w,
        "  {} {}    {} {}",
        dimmed("Created:", config),
        project.created_at.format("%Y-%m-%d %H:%M"),
        dimmed("Updated:", config),
        project.updated_at.format("%Y-%m-%d %H:%M")
    )
}

fn print_projects_text<W: Write>(
    w: &mut W,
    projects: &[Project],
    config: &OutputConfig,
) -> io::Result<()> {
    if projects.is_empty() {
        return writeln!(w, "No projects found.");
    }

    writeln!(w, "Found {} project(s):", projects.len())?;
    writeln!(w)?;
    for project in projects {
        writeln!(w, "{}  {}", colorize_id(project.id, config), project.name)?;
    }
    Ok(())
}

fn print_ticket_line<W: Write>(
    w: &mut W,
    ticket: &Ticket,
    config: &OutputConfig,
) -> io::Result<()> {
    let marker = ai_marker(ticket.is_ai_generated, config);
    writeln!(
        w,
        "{} {}  {}  {}{}",
        colored_status_icon(ticket.status, config),
        colorize_id(ticket.id, config),
        ticket.title,
        dimmed(&format!("(project #{})", ticket.project_id), config),
        if marker.is_empty() { marker } else { format!("  {marker}") }
    )
}

fn print_tickets_text<W: Write>(
    w: &mut W,
    tickets: &[Ticket],
    config: &OutputConfig,
) -> io::Result<()> {
    if tickets.is_empty() {
        return writeln!(w, "No tickets found.");
    }

    writeln!(w, "Found {} ticket(s):", tickets.len())?;
    writeln!(w)?;
    for ticket in tickets {
        print_ticket_line(w, ticket, config)?;
    }
    Ok(())
}

/// Print a text section with a bold title and wrapped, indented content.
fn print_text_section<W: Write>(
    w: &mut W,
    title: &str,
    content: Option<&str>,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    let Some(content) = content.filter(|c| !c.is_empty()) else {
        return Ok(());
    };
    writeln!(w)?;
    if config.use_colors {
        writeln!(w, "{}:", title.bold())?;
    } else {
        writeln!(w, "{}:", title)?;
    }
    for line in wrap_text(content, width.saturating_sub(2)) {
        writeln!(w, "  {line}")?;
    }
    Ok(())
}

fn print_ticket_refs<W: Write>(
    w: &mut W,
    heading: &str,
    arrow: &str,
    refs: &[TicketRef],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{} ({}):", bold(heading, config), refs.len())?;
    if refs.is_empty() {
        return writeln!(w, "  {}", dimmed("(none)", config));
    }
    for r in refs {
        writeln!(
            w,
            "  {} {} {} {}",
            arrow,
            colorize_id(r.id, config),
            r.title,
            dimmed(&format!("({})", r.status), config)
        )?;
    }
    Ok(())
}

fn print_ticket_details_text<W: Write>(
    w: &mut W,
    details: &TicketDetails<'_>,
    config: &OutputConfig,
) -> io::Result<()> {
    let ticket = details.ticket;
    let content_width = get_terminal_width().min(config.max_width);

    writeln!(
        w,
        "{} {}: {}",
        colored_status_icon(ticket.status, config),
        colorize_id(ticket.id, config),
        ticket.title
    )?;

    let marker = ai_marker(ticket.is_ai_generated, config);
    writeln!(
        w,
        "{}  {}    {}  {}{}",
        dimmed("Status:", config),
        colorize_status(ticket.status, config),
        dimmed("Project:", config),
        colorize_id(ticket.project_id, config),
        if marker.is_empty() { marker } else { format!("    {marker}") }
    )?;

    if !details.assigned_people.is_empty() {
        let names: Vec<&str> = details.assigned_people.iter().map(|p| p.name.as_str()).collect();
        writeln!(w, "{} {}", dimmed("Assigned:", config), names.join(", "))?;
    }

    writeln!(
        w,
        "{} {}    {} {}",
        dimmed("Created:", config),
        ticket.created_at.format("%Y-%m-%d %H:%M"),
        dimmed("Updated:", config),
        ticket.updated_at.format("%Y-%m-%d %H:%M")
    )?;

    print_text_section(w, "Context", ticket.context.as_deref(), content_width, config)?;
    print_text_section(w, "Decision", ticket.decision.as_deref(), content_width, config)?;
    print_text_section(w, "Consequences", ticket.consequences.as_deref(), content_width, config)?;

    writeln!(w)?;
    print_links_text(w, details.links, config)
}

fn print_links_text<W: Write>(
    w: &mut W,
    links: &DirectLinks,
    config: &OutputConfig,
) -> io::Result<()> {
    let (right, left) = if config.use_ascii { ("->", "<-") } else { ("→", "←") };
    print_ticket_refs(w, "Dependencies", &cyan(right, config), &links.dependencies, config)?;
    writeln!(w)?;
    print_ticket_refs(w, "Dependents", &yellow(left, config), &links.dependents, config)
}

fn print_person_line<W: Write>(
    w: &mut W,
    person: &Person,
    config: &OutputConfig,
) -> io::Result<()> {
    let mut line = format!("{}  {}", colorize_id(person.id, config), person.name);
    if let Some(username) = &person.username {
        line.push_str(&format!("  @{username}"));
    }
    if let Some(email) = &person.email {
        line.push_str(&format!("  {}", dimmed(&format!("<{email}>"), config)));
    }
    writeln!(w, "{line}")
}

fn print_people_text<W: Write>(
    w: &mut W,
    people: &[Person],
    config: &OutputConfig,
) -> io::Result<()> {
    if people.is_empty() {
        return writeln!(w, "No people found.");
    }

    writeln!(w, "Found {} person(s):", people.len())?;
    writeln!(w)?;
    for person in people {
        print_person_line(w, person, config)?;
    }
    Ok(())
}

fn print_summary_text<W: Write>(
    w: &mut W,
    summary: &Summary,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{}", summary.summary)?;
    writeln!(w)?;
    let source = if summary.ai_enabled { "AI summarizer" } else { "template" };
    writeln!(
        w,
        "{}",
        dimmed(
            &format!("{} dependencies, generated by {}", summary.dependencies_count, source),
            config
        )
    )
}

/// Wrap text to fit within a given width, preserving existing line breaks.
/// Uses textwrap to handle edge cases like long words (URLs, file paths).
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, max_width.max(1))
                    .into_iter()
                    .map(|s| s.into_owned())
                    .collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PersonId, ProjectId, TicketId, TicketStatus};
    use chrono::Utc;
    use std::collections::HashMap;

    fn plain() -> OutputConfig {
        OutputConfig::new(80, false, false)
    }

    fn test_ticket() -> Ticket {
        let now = Utc::now();
        Ticket {
            id: TicketId(4),
            project_id: ProjectId(1),
            title: "Adopt SQLite".to_string(),
            context: Some("We need persistence.".to_string()),
            decision: Some("Use SQLite.".to_string()),
            consequences: None,
            status: TicketStatus::InReview,
            is_ai_generated: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_output_config_from_lookup() {
        let env: HashMap<&str, &str> =
            [("VOLTREON_MAX_WIDTH", "120"), ("VOLTREON_ASCII", "1")].into_iter().collect();
        let config = OutputConfig::from_lookup(|k| env.get(k).map(|v| (*v).to_string()));
        assert_eq!(config.max_width, 120);
        assert!(config.use_ascii);
        assert!(config.use_colors);

        let env: HashMap<&str, &str> = [
            ("VOLTREON_MAX_WIDTH", "invalid"),
            ("VOLTREON_ASCII", "false"),
            ("NO_COLOR", "1"),
        ]
        .into_iter()
        .collect();
        let config = OutputConfig::from_lookup(|k| env.get(k).map(|v| (*v).to_string()));
        assert_eq!(config.max_width, DEFAULT_MAX_CONTENT_WIDTH);
        assert!(!config.use_ascii);
        assert!(!config.use_colors, "NO_COLOR should disable colors");

        for value in ["0", "false", "FALSE"] {
            let config = OutputConfig::from_lookup(|k| {
                (k == "VOLTREON_COLOR").then(|| value.to_string())
            });
            assert!(!config.use_colors, "VOLTREON_COLOR={value} should disable colors");
        }

        assert_eq!(OutputConfig::from_lookup(|_| None), OutputConfig::default());
    }

    #[test]
    fn test_ticket_details_text() {
        let ticket = test_ticket();
        let people = vec![Person {
            id: PersonId(1),
            name: "Ada".to_string(),
            email: None,
            username: None,
        }];
        let links = DirectLinks {
            dependencies: vec![TicketRef {
                id: TicketId(2),
                title: "Choose storage".to_string(),
                status: TicketStatus::Done,
                is_ai_generated: false,
            }],
            dependents: vec![],
        };
        let details = TicketDetails {
            ticket: &ticket,
            assigned_people: &people,
            links: &links,
        };

        let output = render(|w| print_ticket_details_text(w, &details, &plain()));
        assert!(output.contains("#4: Adopt SQLite"));
        assert!(output.contains("In Review"));
        assert!(output.contains("Assigned: Ada"));
        assert!(output.contains("Context:\n  We need persistence."));
        assert!(!output.contains("Consequences:"));
        assert!(output.contains("Dependencies (1):\n  → #2 Choose storage (Done)"));
        assert!(output.contains("Dependents (0):\n  (none)"));
    }

    #[test]
    fn test_ticket_details_json_is_flat() {
        let ticket = test_ticket();
        let links = DirectLinks {
            dependencies: vec![],
            dependents: vec![],
        };
        let details = TicketDetails {
            ticket: &ticket,
            assigned_people: &[],
            links: &links,
        };

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["isAiGenerated"], true);
        assert!(json["assignedPeople"].as_array().unwrap().is_empty());
        assert!(json["dependencies"].is_array());
        assert!(json["dependents"].is_array());
    }

    #[test]
    fn test_tickets_list_text() {
        let output = render(|w| print_tickets_text(w, &[test_ticket()], &plain()));
        assert!(output.contains("Found 1 ticket(s):"));
        assert!(output.contains("#4  Adopt SQLite  (project #1)  ✦ ai"));

        let empty = render(|w| print_tickets_text(w, &[], &plain()));
        assert_eq!(empty, "No tickets found.\n");
    }

    #[test]
    fn test_person_line() {
        let person = Person {
            id: PersonId(3),
            name: "Grace".to_string(),
            email: Some("grace@example.com".to_string()),
            username: Some("grace".to_string()),
        };
        let output = render(|w| print_person_line(w, &person, &plain()));
        assert_eq!(output, "#3  Grace  @grace  <grace@example.com>\n");
    }

    #[test]
    fn test_summary_text_names_source() {
        let summary = Summary {
            summary: "Body".to_string(),
            dependencies_count: 2,
            ai_enabled: false,
        };
        let output = render(|w| print_summary_text(w, &summary, &plain()));
        assert!(output.starts_with("Body\n\n"));
        assert!(output.contains("2 dependencies, generated by template"));
    }

    #[test]
    fn test_write_json() {
        let output = render(|w| write_json(w, &test_ticket()));
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["title"], "Adopt SQLite");
        assert_eq!(parsed["status"], "In Review");
    }

    #[test]
    fn test_wrap_text() {
        let wrapped = wrap_text("This is a test of text wrapping functionality", 20);
        assert!(wrapped.iter().all(|line| line.len() <= 20));

        assert_eq!(wrap_text("Line one\nLine two\nLine three", 50).len(), 3);
    }
}

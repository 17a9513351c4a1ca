//! Dependency tree rendering for `voltreon dep graph` output.

use std::io::{self, Write};

use colored::Colorize;

use super::color::{ai_marker, bold, colored_status_icon, colorize_id, colorize_status, dimmed};
use super::{OutputConfig, OutputMode, print_json};
use crate::dependency::{DependencyGraph, DownstreamNode, UpstreamNode};
use crate::domain::TicketRef;

/// A renderable tree node: a ticket plus its children in one direction.
trait TreeNode {
    fn ticket(&self) -> &TicketRef;
    fn children(&self) -> &[Self]
    where
        Self: Sized;
}

impl TreeNode for UpstreamNode {
    fn ticket(&self) -> &TicketRef {
        &self.ticket
    }

    fn children(&self) -> &[Self] {
        &self.dependencies
    }
}

impl TreeNode for DownstreamNode {
    fn ticket(&self) -> &TicketRef {
        &self.ticket
    }

    fn children(&self) -> &[Self] {
        &self.dependents
    }
}

/// Print a dependency graph.
///
/// Text mode renders both trees with ASCII/Unicode connectors:
/// ```text
/// ◆ #3 Deploy [To Do]
///
/// Depends on (2):
/// └── #2 Build ▶
///     └── #1 Setup ✓
///
/// Depended on by (0):
///   (none)
/// ```
/// JSON mode prints the graph object itself.
pub fn print_dependency_graph(graph: &DependencyGraph, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(graph),
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let config = OutputConfig::from_env();
            print_dependency_graph_text(&mut handle, graph, &config)
        }
    }
}

pub(crate) fn print_dependency_graph_text<W: Write>(
    w: &mut W,
    graph: &DependencyGraph,
    config: &OutputConfig,
) -> io::Result<()> {
    let root_icon = if config.use_ascii { "*" } else { "◆" };
    let root_icon_str = if config.use_colors {
        root_icon.cyan().bold().to_string()
    } else {
        root_icon.to_string()
    };

    writeln!(
        w,
        "{} {} {} [{}]",
        root_icon_str,
        colorize_id(graph.ticket.id, config),
        graph.ticket.title,
        colorize_status(graph.ticket.status, config)
    )?;

    writeln!(w)?;
    writeln!(
        w,
        "{} ({}):",
        bold("Depends on", config),
        graph.summary.total_upstream
    )?;
    print_children(w, &graph.all_upstream_dependencies, &[], config)?;

    writeln!(w)?;
    writeln!(
        w,
        "{} ({}):",
        bold("Depended on by", config),
        graph.summary.total_downstream
    )?;
    print_children(w, &graph.all_downstream_dependents, &[], config)
}

/// Recursively render tree children with proper connector lines.
///
/// `prefix_segments` tracks which ancestor levels still have siblings below,
/// used to draw the vertical continuation lines (`│`).
fn print_children<W: Write, N: TreeNode>(
    w: &mut W,
    children: &[N],
    prefix_segments: &[bool],
    config: &OutputConfig,
) -> io::Result<()> {
    if children.is_empty() && prefix_segments.is_empty() {
        return writeln!(w, "  {}", dimmed("(none)", config));
    }

    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;

        let mut prefix = String::new();
        for &has_more in prefix_segments {
            prefix.push_str(&dimmed(if has_more { pipe } else { space }, config));
        }
        let connector = dimmed(if is_last { corner } else { branch }, config);

        let ticket = child.ticket();
        let marker = ai_marker(ticket.is_ai_generated, config);
        let marker = if marker.is_empty() {
            marker
        } else {
            format!(" {marker}")
        };

        writeln!(
            w,
            "{}{}{} {} {}{}",
            prefix,
            connector,
            colorize_id(ticket.id, config),
            ticket.title,
            colored_status_icon(ticket.status, config),
            marker
        )?;

        if !child.children().is_empty() {
            let mut next_segments = prefix_segments.to_vec();
            next_segments.push(!is_last);
            print_children(w, child.children(), &next_segments, config)?;
        }
    }

    Ok(())
}

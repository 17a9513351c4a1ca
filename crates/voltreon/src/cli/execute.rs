//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::Result;

use super::args::{
    AssignArgs, DepAction, DepArgs, InfoArgs, InitArgs, PersonAction, PersonArgs, ProjectAction,
    ProjectArgs, SummarizeArgs, TicketAction, TicketArgs, TicketCreateArgs, TicketListArgs,
    TicketUpdateArgs,
};
use crate::app::App;
use crate::domain::{
    NewPerson, NewProject, NewTicket, PersonUpdate, ProjectUpdate, TicketFilter, TicketStatus,
    TicketUpdate,
};
use crate::error::Error;
use crate::output::{self, OutputConfig, OutputMode};

/// Collapse a `--value` / `--clear-value` flag pair into a partial update.
fn optional_update(value: &Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.clone().map(Some)
    }
}

/// Print a JSON confirmation or a green text message.
fn confirm(output_mode: OutputMode, json: serde_json::Value, text: &str) -> Result<()> {
    match output_mode {
        OutputMode::Json => output::print_json(&json)?,
        OutputMode::Text => {
            output::print_message(&output::success(text, &OutputConfig::from_env()))?;
        }
    }
    Ok(())
}

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;

    if !args.quiet {
        println!("Initializing voltreon workspace ({} backend)...", args.backend);
    }

    let result = init::init(&current_dir, Some(args.backend.into())).await?;

    if !args.quiet {
        println!("Initialized voltreon in {}", result.voltreon_dir.display());
        println!("  Config:   {}", result.config_file.display());
        if let Some(db) = &result.database_file {
            println!("  Database: {}", db.display());
        }
    }

    Ok(())
}

/// Execute the info command
pub async fn execute_info(app: &App, _args: &InfoArgs, output_mode: OutputMode) -> Result<()> {
    let config = app.config();
    let backend = config.storage.to_backend(app.root_dir())?;

    let projects = app.store().list_projects().await?;
    let tickets = app.store().list_tickets(&TicketFilter::default()).await?;
    let people = app.store().list_people().await?;

    let by_status: Vec<(TicketStatus, usize)> = TicketStatus::ALL
        .iter()
        .map(|&s| (s, tickets.iter().filter(|t| t.status == s).count()))
        .collect();

    match output_mode {
        OutputMode::Json => {
            let status_counts: serde_json::Map<String, serde_json::Value> = by_status
                .iter()
                .map(|(s, n)| (s.as_str().to_string(), serde_json::json!(n)))
                .collect();
            output::print_json(&serde_json::json!({
                "root": app.root_dir().display().to_string(),
                "storage": backend.to_string(),
                "cycleDetection": config.dependencies.cycle_detection,
                "summarizer": config.summarizer.backend,
                "projects": projects.len(),
                "people": people.len(),
                "tickets": {
                    "total": tickets.len(),
                    "byStatus": status_counts,
                }
            }))?;
        }
        OutputMode::Text => {
            println!("Voltreon Workspace Information");
            println!("==============================");
            println!();
            println!("Root:            {}", app.root_dir().display());
            println!("Storage:         {}", backend);
            println!("Cycle detection: {}", config.dependencies.cycle_detection);
            println!(
                "Summarizer:      {}",
                if app.summaries().ai_configured() {
                    format!("llm ({})", config.summarizer.model)
                } else {
                    "template".to_string()
                }
            );
            println!();
            println!("Projects: {}", projects.len());
            println!("People:   {}", people.len());
            println!("Tickets:  {}", tickets.len());
            for (status, count) in by_status {
                println!("  {:<12} {}", status.as_str(), count);
            }
        }
    }

    Ok(())
}

/// Execute the project command
pub async fn execute_project(app: &App, args: &ProjectArgs, output_mode: OutputMode) -> Result<()> {
    let store = app.store();

    match &args.action {
        ProjectAction::Create { name, description } => {
            let project = store
                .create_project(NewProject {
                    name: name.clone(),
                    description: description.clone(),
                })
                .await?;
            tracing::info!(project = %project.id, "Project created");
            match output_mode {
                OutputMode::Json => output::print_json(&project)?,
                OutputMode::Text => {
                    println!("Created project #{}: {}", project.id, project.name);
                }
            }
        }
        ProjectAction::List => {
            let projects = store.list_projects().await?;
            output::print_projects(&projects, output_mode)?;
        }
        ProjectAction::Show { id } => {
            let project = store
                .get_project(*id)
                .await?
                .ok_or(Error::ProjectNotFound(*id))?;
            let tickets = store
                .list_tickets(&TicketFilter {
                    project_id: Some(*id),
                    ..Default::default()
                })
                .await?;
            output::print_project_details(&project, &tickets, output_mode)?;
        }
        ProjectAction::Update {
            id,
            name,
            description,
            clear_description,
        } => {
            let update = ProjectUpdate {
                name: name.clone(),
                description: optional_update(description, *clear_description),
            };
            let project = store.update_project(*id, update).await?;
            output::print_project(&project, output_mode)?;
        }
        ProjectAction::Delete { id } => {
            store.delete_project(*id).await?;
            confirm(
                output_mode,
                serde_json::json!({ "deleted": id, "status": "success" }),
                &format!("Deleted project #{}", id),
            )?;
        }
    }

    Ok(())
}

/// Execute the ticket command
pub async fn execute_ticket(app: &App, args: &TicketArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        TicketAction::Create(create) => execute_ticket_create(app, create, output_mode).await,
        TicketAction::List(list) => execute_ticket_list(app, list, output_mode).await,
        TicketAction::Show { id } => {
            let ticket = app
                .store()
                .get_ticket(*id)
                .await?
                .ok_or(Error::TicketNotFound(*id))?;
            let people = app.store().people_for_ticket(*id).await?;
            let links = app.dependencies().direct_links(*id).await?;
            output::print_ticket_details(
                &output::TicketDetails {
                    ticket: &ticket,
                    assigned_people: &people,
                    links: &links,
                },
                output_mode,
            )?;
            Ok(())
        }
        TicketAction::Update(update) => execute_ticket_update(app, update, output_mode).await,
        TicketAction::Delete { id } => {
            app.store().delete_ticket(*id).await?;
            confirm(
                output_mode,
                serde_json::json!({ "deleted": id, "status": "success" }),
                &format!("Deleted ticket #{}", id),
            )
        }
    }
}

async fn execute_ticket_create(
    app: &App,
    args: &TicketCreateArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let ticket = app
        .store()
        .create_ticket(NewTicket {
            project_id: args.project,
            title: args.title.clone(),
            context: args.context.clone(),
            decision: args.decision.clone(),
            consequences: args.consequences.clone(),
            status: Some(args.status.into()),
            is_ai_generated: args.ai_generated,
        })
        .await?;
    tracing::info!(ticket = %ticket.id, project = %ticket.project_id, "Ticket created");

    match output_mode {
        OutputMode::Json => output::print_json(&ticket)?,
        OutputMode::Text => println!("Created ticket #{}: {}", ticket.id, ticket.title),
    }
    Ok(())
}

async fn execute_ticket_list(
    app: &App,
    args: &TicketListArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let filter = TicketFilter {
        project_id: args.project,
        status: args.status.map(Into::into),
        limit: args.limit,
    };
    let tickets = app.store().list_tickets(&filter).await?;
    output::print_tickets(&tickets, output_mode)?;
    Ok(())
}

async fn execute_ticket_update(
    app: &App,
    args: &TicketUpdateArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let update = TicketUpdate {
        title: args.title.clone(),
        context: optional_update(&args.context, args.clear_context),
        decision: optional_update(&args.decision, args.clear_decision),
        consequences: optional_update(&args.consequences, args.clear_consequences),
        status: args.status.map(Into::into),
        is_ai_generated: args.ai_generated,
    };

    if update.is_empty() {
        anyhow::bail!("Nothing to update. Pass at least one field (see --help).");
    }

    let ticket = app.store().update_ticket(args.id, update).await?;
    output::print_ticket(&ticket, output_mode)?;
    Ok(())
}

/// Execute the person command
pub async fn execute_person(app: &App, args: &PersonArgs, output_mode: OutputMode) -> Result<()> {
    let store = app.store();

    match &args.action {
        PersonAction::Create {
            name,
            email,
            username,
        } => {
            let person = store
                .create_person(NewPerson {
                    name: name.clone(),
                    email: email.clone(),
                    username: username.clone(),
                })
                .await?;
            output::print_person(&person, output_mode)?;
        }
        PersonAction::List => {
            let people = store.list_people().await?;
            output::print_people(&people, output_mode)?;
        }
        PersonAction::Update {
            id,
            name,
            email,
            clear_email,
            username,
            clear_username,
        } => {
            let update = PersonUpdate {
                name: name.clone(),
                email: optional_update(email, *clear_email),
                username: optional_update(username, *clear_username),
            };
            let person = store.update_person(*id, update).await?;
            output::print_person(&person, output_mode)?;
        }
        PersonAction::Delete { id } => {
            store.delete_person(*id).await?;
            confirm(
                output_mode,
                serde_json::json!({ "deleted": id, "status": "success" }),
                &format!("Deleted person #{}", id),
            )?;
        }
    }

    Ok(())
}

/// Execute the assign command
pub async fn execute_assign(app: &App, args: &AssignArgs, output_mode: OutputMode) -> Result<()> {
    let link = app.store().assign_person(args.ticket, args.person).await?;
    confirm(
        output_mode,
        serde_json::to_value(link)?,
        &format!("Assigned person #{} to ticket #{}", args.person, args.ticket),
    )
}

/// Execute the unassign command
pub async fn execute_unassign(app: &App, args: &AssignArgs, output_mode: OutputMode) -> Result<()> {
    app.store().unassign_person(args.ticket, args.person).await?;
    confirm(
        output_mode,
        serde_json::json!({
            "ticketId": args.ticket,
            "personId": args.person,
            "status": "removed"
        }),
        &format!("Unassigned person #{} from ticket #{}", args.person, args.ticket),
    )
}

/// Execute the dep command
pub async fn execute_dep(app: &App, args: &DepArgs, output_mode: OutputMode) -> Result<()> {
    use crate::dependency::GraphOptions;

    let deps = app.dependencies();

    match &args.action {
        DepAction::Add { ticket, depends_on } => {
            let edge = deps.propose_edge(*ticket, *depends_on).await?;
            confirm(
                output_mode,
                serde_json::to_value(edge)?,
                &format!("Ticket #{} now depends on #{}", ticket, depends_on),
            )?;
        }
        DepAction::Remove { ticket, depends_on } => {
            deps.remove_edge(*ticket, *depends_on).await?;
            confirm(
                output_mode,
                serde_json::json!({
                    "ticketId": ticket,
                    "dependsOnTicketId": depends_on,
                    "status": "removed"
                }),
                &format!("Removed dependency #{} -> #{}", ticket, depends_on),
            )?;
        }
        DepAction::List { ticket } => {
            let links = deps.direct_links(*ticket).await?;
            output::print_direct_links(&links, output_mode)?;
        }
        DepAction::Graph { ticket, max_depth } => {
            let graph = deps
                .build_graph(
                    *ticket,
                    &GraphOptions {
                        max_depth: *max_depth,
                    },
                )
                .await?;
            output::print_dependency_graph(&graph, output_mode)?;
        }
    }

    Ok(())
}

/// Execute the summarize command
pub async fn execute_summarize(
    app: &App,
    args: &SummarizeArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let summary = app.summaries().summarize(args.ticket).await?;
    let fell_back =
        app.summaries().ai_configured() && summary.dependencies_count > 0 && !summary.ai_enabled;
    if fell_back && output_mode == OutputMode::Text {
        eprintln!(
            "{}",
            output::warning(
                "AI summarizer unavailable, showing the template summary",
                &OutputConfig::from_env()
            )
        );
    }
    output::print_summary(&summary, output_mode)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StorageKind, VoltreonConfig};
    use crate::dependency::EdgeRejection;
    use crate::domain::{Ticket, TicketId};
    use std::path::PathBuf;

    fn memory_app() -> App {
        let mut config = VoltreonConfig::default();
        config.storage.backend = StorageKind::Memory;
        App::from_config(config, PathBuf::from("/nonexistent")).unwrap()
    }

    async fn seed(app: &App, titles: &[&str]) -> Vec<Ticket> {
        let project = app
            .store()
            .create_project(NewProject {
                name: "CLI".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let mut tickets = Vec::new();
        for title in titles {
            tickets.push(
                app.store()
                    .create_ticket(NewTicket {
                        project_id: project.id,
                        title: (*title).to_string(),
                        ..Default::default()
                    })
                    .await
                    .unwrap(),
            );
        }
        tickets
    }

    #[test]
    fn test_optional_update() {
        let value = Some("x".to_string());
        assert_eq!(optional_update(&value, false), Some(Some("x".to_string())));
        assert_eq!(optional_update(&None, true), Some(None));
        assert_eq!(optional_update(&None, false), None);
    }

    #[tokio::test]
    async fn test_dep_add_and_remove() {
        let app = memory_app();
        let t = seed(&app, &["Setup", "Build"]).await;

        let add = DepArgs {
            action: DepAction::Add {
                ticket: t[1].id,
                depends_on: t[0].id,
            },
        };
        execute_dep(&app, &add, OutputMode::Json).await.unwrap();
        assert_eq!(app.store().dependencies_of(t[1].id).await.unwrap().len(), 1);

        let remove = DepArgs {
            action: DepAction::Remove {
                ticket: t[1].id,
                depends_on: t[0].id,
            },
        };
        execute_dep(&app, &remove, OutputMode::Json).await.unwrap();
        assert!(app.store().dependencies_of(t[1].id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dep_add_rejection_surfaces_typed_error() {
        let app = memory_app();
        let t = seed(&app, &["Solo"]).await;

        let args = DepArgs {
            action: DepAction::Add {
                ticket: t[0].id,
                depends_on: t[0].id,
            },
        };
        let err = execute_dep(&app, &args, OutputMode::Json).await.unwrap_err();
        let err = err.downcast::<Error>().unwrap();
        assert!(matches!(
            err,
            Error::EdgeRejected(EdgeRejection::SelfDependency(_))
        ));
    }

    #[tokio::test]
    async fn test_ticket_update_requires_a_field() {
        let app = memory_app();
        let t = seed(&app, &["Idle"]).await;

        let args = TicketUpdateArgs {
            id: t[0].id,
            title: None,
            context: None,
            clear_context: false,
            decision: None,
            clear_decision: false,
            consequences: None,
            clear_consequences: false,
            status: None,
            ai_generated: None,
        };
        let err = execute_ticket_update(&app, &args, OutputMode::Json)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Nothing to update"));
    }

    #[tokio::test]
    async fn test_ticket_update_clears_context() {
        let app = memory_app();
        let t = seed(&app, &["ADR"]).await;
        app.store()
            .update_ticket(
                t[0].id,
                TicketUpdate {
                    context: Some(Some("old".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let args = TicketUpdateArgs {
            id: t[0].id,
            title: None,
            context: None,
            clear_context: true,
            decision: None,
            clear_decision: false,
            consequences: None,
            clear_consequences: false,
            status: None,
            ai_generated: None,
        };
        execute_ticket_update(&app, &args, OutputMode::Json).await.unwrap();

        let ticket = app.store().get_ticket(t[0].id).await.unwrap().unwrap();
        assert!(ticket.context.is_none());
    }

    #[tokio::test]
    async fn test_show_missing_ticket() {
        let app = memory_app();
        let args = TicketArgs {
            action: TicketAction::Show { id: TicketId(99) },
        };
        let err = execute_ticket(&app, &args, OutputMode::Text).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::TicketNotFound(TicketId(99)))
        ));
    }

    #[tokio::test]
    async fn test_summarize_without_dependencies() {
        let app = memory_app();
        let t = seed(&app, &["Alone"]).await;
        let args = SummarizeArgs { ticket: t[0].id };
        execute_summarize(&app, &args, OutputMode::Json).await.unwrap();
    }
}

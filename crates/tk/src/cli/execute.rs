//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands. Each
//! function receives the [`App`] built once by [`Cli::execute`](super::Cli::execute).

use std::io::{self, IsTerminal, Read};
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde_json::json;
use tk_frontmatter::format_inline_list;

use super::args::{
    ClosedArgs, DepAction, DepArgs, FixArgs, IdArgs, LinkArgs, ListArgs, NewArgs, NoteArgs,
    RmArgs, StatusArgs, UndepArgs, UnlinkArgs,
};
use crate::app::App;
use crate::codec::format_timestamp;
use crate::deptree::{DepTree, RenderMode};
use crate::domain::{Ticket, TicketStatus};
use crate::error::Error;
use crate::id_generation::{IdGenerator, IdGeneratorConfig};
use crate::output::{self, OutputConfig, OutputMode, Related, TicketJson};
use crate::relations::{self, CleanBlocker};

/// Attempts at creating a ticket before giving up on ID collisions.
const MAX_CREATE_ATTEMPTS: usize = 10;

/// Closed tickets are picked from this many most recently modified records.
const CLOSED_SCAN_LIMIT: usize = 100;

const NOTES_HEADING: &str = "## Notes";

const DEFAULT_EDITOR: &str = "vi";

/// Print a confirmation line, or `value` in JSON mode.
fn report(output_mode: OutputMode, text: &str, value: &serde_json::Value) -> Result<()> {
    match output_mode {
        OutputMode::Json => output::print_json(value)?,
        OutputMode::Text => println!("{text}"),
    }
    Ok(())
}

/// `  - <id> [status] title` lines used in refusal messages.
fn format_ticket_lines(tickets: &[&Ticket]) -> String {
    tickets
        .iter()
        .map(|t| format!("  - {} [{}] {}", t.id, t.status, t.title))
        .collect::<Vec<_>>()
        .join("\n")
}

fn git_user_name() -> Option<String> {
    let output = Command::new("git")
        .args(["config", "user.name"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!name.is_empty()).then_some(name)
}

fn compose_body(args: &NewArgs) -> String {
    let mut parts = Vec::new();
    if let Some(description) = args.description.as_deref().filter(|s| !s.is_empty()) {
        parts.push(description.to_string());
    }
    if let Some(design) = args.design.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("## Design\n\n{design}"));
    }
    if let Some(acceptance) = args.acceptance.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("## Acceptance Criteria\n\n{acceptance}"));
    }
    parts.join("\n\n")
}

/// Execute the new command
pub fn execute_new(app: &App, args: &NewArgs, output_mode: OutputMode) -> Result<()> {
    let title = if args.title.is_empty() {
        "Untitled".to_string()
    } else {
        args.title.join(" ")
    };

    let mut generator = IdGenerator::new(IdGeneratorConfig {
        prefix: app.prefix().to_string(),
    });
    for existing in app.store().list()? {
        generator.register_id(existing.id);
    }

    let mut ticket = Ticket::new(String::new(), title);
    ticket.ticket_type = args.ticket_type.into();
    ticket.priority = args.priority;
    ticket.assignee = args
        .assignee
        .clone()
        .or_else(|| app.default_assignee().map(str::to_string))
        .or_else(git_user_name);
    ticket.external_ref.clone_from(&args.external_ref);
    ticket.parent.clone_from(&args.parent);
    ticket.body = compose_body(args);

    let mut attempt = 0;
    loop {
        attempt += 1;
        ticket.id = generator.generate(&ticket.title)?;
        match app.store().create(&ticket) {
            Ok(()) => break,
            Err(Error::AlreadyExists { id }) if attempt < MAX_CREATE_ATTEMPTS => {
                tracing::warn!(%id, attempt, "generated ID already taken, retrying");
            }
            Err(Error::AlreadyExists { .. }) => {
                bail!("failed to generate unique ticket ID after {MAX_CREATE_ATTEMPTS} attempts")
            }
            Err(e) => return Err(e).context("creating ticket"),
        }
    }

    report(output_mode, &ticket.id, &json!({ "id": ticket.id }))
}

/// Execute the show command
pub fn execute_show(app: &App, args: &IdArgs, output_mode: OutputMode) -> Result<()> {
    let ticket = app.store().get(&args.id)?;

    if output_mode == OutputMode::Json {
        output::print_json(&ticket)?;
        return Ok(());
    }

    let tickets = app.store().list()?;
    let find = |id: &str| tickets.iter().find(|t| t.id == id);

    let related = Related {
        parent_title: ticket
            .parent
            .as_deref()
            .and_then(find)
            .map(|parent| parent.title.as_str()),
        blockers: ticket
            .deps
            .iter()
            .filter_map(|dep| find(dep.as_str()))
            .filter(|dep| !dep.is_closed())
            .collect(),
        blocking: relations::dependants(&tickets, &ticket.id)
            .into_iter()
            .filter(|t| !t.is_closed())
            .collect(),
        children: relations::children(&tickets, &ticket.id),
        linked: ticket
            .links
            .iter()
            .filter_map(|id| find(id.as_str()))
            .collect(),
    };

    output::write_ticket_details(
        &mut io::stdout().lock(),
        &ticket,
        &related,
        &OutputConfig::from_env(),
    )?;
    Ok(())
}

/// Execute the list command
pub fn execute_list(app: &App, args: &ListArgs, output_mode: OutputMode) -> Result<()> {
    let mut tickets = app.store().list()?;
    if let Some(status) = args.status {
        let status = TicketStatus::from(status);
        tickets.retain(|t| t.status == status);
    }
    tickets.sort_by(|a, b| a.id.cmp(&b.id));

    output::print_tickets(&tickets, output_mode)?;
    Ok(())
}

/// Execute the ready command
pub fn execute_ready(app: &App, output_mode: OutputMode) -> Result<()> {
    let tickets = app.store().list()?;
    let ready = relations::ready(&tickets);

    match output_mode {
        OutputMode::Json => {
            let json: Vec<TicketJson<'_>> = ready.iter().map(|t| TicketJson::from(*t)).collect();
            output::print_json(&json)?;
        }
        OutputMode::Text => {
            let entries: Vec<(&Ticket, Vec<&str>)> =
                ready.into_iter().map(|t| (t, Vec::new())).collect();
            output::write_priority_list(
                &mut io::stdout().lock(),
                &entries,
                &OutputConfig::from_env(),
            )?;
        }
    }
    Ok(())
}

/// Execute the blocked command
pub fn execute_blocked(app: &App, output_mode: OutputMode) -> Result<()> {
    let tickets = app.store().list()?;
    let blocked = relations::blocked(&tickets);

    match output_mode {
        OutputMode::Json => {
            let mut json = Vec::with_capacity(blocked.len());
            for (ticket, blockers) in &blocked {
                let mut value = serde_json::to_value(TicketJson::from(*ticket))?;
                value["blockers"] = json!(blockers);
                json.push(value);
            }
            output::print_json(&json)?;
        }
        OutputMode::Text => {
            output::write_priority_list(
                &mut io::stdout().lock(),
                &blocked,
                &OutputConfig::from_env(),
            )?;
        }
    }
    Ok(())
}

/// Execute the closed command
pub fn execute_closed(app: &App, args: &ClosedArgs, output_mode: OutputMode) -> Result<()> {
    let recent = app.store().list_by_mod_time(CLOSED_SCAN_LIMIT)?;
    let closed: Vec<&Ticket> = recent
        .iter()
        .filter(|t| t.is_closed())
        .take(args.limit)
        .collect();

    match output_mode {
        OutputMode::Json => {
            let json: Vec<TicketJson<'_>> = closed.iter().map(|t| TicketJson::from(*t)).collect();
            output::print_json(&json)?;
        }
        OutputMode::Text => {
            output::write_ticket_summaries(
                &mut io::stdout().lock(),
                &closed,
                &OutputConfig::from_env(),
            )?;
        }
    }
    Ok(())
}

/// Set the status of a ticket (`status`, `start`, `close`, `reopen`)
pub fn execute_set_status(
    app: &App,
    partial: &str,
    status: TicketStatus,
    output_mode: OutputMode,
) -> Result<()> {
    let id = app.store().update_field(partial, "status", status.as_str())?;
    report(
        output_mode,
        &format!("Updated {id} -> {status}"),
        &json!({ "id": id, "status": status }),
    )
}

/// Execute the status command
pub fn execute_status(app: &App, args: &StatusArgs, output_mode: OutputMode) -> Result<()> {
    execute_set_status(app, &args.id, args.status.into(), output_mode)
}

/// Execute the dep command
pub fn execute_dep(app: &App, args: &DepArgs, output_mode: OutputMode) -> Result<()> {
    if let Some(DepAction::Tree { full, id }) = &args.action {
        return execute_dep_tree(app, id, *full, output_mode);
    }

    let (Some(id), Some(dep_id)) = (&args.id, &args.dep_id) else {
        bail!("usage: tk dep <id> <dependency-id>");
    };

    let ticket = app.store().get(id)?;
    let dep = app.store().get(dep_id)?;

    if ticket.deps.contains(&dep.id) {
        return report(
            output_mode,
            "Dependency already exists",
            &json!({ "id": ticket.id, "dep": dep.id, "added": false }),
        );
    }

    let mut deps = ticket.deps.clone();
    deps.push(dep.id.clone());
    let id = app
        .store()
        .update_field(&ticket.id, "deps", &format_inline_list(&deps))?;

    report(
        output_mode,
        &format!("Added dependency: {id} -> {}", dep.id),
        &json!({ "id": id, "dep": dep.id, "added": true }),
    )
}

fn execute_dep_tree(app: &App, partial: &str, full: bool, output_mode: OutputMode) -> Result<()> {
    let tickets = app.ticket_map()?;
    if tickets.is_empty() {
        bail!("no tickets found");
    }

    let root = app.store().resolve(partial)?;
    let mode = if full {
        RenderMode::Full
    } else {
        RenderMode::Deduplicated
    };
    let tree = DepTree::build(&tickets, &root);
    output::print_dep_tree(&tree.rows(mode), output_mode)?;
    Ok(())
}

/// Pick the dep entry named by `partial`: an exact entry wins, otherwise a
/// single entry containing it. Dangling deps can be matched too.
fn match_dep<'a>(deps: &'a [String], partial: &str) -> Result<&'a str> {
    if let Some(exact) = deps.iter().find(|d| *d == partial) {
        return Ok(exact.as_str());
    }

    let matches: Vec<&'a String> = deps.iter().filter(|d| d.contains(partial)).collect();
    match matches.len() {
        0 => bail!("dependency not found"),
        1 => {
            let only: &'a String = matches[0];
            Ok(only.as_str())
        }
        _ => Err(Error::Ambiguous {
            id: partial.to_string(),
            matches: matches.into_iter().cloned().collect(),
        }
        .into()),
    }
}

/// Execute the undep command
pub fn execute_undep(app: &App, args: &UndepArgs, output_mode: OutputMode) -> Result<()> {
    let ticket = app.store().get(&args.id)?;
    let removed = match_dep(&ticket.deps, &args.dep_id)?;

    let deps = relations::without(&ticket.deps, &[removed]);
    let id = app
        .store()
        .update_field(&ticket.id, "deps", &format_inline_list(&deps))?;

    report(
        output_mode,
        &format!("Removed dependency: {id} -/-> {removed}"),
        &json!({ "id": id, "dep": removed }),
    )
}

/// Execute the link command
pub fn execute_link(app: &App, args: &LinkArgs, output_mode: OutputMode) -> Result<()> {
    let mut tickets: Vec<Ticket> = Vec::with_capacity(args.ids.len());
    for partial in &args.ids {
        let ticket = app.store().get(partial)?;
        if !tickets.iter().any(|t| t.id == ticket.id) {
            tickets.push(ticket);
        }
    }
    if tickets.len() < 2 {
        bail!("link needs at least two different tickets");
    }

    let mut added = 0;
    for ticket in &tickets {
        let mut links = ticket.links.clone();
        for other in &tickets {
            if other.id != ticket.id && !links.contains(&other.id) {
                links.push(other.id.clone());
                added += 1;
            }
        }
        if links.len() != ticket.links.len() {
            app.store()
                .update_field(&ticket.id, "links", &format_inline_list(&links))?;
        }
    }

    let ids: Vec<&str> = tickets.iter().map(|t| t.id.as_str()).collect();
    let text = if added == 0 {
        "All links already exist".to_string()
    } else {
        format!("Added {added} link(s) between {} tickets", tickets.len())
    };
    report(output_mode, &text, &json!({ "ids": ids, "added": added }))
}

/// Execute the unlink command
pub fn execute_unlink(app: &App, args: &UnlinkArgs, output_mode: OutputMode) -> Result<()> {
    let source = app.store().get(&args.id)?;
    let target = app.store().get(&args.other_id)?;

    if !source.links.contains(&target.id) {
        bail!("link not found");
    }

    for (ticket, other) in [(&source, &target), (&target, &source)] {
        let links = relations::without(&ticket.links, &[other.id.as_str()]);
        app.store()
            .update_field(&ticket.id, "links", &format_inline_list(&links))?;
    }

    report(
        output_mode,
        &format!("Removed link: {} <-> {}", source.id, target.id),
        &json!({ "ids": [source.id, target.id] }),
    )
}

/// Execute the rm command
pub fn execute_rm(app: &App, args: &RmArgs, output_mode: OutputMode) -> Result<()> {
    let target = app.store().get(&args.id)?;
    let tickets = app.store().list()?;

    let dependants = relations::dependants(&tickets, &target.id);
    if !dependants.is_empty() {
        bail!(
            "cannot delete {}: ticket has dependants\n\nBlocking tickets (dependants):\n{}",
            target.id,
            format_ticket_lines(&dependants)
        );
    }

    let children = relations::children(&tickets, &target.id);
    if !children.is_empty() {
        bail!(
            "cannot delete {}: ticket has children\n\nBlocking tickets (children):\n{}",
            target.id,
            format_ticket_lines(&children)
        );
    }

    let linked: Vec<&Ticket> = target
        .links
        .iter()
        .filter_map(|id| tickets.iter().find(|t| &t.id == id))
        .collect();

    if !target.links.is_empty() && !args.force {
        bail!(
            "cannot delete {}: ticket has links\n\nLinked tickets:\n{}\n\nUse --force to remove links and delete",
            target.id,
            format_ticket_lines(&linked)
        );
    }

    let mut links_removed = 0;
    for other in &linked {
        let links = relations::without(&other.links, &[target.id.as_str()]);
        app.store()
            .update_field(&other.id, "links", &format_inline_list(&links))
            .with_context(|| format!("failed to unlink {}", other.id))?;
        links_removed += 1;
    }

    let id = app.store().delete(&target.id)?;

    let text = if links_removed > 0 {
        format!("Removed {links_removed} link(s) and deleted ticket: {id}")
    } else {
        format!("Deleted ticket: {id}")
    };
    report(
        output_mode,
        &text,
        &json!({ "id": id, "links_removed": links_removed }),
    )
}

/// Execute the prune command
pub fn execute_prune(app: &App, args: &FixArgs) -> Result<()> {
    let tickets = app.store().list()?;
    if tickets.is_empty() {
        println!("No tickets found.");
        return Ok(());
    }

    let dangling = relations::dangling_refs(&tickets);
    if dangling.is_empty() {
        println!("No dangling references found.");
        return Ok(());
    }

    if !args.fix {
        print_prune_report(&dangling);
        return Ok(());
    }

    let config = OutputConfig::from_env();
    let mut fixed = 0;
    let mut fixed_tickets = 0;

    println!("Pruning dangling references...");
    println!();

    for refs in &dangling {
        let ticket = refs.ticket;
        let mut touched = false;

        let updates = [
            ("deps", &ticket.deps, &refs.deps),
            ("links", &ticket.links, &refs.links),
        ];
        for (field, current, missing) in updates {
            if missing.is_empty() {
                continue;
            }
            let kept = relations::without(current, missing);
            match app
                .store()
                .update_field(&ticket.id, field, &format_inline_list(&kept))
            {
                Ok(_) => {
                    println!("{}: Removed {field}: {}", ticket.id, missing.join(", "));
                    fixed += missing.len();
                    touched = true;
                }
                Err(e) => eprintln!(
                    "{}",
                    output::warning(
                        &format!("Warning: failed to update {field} for {}: {e}", ticket.id),
                        &config
                    )
                ),
            }
        }

        if let Some(parent) = refs.parent {
            match app.store().update_field(&ticket.id, "parent", "") {
                Ok(_) => {
                    println!("{}: Removed parent: {parent}", ticket.id);
                    fixed += 1;
                    touched = true;
                }
                Err(e) => eprintln!(
                    "{}",
                    output::warning(
                        &format!("Warning: failed to update parent for {}: {e}", ticket.id),
                        &config
                    )
                ),
            }
        }

        if touched {
            fixed_tickets += 1;
        }
    }

    println!();
    println!("Pruned {fixed} dangling reference(s) from {fixed_tickets} ticket(s).");
    Ok(())
}

fn print_prune_report(dangling: &[relations::DanglingRefs<'_>]) {
    let mut deps = 0;
    let mut links = 0;
    let mut parents = 0;

    println!("Scanning tickets for dangling references...");
    println!();
    println!("Found dangling references in {} ticket(s):", dangling.len());
    println!();

    for refs in dangling {
        let ticket = refs.ticket;
        println!("{} [{}] {}", ticket.id, ticket.status, ticket.title);
        if !refs.deps.is_empty() {
            println!("  deps: {} (do not exist)", refs.deps.join(", "));
            deps += refs.deps.len();
        }
        if !refs.links.is_empty() {
            println!("  links: {} (do not exist)", refs.links.join(", "));
            links += refs.links.len();
        }
        if let Some(parent) = refs.parent {
            println!("  parent: {parent} (does not exist)");
            parents += 1;
        }
        println!();
    }

    println!("Summary:");
    if deps > 0 {
        println!("  {deps} dangling deps");
    }
    if links > 0 {
        println!("  {links} dangling links");
    }
    if parents > 0 {
        println!("  {parents} dangling parent(s)");
    }
    println!("  {} total dangling references", deps + links + parents);
    println!();
    println!("Run with --fix to remove these references.");
}

/// Execute the clean command
pub fn execute_clean(app: &App, args: &FixArgs) -> Result<()> {
    let tickets = app.store().list()?;

    let mut deletable: Vec<&Ticket> = Vec::new();
    let mut blocked: Vec<(&Ticket, CleanBlocker)> = Vec::new();
    for (ticket, blocker) in relations::clean_candidates(&tickets) {
        match blocker {
            Some(reason) => blocked.push((ticket, reason)),
            None => deletable.push(ticket),
        }
    }

    if deletable.is_empty() && blocked.is_empty() {
        println!("No closed tickets found.");
        return Ok(());
    }

    if !args.fix {
        println!(
            "Found {} closed ticket(s):",
            deletable.len() + blocked.len()
        );
        println!("  {} deletable", deletable.len());
        println!("  {} blocked", blocked.len());

        if !blocked.is_empty() {
            println!();
            println!("Blocked tickets:");
            for (ticket, reason) in &blocked {
                println!(
                    "  {} [{}] {} - {reason}",
                    ticket.id, ticket.status, ticket.title
                );
            }
        }

        if !deletable.is_empty() {
            println!();
            println!(
                "Run with --fix to delete {} deletable ticket(s).",
                deletable.len()
            );
        }
        return Ok(());
    }

    if deletable.is_empty() {
        println!(
            "No deletable tickets. All {} closed ticket(s) are blocked.",
            blocked.len()
        );
        return Ok(());
    }

    println!("Deleting closed tickets...");
    println!();

    let config = OutputConfig::from_env();
    let mut deleted = 0;
    let mut failed = 0;
    for ticket in &deletable {
        match app.store().delete(&ticket.id) {
            Ok(id) => {
                println!("Deleted: {id}");
                deleted += 1;
            }
            Err(e) => {
                println!(
                    "{}",
                    output::warning(
                        &format!("Warning: failed to delete {}: {e}", ticket.id),
                        &config
                    )
                );
                failed += 1;
            }
        }
    }

    let mut summary = format!("\nDeleted {deleted} ticket(s)");
    if !blocked.is_empty() {
        summary.push_str(&format!(", skipped {} blocked ticket(s)", blocked.len()));
    }
    if failed > 0 {
        summary.push_str(&format!(", {failed} error(s)"));
    }
    println!("{summary}.");
    Ok(())
}

/// Execute the edit command
///
/// Without a terminal on stdin the record path is printed instead of
/// launching an editor.
pub fn execute_edit(app: &App, args: &IdArgs, output_mode: OutputMode) -> Result<()> {
    let path = app.store().path(&args.id)?;

    if output_mode == OutputMode::Json || !io::stdin().is_terminal() {
        return report(
            output_mode,
            &format!("Edit ticket file: {}", path.display()),
            &json!({ "path": path }),
        );
    }

    let editor = std::env::var("EDITOR")
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
    tracing::debug!(%editor, path = %path.display(), "launching editor");

    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("failed to launch editor '{editor}'"))?;
    if !status.success() {
        bail!("editor '{editor}' exited with {status}");
    }
    Ok(())
}

/// Execute the note command
pub fn execute_note(app: &App, args: &NoteArgs, output_mode: OutputMode) -> Result<()> {
    let note = if args.text.is_empty() {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            bail!("no note provided");
        }
        let mut input = String::new();
        stdin
            .lock()
            .read_to_string(&mut input)
            .context("reading stdin")?;
        input.lines().collect::<Vec<_>>().join("\n")
    } else {
        args.text.join(" ")
    };

    let (id, content) = app.store().read_raw(&args.id)?;

    let mut entry = String::new();
    if !content.contains(NOTES_HEADING) {
        entry.push('\n');
        entry.push_str(NOTES_HEADING);
        entry.push('\n');
    }
    let timestamp = format_timestamp(&Utc::now());
    entry.push_str(&format!("\n**{timestamp}**\n\n{note}\n"));

    let id = app.store().append(&id, &entry)?;

    report(
        output_mode,
        &format!("Note added to {id}"),
        &json!({ "id": id, "timestamp": timestamp }),
    )
}

/// Execute the query command
pub fn execute_query(app: &App) -> Result<()> {
    let mut tickets = app.store().list()?;
    tickets.sort_by(|a, b| a.id.cmp(&b.id));
    output::write_json_lines(&mut io::stdout().lock(), &tickets)?;
    Ok(())
}

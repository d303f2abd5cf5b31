//! Plain-text rendering of store state.

use chrono::{DateTime, Utc};
use serde_json::Value;

use eventkit_core::RunUid;
use eventkit_store::{ExportsData, GroupsState, NotificationsState, ProvidersState, UsersState};

pub fn print_runs(data: &ExportsData, ids: &[RunUid]) {
    println!("Runs ({}):", ids.len());
    println!(
        "{:<36}  {:<10}  {:<12}  {:<16}  {}",
        "UID", "STATUS", "USER", "STARTED", "NAME"
    );
    println!("{}", "-".repeat(100));

    for run in data.runs_for(ids) {
        let name = data
            .job_for(&run)
            .map(|job| job.name.as_str())
            .unwrap_or("-");
        println!(
            "{:<36}  {:<10}  {:<12}  {:<16}  {}",
            run.uid,
            run.status,
            run.user.as_deref().unwrap_or("-"),
            format_timestamp(run.started_at),
            name
        );
    }
}

pub fn print_run_details(data: &ExportsData, id: &RunUid) {
    let Some(run) = data.run(id) else {
        println!("Run {id} not found");
        return;
    };

    println!("  UID:        {}", run.uid);
    if let Some(job) = data.job_for(run) {
        println!("  Job:        {} ({})", job.name, job.uid);
        if let Some(event) = &job.event {
            println!("  Event:      {event}");
        }
        println!("  Visibility: {}", job.permissions().value.as_str());
    }
    println!("  Status:     {}", run.status);
    println!("  Started:    {}", format_timestamp(run.started_at));
    println!("  Finished:   {}", format_timestamp(run.finished_at));
    println!("  Expires:    {}", format_timestamp(run.expiration));

    let provider_tasks = data.provider_tasks_for(run);
    if !provider_tasks.is_empty() {
        println!("  Providers:");
        for provider_task in provider_tasks.iter().filter(|pt| pt.display) {
            println!(
                "    - {} [{:?}] ({})",
                provider_task.name, provider_task.status, provider_task.uid
            );
            for task in data.tasks_for(provider_task).iter().filter(|t| t.display) {
                let progress = task
                    .progress
                    .map(|p| format!(" {p:.0}%"))
                    .unwrap_or_default();
                println!("        {} [{:?}]{}", task.name, task.status, progress);
            }
        }
    }
}

pub fn print_providers(providers: &ProvidersState, filtered: bool) {
    let listed = if filtered {
        providers
            .filtered
            .ids
            .iter()
            .filter_map(|slug| providers.providers.get(slug).cloned())
            .collect()
    } else {
        providers.listed()
    };

    println!("Providers ({}):", listed.len());
    println!("{:<24}  {:<3}  {:<16}  {}", "SLUG", "FAV", "FORMATS", "NAME");
    println!("{}", "-".repeat(80));

    for provider in listed.iter().filter(|p| p.display && !p.hidden) {
        let favorite = if provider.favorite { "*" } else { "" };
        println!(
            "{:<24}  {:<3}  {:<16}  {}",
            provider.slug,
            favorite,
            provider.default_formats().join(","),
            provider.name
        );
    }
}

pub fn print_groups(groups: &GroupsState) {
    let listed = groups.listed();
    println!("Groups ({}):", listed.len());
    println!("{:<8}  {:<24}  {:<7}  {}", "ID", "NAME", "MEMBERS", "ADMINISTRATORS");
    println!("{}", "-".repeat(80));

    for group in listed {
        println!(
            "{:<8}  {:<24}  {:<7}  {}",
            group.id,
            group.name,
            group.members.len(),
            group.administrators.join(",")
        );
    }
}

pub fn print_users(users: &UsersState) {
    let listed = users.listed();
    println!("Users ({} of {}):", listed.len(), users.total.max(listed.len() as u64));
    println!("{:<20}  {:<24}  {}", "USERNAME", "NAME", "EMAIL");
    println!("{}", "-".repeat(80));

    for user in listed {
        let profile = &user.user;
        let name = format!("{} {}", profile.first_name, profile.last_name);
        println!("{:<20}  {:<24}  {}", profile.username, name.trim(), profile.email);
    }
}

pub fn print_notifications(notifications: &NotificationsState) {
    println!(
        "Notifications ({}, {} unread):",
        notifications.notifications.len(),
        notifications.unread_count.unread_count
    );
    println!("{:<8}  {:<6}  {:<16}  {}", "ID", "UNREAD", "WHEN", "VERB");
    println!("{}", "-".repeat(60));

    for notification in notifications.sorted() {
        let unread = if notification.unread { "*" } else { "" };
        println!(
            "{:<8}  {:<6}  {:<16}  {}",
            notification.id,
            unread,
            format_timestamp(Some(notification.timestamp)),
            notification.verb
        );
    }
}

/// Human readable lines for an error payload.
///
/// Understands the API's `{"errors": [{"title", "detail"}]}` shape and
/// falls back to the raw value.
pub fn error_details(error: &Value) -> Vec<String> {
    if let Some(errors) = error.get("errors").and_then(Value::as_array) {
        return errors
            .iter()
            .map(|e| {
                let title = e.get("title").and_then(Value::as_str);
                let detail = e.get("detail").and_then(Value::as_str);
                match (title, detail) {
                    (Some(title), Some(detail)) => format!("{title}: {detail}"),
                    (None, Some(text)) | (Some(text), None) => text.to_string(),
                    (None, None) => e.to_string(),
                }
            })
            .collect();
    }
    if let Some(detail) = error.get("detail").and_then(Value::as_str) {
        return vec![detail.to_string()];
    }
    match error {
        Value::String(s) => vec![s.clone()],
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

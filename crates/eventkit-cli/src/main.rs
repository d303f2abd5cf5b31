//! EventKit CLI - browse and manage DataPacks from the terminal.

use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use eventkit_client::{ClientConfig, FeaturedQuery, HttpClient, RunQuery};
use eventkit_core::{
    CoreError, GroupId, JobUid, NotificationId, Permissions, ProviderSlug, ProviderTaskUid,
    RunStatus, RunUid, Visibility,
};
use eventkit_store::{MutationStatus, Session, Store};

mod render;

type CliResult = Result<(), Box<dyn Error>>;

/// EventKit CLI - DataPack management tool
#[derive(Parser)]
#[command(name = "eventkit")]
#[command(about = "CLI for the EventKit export server", long_about = None)]
struct Cli {
    /// Server address
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Value of the csrftoken cookie for mutating requests
    #[arg(long)]
    csrf_token: Option<String>,

    /// Logged in user; required for notifications
    #[arg(long)]
    username: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search DataPacks
    Runs {
        /// Only runs with these statuses (COMPLETED, FAILED, ...)
        #[arg(short, long)]
        status: Vec<String>,

        /// Free text search
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Sort order, e.g. -started_at
        #[arg(long)]
        ordering: Option<String>,

        /// Only runs owned by the logged in user
        #[arg(long)]
        mine: bool,

        #[arg(long, default_value_t = 12)]
        page_size: u32,
    },

    /// List featured DataPacks
    Featured {
        #[arg(long, default_value_t = 4)]
        page_size: u32,
    },

    /// Show a DataPack and its providers
    Datapack {
        /// Job UID
        job: String,
    },

    /// Delete a run
    #[command(name = "delete-run")]
    DeleteRun { run: String },

    /// Change when a run's files expire
    Extend {
        run: String,

        /// New expiration date (YYYY-MM-DD)
        date: String,
    },

    /// Start a new run for a DataPack
    Rerun { job: String },

    /// Change who can see a DataPack
    Share {
        job: String,

        #[arg(long, value_enum)]
        visibility: ShareVisibility,

        /// User to share with (repeatable)
        #[arg(long)]
        member: Vec<String>,

        /// Group to share with (repeatable)
        #[arg(long)]
        group: Vec<String>,
    },

    /// Cancel one provider of a running export
    #[command(name = "cancel-task")]
    CancelTask { provider_task: String },

    /// List data providers
    Providers {
        /// Only providers covering the area in this GeoJSON file
        #[arg(long)]
        geojson: Option<PathBuf>,
    },

    /// Mark or unmark a provider as favorite
    Favorite {
        slug: String,

        #[arg(long)]
        off: bool,
    },

    /// List notifications
    Notifications {
        #[arg(long)]
        page_size: Option<u32>,
    },

    #[command(name = "mark-read")]
    MarkRead { ids: Vec<String> },

    #[command(name = "mark-unread")]
    MarkUnread { ids: Vec<String> },

    #[command(name = "mark-all-read")]
    MarkAllRead,

    #[command(name = "remove-notifications")]
    RemoveNotifications { ids: Vec<String> },

    #[command(name = "unread-count")]
    UnreadCount,

    /// Recently viewed DataPacks
    Viewed {
        #[arg(long, default_value_t = 6)]
        page_size: u32,
    },

    /// Record a DataPack view
    #[command(name = "view-job")]
    ViewJob { job: String },

    /// List sharing groups
    Groups,

    #[command(name = "create-group")]
    CreateGroup {
        name: String,

        /// Initial member (repeatable)
        #[arg(long)]
        member: Vec<String>,
    },

    #[command(name = "delete-group")]
    DeleteGroup { id: String },

    #[command(name = "add-group-users")]
    AddGroupUsers { id: String, users: Vec<String> },

    #[command(name = "remove-group-users")]
    RemoveGroupUsers { id: String, users: Vec<String> },

    /// List users
    Users {
        /// Include each user's permission on this DataPack
        #[arg(long)]
        job: Option<String>,

        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },

    /// Poll the DataPack library and redraw on change
    Watch {
        /// Seconds between polls
        #[arg(long, default_value_t = 10)]
        interval: u64,

        #[arg(long, default_value_t = 12)]
        page_size: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ShareVisibility {
    Private,
    Public,
    Shared,
}

impl From<ShareVisibility> for Visibility {
    fn from(v: ShareVisibility) -> Self {
        match v {
            ShareVisibility::Private => Visibility::Private,
            ShareVisibility::Public => Visibility::Public,
            ShareVisibility::Shared => Visibility::Shared,
        }
    }
}

#[tokio::main]
async fn main() -> CliResult {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("eventkit=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::new(cli.url);
    if let Some(token) = cli.csrf_token {
        config = config.with_csrf_token(token);
    }
    let client = HttpClient::new(&config)?;
    let session = Session::new(Arc::new(Store::new()), Arc::new(client));
    if let Some(username) = cli.username {
        session.log_in(username);
    }

    match cli.command {
        Commands::Runs {
            status,
            search,
            ordering,
            mine,
            page_size,
        } => {
            let query = RunQuery {
                page_size: Some(page_size),
                ordering,
                search,
                status: status_filter(&status)?,
                owner_filter: mine
                    .then(|| session.state().username().map(str::to_string))
                    .flatten(),
                ..Default::default()
            };
            list_runs(&session, query).await?;
        }
        Commands::Featured { page_size } => {
            finish(session.get_featured_runs(FeaturedQuery {
                page_size: Some(page_size),
                is_auto: false,
            }))
            .await?;
            let state = session.state();
            check(state.exports.featured.status.error.as_ref())?;
            render::print_runs(&state.exports.data, &state.exports.featured.ids);
        }
        Commands::Datapack { job } => {
            let job = JobUid::new(job);
            finish(session.get_datacart_details(&job)).await?;
            let state = session.state();
            check(state.exports.datacart_details.status.error.as_ref())?;
            match state.exports.datacart_details.ids.first() {
                Some(run) => render::print_run_details(&state.exports.data, run),
                None => println!("No runs for DataPack {job}"),
            }
            if session.state().username().is_some() {
                finish(session.view_job(&job)).await?;
            }
        }
        Commands::DeleteRun { run } => {
            let run = RunUid::new(run);
            finish(session.delete_run(&run)).await?;
            check_mutation(&session.state().exports.deletion)?;
            println!("Run {run} deleted");
        }
        Commands::Extend { run, date } => {
            let expiration = NaiveDate::parse_from_str(&date, "%Y-%m-%d")?
                .and_hms_opt(0, 0, 0)
                .ok_or("invalid expiration date")?
                .and_utc();
            let run = RunUid::new(run);
            finish(session.update_expiration(&run, expiration)).await?;
            check_mutation(&session.state().exports.expiration)?;
            println!("Run {run} now expires {}", expiration.format("%Y-%m-%d"));
        }
        Commands::Rerun { job } => {
            finish(session.rerun_export(&JobUid::new(job))).await?;
            let state = session.state();
            check_mutation(&state.exports.rerun.status)?;
            let run = state
                .exports
                .rerun
                .data
                .as_ref()
                .and_then(|data| data.get("uid"))
                .and_then(Value::as_str)
                .unwrap_or("-");
            println!("Export resubmitted as run {run}");
            session.clear_rerun_info();
        }
        Commands::Share {
            job,
            visibility,
            member,
            group,
        } => {
            let permissions = Permissions {
                value: visibility.into(),
                members: member.into_iter().map(|m| (m, "READ".to_string())).collect(),
                groups: group.into_iter().map(|g| (g, "READ".to_string())).collect(),
            };
            finish(session.update_datacart_permissions(&JobUid::new(job), &permissions)).await?;
            check_mutation(&session.state().exports.permissions)?;
            println!("Permissions updated");
        }
        Commands::CancelTask { provider_task } => {
            finish(session.cancel_provider_task(&ProviderTaskUid::new(provider_task))).await?;
            check_mutation(&session.state().exports.provider_task_cancel)?;
            println!("Provider task canceled");
        }
        Commands::Providers { geojson } => match geojson {
            Some(path) => {
                let area: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
                finish(session.filter_providers(&area)).await?;
                let state = session.state();
                check(state.providers.filtered.status.error.as_ref())?;
                render::print_providers(&state.providers, true);
            }
            None => {
                finish(session.get_providers()).await?;
                let state = session.state();
                check(state.providers.status.error.as_ref())?;
                render::print_providers(&state.providers, false);
            }
        },
        Commands::Favorite { slug, off } => {
            let slug = ProviderSlug::new(slug);
            finish(session.toggle_favorite_provider(&slug, !off)).await?;
            check_mutation(&session.state().providers.favorite)?;
            println!("{slug} favorite: {}", !off);
        }
        Commands::Notifications { page_size } => {
            finish(session.get_notifications(page_size, false)).await?;
            finish(session.get_notifications_unread_count(false)).await?;
            let state = session.state();
            check(state.notifications.status.error.as_ref())?;
            render::print_notifications(&state.notifications);
        }
        Commands::MarkRead { ids } => {
            finish(session.mark_notifications_as_read(notification_ids(&ids))).await?;
            check(session.state().notifications.status.error.as_ref())?;
        }
        Commands::MarkUnread { ids } => {
            finish(session.mark_notifications_as_unread(notification_ids(&ids))).await?;
            check(session.state().notifications.status.error.as_ref())?;
        }
        Commands::MarkAllRead => {
            finish(session.mark_all_notifications_as_read()).await?;
            check(session.state().notifications.status.error.as_ref())?;
        }
        Commands::RemoveNotifications { ids } => {
            finish(session.remove_notifications(notification_ids(&ids))).await?;
            check(session.state().notifications.status.error.as_ref())?;
        }
        Commands::UnreadCount => {
            finish(session.get_notifications_unread_count(false)).await?;
            let state = session.state();
            check(state.notifications.unread_count.status.error.as_ref())?;
            println!("{}", state.notifications.unread_count.unread_count);
        }
        Commands::Viewed { page_size } => {
            finish(session.get_viewed_jobs(page_size, false)).await?;
            let state = session.state();
            check(state.exports.viewed.status.error.as_ref())?;
            render::print_runs(&state.exports.data, &state.exports.viewed.ids);
        }
        Commands::ViewJob { job } => {
            finish(session.view_job(&JobUid::new(job))).await?;
            check_mutation(&session.state().user_activity.viewing)?;
        }
        Commands::Groups => {
            finish(session.get_groups(Vec::new())).await?;
            let state = session.state();
            check(state.groups.status.error.as_ref())?;
            render::print_groups(&state.groups);
        }
        Commands::CreateGroup { name, member } => {
            finish(session.create_group(&name, &member)).await?;
            check_mutation(&session.state().groups.creating)?;
            println!("Group {name} created");
        }
        Commands::DeleteGroup { id } => {
            let id = GroupId::from(id.as_str());
            finish(session.delete_group(&id)).await?;
            check_mutation(&session.state().groups.deleting)?;
            println!("Group {id} deleted");
        }
        Commands::AddGroupUsers { id, users } => {
            finish(session.add_group_users(&GroupId::from(id.as_str()), users)).await?;
            check_mutation(&session.state().groups.adding)?;
        }
        Commands::RemoveGroupUsers { id, users } => {
            finish(session.remove_group_users(&GroupId::from(id.as_str()), users)).await?;
            check_mutation(&session.state().groups.removing)?;
        }
        Commands::Users { job, page_size } => {
            let params = vec![("page_size".to_string(), page_size.to_string())];
            let handle = match job {
                Some(job) => session.get_permission_users(&JobUid::new(job), params, false),
                None => session.get_users(params, false),
            };
            finish(handle).await?;
            let state = session.state();
            check(state.users.status.error.as_ref())?;
            render::print_users(&state.users);
        }
        Commands::Watch {
            interval,
            page_size,
        } => {
            let query = RunQuery {
                page_size: Some(page_size),
                is_auto: true,
                ..Default::default()
            };
            watch(&session, query, Duration::from_secs(interval)).await?;
        }
    }

    Ok(())
}

async fn list_runs(session: &Session, query: RunQuery) -> CliResult {
    finish(session.get_runs(query)).await?;
    let state = session.state();
    check(state.exports.all.status.error.as_ref())?;
    render::print_runs(&state.exports.data, &state.exports.all.ids);
    if state.exports.all.meta.next_page {
        println!("(showing {})", state.exports.all.meta.range);
    }
    Ok(())
}

/// Poll the library, dashboard and notifications, redrawing whenever the
/// exports slice changes.
async fn watch(session: &Session, query: RunQuery, every: Duration) -> CliResult {
    info!(every = ?every, "Watching DataPacks");

    let mut states = session.store().subscribe();
    let mut interval = tokio::time::interval(every);
    let mut shown = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                debug!("Refresh tick");
                session.get_runs(query.clone());
                session.get_featured_runs(FeaturedQuery {
                    page_size: Some(4),
                    is_auto: true,
                });
                session.get_viewed_jobs(6, true);
                if session.state().username().is_some() {
                    session.get_notifications(None, true);
                    session.get_notifications_unread_count(true);
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                let exports = &state.exports;
                let redraw = shown
                    .as_ref()
                    .map_or(true, |last| !Arc::ptr_eq(last, exports));
                if redraw && exports.all.status.fetched {
                    render::print_runs(&exports.data, &exports.all.ids);
                    if state.username().is_some() {
                        println!(
                            "Unread notifications: {}",
                            state.notifications.unread_count.unread_count
                        );
                    }
                    shown = Some(exports.clone());
                }
            }
            _ = &mut ctrl_c => {
                info!("Stopping");
                break;
            }
        }
    }

    Ok(())
}

/// Wait for an operation to settle. `None` means nothing was sent.
async fn finish(handle: Option<JoinHandle<()>>) -> CliResult {
    match handle {
        Some(handle) => Ok(handle.await?),
        None => Err("request not sent (pass --username for notification commands)".into()),
    }
}

fn check(error: Option<&Value>) -> CliResult {
    match error {
        None => Ok(()),
        Some(error) => {
            for line in render::error_details(error) {
                eprintln!("error: {line}");
            }
            Err("request failed".into())
        }
    }
}

fn check_mutation(status: &MutationStatus) -> CliResult {
    check(status.error.as_ref())
}

fn status_filter(statuses: &[String]) -> Result<BTreeMap<String, bool>, CoreError> {
    statuses
        .iter()
        .map(|s| Ok((s.parse::<RunStatus>()?.as_str().to_string(), true)))
        .collect()
}

fn notification_ids(ids: &[String]) -> Vec<NotificationId> {
    ids.iter().map(|id| NotificationId::from(id.as_str())).collect()
}

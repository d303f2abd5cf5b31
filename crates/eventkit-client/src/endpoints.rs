//! Request builders for the EventKit REST endpoints.
//!
//! Each function only describes the request; sending it is up to
//! [`HttpClient::execute`](crate::HttpClient::execute).

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use eventkit_core::{
    GroupId, JobUid, NotificationId, Permissions, ProviderSlug, ProviderTaskUid, RunUid,
};

use crate::query::{FeaturedQuery, RunQuery};
use crate::request::{ApiRequest, MarkAction};

/// Page size used when listing notifications without an explicit one.
pub const DEFAULT_NOTIFICATIONS_PAGE_SIZE: u32 = 12;

/// Activity name recorded when a user opens a DataPack.
pub const VIEWED_ACTIVITY: &str = "viewed";

/// Response header carrying the size of the whole user directory.
pub const TOTAL_USERS_HEADER: &str = "total-users";

const RUNS: &str = "/api/runs";
const RUNS_FILTER: &str = "/api/runs/filter";
const JOBS: &str = "/api/jobs";
const PROVIDERS: &str = "/api/providers";
const PROVIDER_TASKS: &str = "/api/provider_tasks";
const NOTIFICATIONS: &str = "/api/notifications";
const USER_JOB_ACTIVITY: &str = "/api/user/activity/jobs";
const GROUPS: &str = "/api/groups";
const USERS: &str = "/api/users";

// Runs

/// Runs belonging to one job (DataPack details page).
pub fn runs_for_job(job_uid: &JobUid) -> ApiRequest {
    ApiRequest::get(RUNS).param("job_uid", job_uid)
}

/// Filtered, paginated run search.
pub fn filter_runs(query: &RunQuery) -> ApiRequest {
    ApiRequest::post(RUNS_FILTER)
        .params(query.to_params())
        .json(query.to_body())
}

/// Featured runs for the dashboard strip.
pub fn featured_runs(query: &FeaturedQuery) -> ApiRequest {
    ApiRequest::post(RUNS_FILTER).params(query.to_params())
}

pub fn delete_run(uid: &RunUid) -> ApiRequest {
    ApiRequest::delete(format!("{RUNS}/{uid}"))
}

pub fn update_expiration(uid: &RunUid, expiration: DateTime<Utc>) -> ApiRequest {
    ApiRequest::patch(format!("{RUNS}/{uid}")).json(json!({ "expiration": expiration }))
}

// Jobs

/// Start a new run of an existing job.
pub fn rerun_export(job_uid: &JobUid) -> ApiRequest {
    ApiRequest::post(format!("{JOBS}/{job_uid}/run"))
}

pub fn update_job_permissions(job_uid: &JobUid, permissions: &Permissions) -> ApiRequest {
    ApiRequest::patch(format!("{JOBS}/{job_uid}")).json(permissions.to_job_patch())
}

// Providers

pub fn providers() -> ApiRequest {
    ApiRequest::get(PROVIDERS)
}

/// Providers that can serve the given area of interest.
pub fn filter_providers(geojson: &Value) -> ApiRequest {
    ApiRequest::post(format!("{PROVIDERS}/filter")).json(json!({ "geojson": geojson }))
}

pub fn set_provider_favorite(slug: &ProviderSlug, favorite: bool) -> ApiRequest {
    ApiRequest::patch(format!("{PROVIDERS}/{slug}")).json(json!({ "favorite": favorite }))
}

pub fn cancel_provider_task(uid: &ProviderTaskUid) -> ApiRequest {
    ApiRequest::patch(format!("{PROVIDER_TASKS}/{uid}")).json(json!({ "status": "CANCELED" }))
}

// Notifications

pub fn notifications(page_size: Option<u32>) -> ApiRequest {
    ApiRequest::get(format!("{NOTIFICATIONS}/all"))
        .param("page_size", page_size.unwrap_or(DEFAULT_NOTIFICATIONS_PAGE_SIZE))
}

/// Apply the same mark action to every listed notification.
pub fn mark_notifications(ids: &[NotificationId], action: MarkAction) -> ApiRequest {
    let body: Vec<Value> = ids
        .iter()
        .map(|id| json!({ "id": id, "action": action }))
        .collect();
    ApiRequest::post(format!("{NOTIFICATIONS}/mark")).json(Value::Array(body))
}

pub fn mark_all_notifications_as_read() -> ApiRequest {
    ApiRequest::post(format!("{NOTIFICATIONS}/mark_all_as_read"))
}

/// Unread count; the response body is `{"unread": n}`.
pub fn notification_counts() -> ApiRequest {
    ApiRequest::get(format!("{NOTIFICATIONS}/counts"))
}

// User activity

pub fn viewed_jobs(page_size: u32) -> ApiRequest {
    ApiRequest::get(USER_JOB_ACTIVITY)
        .param("activity", VIEWED_ACTIVITY)
        .param("page_size", page_size)
}

pub fn record_job_view(job_uid: &JobUid) -> ApiRequest {
    ApiRequest::post(USER_JOB_ACTIVITY)
        .param("activity", VIEWED_ACTIVITY)
        .json(json!({ "job_uid": job_uid }))
}

// Groups

pub fn groups(params: impl IntoIterator<Item = (String, String)>) -> ApiRequest {
    ApiRequest::get(GROUPS).params(params)
}

pub fn create_group(name: &str, members: &[String]) -> ApiRequest {
    ApiRequest::put(GROUPS).json(json!({ "name": name, "members": members }))
}

pub fn delete_group(id: &GroupId) -> ApiRequest {
    ApiRequest::delete(format!("{GROUPS}/{id}"))
}

pub fn add_group_users(id: &GroupId, usernames: &[String]) -> ApiRequest {
    ApiRequest::post(format!("{GROUPS}/{id}")).json(json!({ "add": usernames }))
}

pub fn remove_group_users(id: &GroupId, usernames: &[String]) -> ApiRequest {
    ApiRequest::post(format!("{GROUPS}/{id}")).json(json!({ "remove": usernames }))
}

// Users

/// The user directory. The full count comes back in the
/// [`TOTAL_USERS_HEADER`] header.
pub fn users(params: impl IntoIterator<Item = (String, String)>) -> ApiRequest {
    ApiRequest::get(USERS).params(params)
}

/// Users annotated with their permission on one job.
pub fn permission_users(
    job_uid: &JobUid,
    params: impl IntoIterator<Item = (String, String)>,
) -> ApiRequest {
    ApiRequest::get(USERS).param("job_uid", job_uid).params(params)
}

/// End the server session.
pub fn logout() -> ApiRequest {
    ApiRequest::get("/logout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::Method;

    #[test]
    fn test_run_paths() {
        let uid = RunUid::new("123");
        assert_eq!(delete_run(&uid).path, "/api/runs/123");
        assert_eq!(delete_run(&uid).method, Method::DELETE);

        let request = runs_for_job(&JobUid::new("456"));
        assert_eq!(request.path, "/api/runs");
        assert_eq!(request.query_value("job_uid"), Some("456"));

        assert_eq!(rerun_export(&JobUid::new("456")).path, "/api/jobs/456/run");
    }

    #[test]
    fn test_update_expiration_body() {
        let when = DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let request = update_expiration(&RunUid::new("123"), when);
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.body, Some(json!({"expiration": "2030-01-01T00:00:00Z"})));
    }

    #[test]
    fn test_mark_body() {
        let ids = vec![NotificationId::from(1), NotificationId::from(2)];
        let request = mark_notifications(&ids, MarkAction::Read);
        assert_eq!(request.path, "/api/notifications/mark");
        assert_eq!(
            request.body,
            Some(json!([
                {"id": 1, "action": "READ"},
                {"id": 2, "action": "READ"},
            ]))
        );
    }

    #[test]
    fn test_notification_defaults() {
        assert_eq!(notifications(None).query_value("page_size"), Some("12"));
        assert_eq!(notifications(Some(50)).query_value("page_size"), Some("50"));
    }

    #[test]
    fn test_viewed_jobs() {
        let list = viewed_jobs(10);
        assert_eq!(list.method, Method::GET);
        assert_eq!(list.query_value("activity"), Some("viewed"));
        assert_eq!(list.query_value("page_size"), Some("10"));

        let record = record_job_view(&JobUid::new("job-1"));
        assert_eq!(record.method, Method::POST);
        assert_eq!(record.body, Some(json!({"job_uid": "job-1"})));
    }

    #[test]
    fn test_featured_runs_params() {
        let request = featured_runs(&FeaturedQuery {
            page_size: Some(4),
            is_auto: false,
        });
        assert_eq!(request.path, "/api/runs/filter");
        assert_eq!(request.query_value("featured"), Some("true"));
        assert_eq!(request.query_value("page_size"), Some("4"));
    }

    #[test]
    fn test_group_requests() {
        let id = GroupId::from(3);
        let members = vec!["admin".to_string(), "jane".to_string()];

        let create = create_group("Analysts", &members);
        assert_eq!(create.method, Method::PUT);
        assert_eq!(create.path, "/api/groups");
        assert_eq!(
            create.body,
            Some(json!({"name": "Analysts", "members": ["admin", "jane"]}))
        );

        let add = add_group_users(&id, &members[1..]);
        assert_eq!(add.method, Method::POST);
        assert_eq!(add.path, "/api/groups/3");
        assert_eq!(add.body, Some(json!({"add": ["jane"]})));

        let remove = remove_group_users(&id, &members[..1]);
        assert_eq!(remove.body, Some(json!({"remove": ["admin"]})));

        assert_eq!(delete_group(&id).method, Method::DELETE);
    }

    #[test]
    fn test_user_requests() {
        let list = users([("page_size".to_string(), "20".to_string())]);
        assert_eq!(list.path, "/api/users");
        assert_eq!(list.query_value("page_size"), Some("20"));
        assert_eq!(list.query_value("job_uid"), None);

        let shared = permission_users(&JobUid::new("job-1"), Vec::new());
        assert_eq!(shared.path, "/api/users");
        assert_eq!(shared.query_value("job_uid"), Some("job-1"));
    }
}

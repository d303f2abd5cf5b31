use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use eventkit_client::{endpoints, FeaturedQuery, PageInfo, RunQuery};
use eventkit_core::{ApiRun, JobUid, Permissions, ProviderTaskUid, RunUid};

use super::{Outcome, Session};
use crate::action::Action;
use crate::normalizer::{normalize_runs, Entities, Normalized};

impl Session {
    /// Filtered run search for the DataPack library.
    pub fn get_runs(&self, query: RunQuery) -> Option<JoinHandle<()>> {
        let cancel = self.begin_fetch(
            "runs",
            query.is_auto,
            |state| &state.exports.all.status,
            |cancel_source| Action::FetchingRuns { cancel_source },
        )?;

        Some(self.fetch(
            "runs",
            cancel,
            endpoints::filter_runs(&query),
            |response| Ok((response.page_info(), response.json::<Vec<ApiRun>>()?)),
            |outcome, (page, runs): (PageInfo, Vec<ApiRun>)| {
                let roots = normalize_runs(runs).into_roots();
                outcome.dispatch(Action::ReceivedRuns {
                    ids: root_ids(&roots),
                    next_page: page.next_page,
                    range: page.range,
                });
                add_each(outcome, roots, |id, username, entities| Action::AddRun {
                    id,
                    username,
                    entities,
                });
            },
            |error| Action::FetchRunsError { error },
        ))
    }

    /// Featured runs for the dashboard.
    pub fn get_featured_runs(&self, query: FeaturedQuery) -> Option<JoinHandle<()>> {
        let cancel = self.begin_fetch(
            "featured runs",
            query.is_auto,
            |state| &state.exports.featured.status,
            |cancel_source| Action::FetchingFeaturedRuns { cancel_source },
        )?;

        Some(self.fetch(
            "featured runs",
            cancel,
            endpoints::featured_runs(&query),
            |response| Ok((response.page_info(), response.json::<Vec<ApiRun>>()?)),
            |outcome, (page, runs): (PageInfo, Vec<ApiRun>)| {
                let roots = normalize_runs(runs).into_roots();
                outcome.dispatch(Action::ReceivedFeaturedRuns {
                    ids: root_ids(&roots),
                    next_page: page.next_page,
                    range: page.range,
                });
                add_each(outcome, roots, |id, username, entities| {
                    Action::AddFeaturedRun {
                        id,
                        username,
                        entities,
                    }
                });
            },
            |error| Action::FetchFeaturedRunsError { error },
        ))
    }

    /// Run behind a DataPack details page. Only the first run returned for
    /// the job is kept.
    pub fn get_datacart_details(&self, job_uid: &JobUid) -> Option<JoinHandle<()>> {
        let cancel = self.begin_fetch(
            "datacart details",
            false,
            |state| &state.exports.datacart_details.status,
            |cancel_source| Action::GettingDatacartDetails { cancel_source },
        )?;

        Some(self.fetch(
            "datacart details",
            cancel,
            endpoints::runs_for_job(job_uid),
            |response| response.json::<Vec<ApiRun>>(),
            |outcome, runs: Vec<ApiRun>| {
                let roots = normalize_runs(runs.into_iter().take(1).collect()).into_roots();
                outcome.dispatch(Action::DatacartDetailsReceived {
                    ids: root_ids(&roots),
                });
                add_each(outcome, roots, |id, username, entities| Action::AddRun {
                    id,
                    username,
                    entities,
                });
            },
            |error| Action::DatacartDetailsError { error },
        ))
    }

    pub fn clear_datacart_details(&self) {
        self.store.dispatch(Action::ClearDatacartDetails);
    }

    pub fn delete_run(&self, id: &RunUid) -> Option<JoinHandle<()>> {
        self.store.dispatch(Action::DeletingRun { id: id.clone() });
        let deleted = id.clone();
        Some(self.mutate(
            "delete run",
            endpoints::delete_run(id),
            move |_| Action::DeletedRun { id: deleted },
            |error| Action::DeleteRunError { error },
        ))
    }

    /// Change when a run's files expire. The run itself is only updated by
    /// the next fetch.
    pub fn update_expiration(
        &self,
        id: &RunUid,
        expiration: DateTime<Utc>,
    ) -> Option<JoinHandle<()>> {
        self.store.dispatch(Action::UpdatingExpiration { id: id.clone() });
        let updated = id.clone();
        Some(self.mutate(
            "update expiration",
            endpoints::update_expiration(id, expiration),
            move |_| Action::UpdateExpirationSuccess { id: updated },
            |error| Action::UpdateExpirationError { error },
        ))
    }

    pub fn rerun_export(&self, job_uid: &JobUid) -> Option<JoinHandle<()>> {
        self.store.dispatch(Action::RerunningExport {
            job_uid: job_uid.clone(),
        });
        Some(self.mutate(
            "rerun export",
            endpoints::rerun_export(job_uid),
            |response| Action::RerunExportSuccess {
                data: response.body,
            },
            |error| Action::RerunExportError { error },
        ))
    }

    pub fn clear_rerun_info(&self) {
        self.store.dispatch(Action::ClearRerunInfo);
    }

    /// Replace a DataPack's sharing settings.
    pub fn update_datacart_permissions(
        &self,
        job_uid: &JobUid,
        permissions: &Permissions,
    ) -> Option<JoinHandle<()>> {
        self.store.dispatch(Action::UpdatingPermission {
            job_uid: job_uid.clone(),
        });
        let updated = job_uid.clone();
        Some(self.mutate(
            "update permissions",
            endpoints::update_job_permissions(job_uid, permissions),
            move |_| Action::UpdatePermissionSuccess { job_uid: updated },
            |error| Action::UpdatePermissionError { error },
        ))
    }

    pub fn cancel_provider_task(&self, uid: &ProviderTaskUid) -> Option<JoinHandle<()>> {
        self.store
            .dispatch(Action::CancelingProviderTask { uid: uid.clone() });
        let canceled = uid.clone();
        Some(self.mutate(
            "cancel provider task",
            endpoints::cancel_provider_task(uid),
            move |_| Action::CanceledProviderTask { uid: canceled },
            |error| Action::CancelProviderTaskError { error },
        ))
    }

    pub fn set_page_order(&self, order: impl Into<String>) {
        self.store.dispatch(Action::SetPageOrder {
            order: order.into(),
        });
    }

    pub fn set_page_view(&self, view: impl Into<String>) {
        self.store
            .dispatch(Action::SetPageView { view: view.into() });
    }
}

pub(super) fn root_ids(roots: &[Normalized<RunUid>]) -> Vec<RunUid> {
    roots.iter().map(|root| root.result.clone()).collect()
}

/// Dispatch one add action per root, tagged with the current user.
pub(super) fn add_each<F>(outcome: &Outcome<'_>, roots: Vec<Normalized<RunUid>>, make: F)
where
    F: Fn(RunUid, Option<String>, Entities) -> Action,
{
    let username = outcome.username();
    for root in roots {
        outcome.dispatch(make(root.result, username.clone(), root.entities));
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{drain, session};
    use super::*;
    use eventkit_client::CancelSource;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    use crate::creators::CANCEL_REASON;
    use crate::status::MutationStatus;

    fn runs_body() -> Value {
        json!([
            {
                "uid": "run-1",
                "user": "admin",
                "status": "COMPLETED",
                "job": {"uid": "job-1", "name": "Test1", "featured": false},
                "provider_tasks": [{
                    "uid": "pt-1",
                    "name": "OpenStreetMap Data",
                    "tasks": [{"uid": "task-1", "name": "Geopackage", "status": "SUCCESS"}],
                }],
            },
            {
                "uid": "run-2",
                "user": "someone",
                "status": "SUBMITTED",
                "job": {"uid": "job-2", "name": "Test2", "featured": true},
            },
        ])
    }

    fn runs_response() -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("link", "<www.link.com>; rel=\"next\",something else")
            .insert_header("content-range", "range 1-12/24")
            .set_body_json(runs_body())
    }

    #[tokio::test]
    async fn test_get_runs_success() {
        let (session, server) = session().await;
        Mock::given(method("POST"))
            .and(path("/api/runs/filter"))
            .and(query_param("status", "COMPLETED,FAILED"))
            .and(query_param("slim", "true"))
            .respond_with(runs_response())
            .expect(1)
            .mount(&server)
            .await;

        let mut actions = session.store().actions();
        let mut status = BTreeMap::new();
        status.insert("COMPLETED".to_string(), true);
        status.insert("FAILED".to_string(), true);

        session
            .get_runs(RunQuery {
                status,
                ..Default::default()
            })
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            drain(&mut actions),
            vec!["FETCHING_RUNS", "RECEIVED_RUNS", "ADD_RUN", "ADD_RUN"]
        );

        let state = session.state();
        let exports = &state.exports;
        assert_eq!(*exports.all.ids, vec![RunUid::new("run-1"), RunUid::new("run-2")]);
        assert!(exports.all.meta.next_page);
        assert_eq!(exports.all.meta.range, "12/24");
        assert!(exports.all.status.fetched);
        assert_eq!(*exports.own, vec![RunUid::new("run-1")]);
        assert_eq!(exports.data.tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_get_runs_error() {
        let (session, server) = session().await;
        Mock::given(method("POST"))
            .and(path("/api/runs/filter"))
            .respond_with(ResponseTemplate::new(400).set_body_string("oh no an error"))
            .mount(&server)
            .await;

        let mut actions = session.store().actions();
        session
            .get_runs(RunQuery::default())
            .unwrap()
            .await
            .unwrap();

        assert_eq!(drain(&mut actions), vec!["FETCHING_RUNS", "FETCH_RUNS_ERROR"]);
        assert_eq!(
            session.state().exports.all.status.error,
            Some(json!("oh no an error"))
        );
    }

    #[tokio::test]
    async fn test_user_fetch_cancels_auto_fetch() {
        let (session, server) = session().await;
        Mock::given(method("POST"))
            .and(path("/api/runs/filter"))
            .respond_with(runs_response().set_delay(Duration::from_millis(200)))
            .mount(&server)
            .await;

        let mut actions = session.store().actions();
        let auto = session
            .get_runs(RunQuery {
                is_auto: true,
                ..Default::default()
            })
            .unwrap();
        let first_cancel: CancelSource = session
            .state()
            .exports
            .all
            .status
            .cancel_source
            .clone()
            .unwrap();

        let user = session.get_runs(RunQuery::default()).unwrap();
        assert!(first_cancel.is_cancelled());
        assert_eq!(first_cancel.reason(), Some(CANCEL_REASON));

        auto.await.unwrap();
        user.await.unwrap();

        assert_eq!(
            drain(&mut actions),
            vec![
                "FETCHING_RUNS",
                "FETCHING_RUNS",
                "RECEIVED_RUNS",
                "ADD_RUN",
                "ADD_RUN"
            ]
        );
    }

    #[tokio::test]
    async fn test_auto_fetch_while_in_flight_returns_none() {
        let (session, server) = session().await;
        Mock::given(method("POST"))
            .and(path("/api/runs/filter"))
            .respond_with(runs_response().set_delay(Duration::from_millis(200)))
            .expect(1)
            .mount(&server)
            .await;

        let first = session.get_runs(RunQuery::default()).unwrap();
        let skipped = session.get_runs(RunQuery {
            is_auto: true,
            ..Default::default()
        });
        assert!(skipped.is_none());

        let in_flight = session.state().exports.all.status.cancel_source.clone().unwrap();
        assert!(!in_flight.is_cancelled());
        first.await.unwrap();
    }

    #[tokio::test]
    async fn test_get_featured_runs() {
        let (session, server) = session().await;
        Mock::given(method("POST"))
            .and(path("/api/runs/filter"))
            .and(query_param("featured", "true"))
            .and(query_param("page_size", "4"))
            .respond_with(runs_response())
            .mount(&server)
            .await;

        session
            .get_featured_runs(FeaturedQuery {
                page_size: Some(4),
                is_auto: false,
            })
            .unwrap()
            .await
            .unwrap();

        let state = session.state();
        assert_eq!(state.exports.featured.ids.len(), 2);
        assert!(state.exports.all.ids.is_empty());
    }

    #[tokio::test]
    async fn test_get_datacart_details_keeps_first_run() {
        let (session, server) = session().await;
        Mock::given(method("GET"))
            .and(path("/api/runs"))
            .and(query_param("job_uid", "job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(runs_body()))
            .mount(&server)
            .await;

        let mut actions = session.store().actions();
        session
            .get_datacart_details(&JobUid::new("job-1"))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            drain(&mut actions),
            vec!["GETTING_DATACART_DETAILS", "DATACART_DETAILS_RECEIVED", "ADD_RUN"]
        );
        assert_eq!(
            *session.state().exports.datacart_details.ids,
            vec![RunUid::new("run-1")]
        );

        session.clear_datacart_details();
        assert!(session.state().exports.datacart_details.ids.is_empty());
    }

    #[tokio::test]
    async fn test_delete_run_purges_state() {
        let (session, server) = session().await;
        Mock::given(method("POST"))
            .and(path("/api/runs/filter"))
            .respond_with(runs_response())
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/runs/run-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        session.get_runs(RunQuery::default()).unwrap().await.unwrap();
        let handle = session.delete_run(&RunUid::new("run-1")).unwrap();
        assert!(session.state().exports.deletion.pending);
        handle.await.unwrap();

        let state = session.state();
        assert_eq!(*state.exports.all.ids, vec![RunUid::new("run-2")]);
        assert!(state.exports.own.is_empty());
        assert!(state.exports.data.run(&RunUid::new("run-1")).is_none());
        assert_eq!(state.exports.deletion, MutationStatus::done());
    }

    #[tokio::test]
    async fn test_mutations_send_expected_bodies() {
        let (session, server) = session().await;
        Mock::given(method("PATCH"))
            .and(path("/api/runs/run-1"))
            .and(body_json(json!({"expiration": "2030-01-01T00:00:00Z"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/provider_tasks/pt-1"))
            .and(body_json(json!({"status": "CANCELED"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/jobs/job-1"))
            .and(body_json(json!({
                "visibility": "PUBLIC",
                "permissions": {"users": {}, "groups": {}},
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let expiration = DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        session
            .update_expiration(&RunUid::new("run-1"), expiration)
            .unwrap()
            .await
            .unwrap();
        session
            .cancel_provider_task(&ProviderTaskUid::new("pt-1"))
            .unwrap()
            .await
            .unwrap();
        session
            .update_datacart_permissions(
                &JobUid::new("job-1"),
                &Permissions {
                    value: eventkit_core::Visibility::Public,
                    ..Default::default()
                },
            )
            .unwrap()
            .await
            .unwrap();

        let state = session.state();
        assert!(state.exports.expiration.done);
        assert!(state.exports.provider_task_cancel.done);
        assert!(state.exports.permissions.done);
    }

    #[tokio::test]
    async fn test_rerun_export() {
        let (session, server) = session().await;
        Mock::given(method("POST"))
            .and(path("/api/jobs/job-1/run"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"uid": "run-3"})))
            .mount(&server)
            .await;

        session
            .rerun_export(&JobUid::new("job-1"))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(session.state().exports.rerun.data, Some(json!({"uid": "run-3"})));

        session.clear_rerun_info();
        assert!(session.state().exports.rerun.data.is_none());
    }
}

use tokio::task::JoinHandle;

use eventkit_client::{endpoints, PageInfo};
use eventkit_core::{JobUid, ViewedJob};

use super::exports::{add_each, root_ids};
use super::Session;
use crate::action::Action;
use crate::normalizer::normalize_viewed_jobs;

impl Session {
    /// Recently viewed DataPacks, most recent first.
    pub fn get_viewed_jobs(&self, page_size: u32, is_auto: bool) -> Option<JoinHandle<()>> {
        let cancel = self.begin_fetch(
            "viewed jobs",
            is_auto,
            |state| &state.exports.viewed.status,
            |cancel_source| Action::FetchingViewedJobs { cancel_source },
        )?;

        Some(self.fetch(
            "viewed jobs",
            cancel,
            endpoints::viewed_jobs(page_size),
            |response| Ok((response.page_info(), response.json::<Vec<ViewedJob>>()?)),
            |outcome, (page, viewed): (PageInfo, Vec<ViewedJob>)| {
                let roots = normalize_viewed_jobs(viewed).into_roots();
                outcome.dispatch(Action::ReceivedViewedJobs {
                    ids: root_ids(&roots),
                    next_page: page.next_page,
                    range: page.range,
                });
                add_each(outcome, roots, |id, username, entities| Action::AddViewedRun {
                    id,
                    username,
                    entities,
                });
            },
            |error| Action::FetchViewedJobsError { error },
        ))
    }

    /// Record that the user opened a DataPack.
    pub fn view_job(&self, job_uid: &JobUid) -> Option<JoinHandle<()>> {
        self.store.dispatch(Action::ViewingJob {
            job_uid: job_uid.clone(),
        });
        let viewed = job_uid.clone();
        Some(self.mutate(
            "view job",
            endpoints::record_job_view(job_uid),
            move |_| Action::ViewedJob { job_uid: viewed },
            |error| Action::ViewJobError { error },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{drain, session};
    use super::*;
    use eventkit_core::RunUid;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    #[tokio::test]
    async fn test_get_viewed_jobs() {
        let (session, server) = session().await;
        Mock::given(method("GET"))
            .and(path("/api/user/activity/jobs"))
            .and(query_param("activity", "viewed"))
            .and(query_param("page_size", "6"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-range", "range 1-3/3")
                    .set_body_json(json!([
                        {"last_export_run": {"uid": "run-2", "user": "someone", "job": {"uid": "job-2", "name": "Two"}}},
                        {"type": "viewed"},
                        {"last_export_run": {"uid": "run-1", "user": "admin", "job": {"uid": "job-1", "name": "One"}}},
                    ])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut actions = session.store().actions();
        session.get_viewed_jobs(6, false).unwrap().await.unwrap();

        assert_eq!(
            drain(&mut actions),
            vec![
                "FETCHING_VIEWED_JOBS",
                "RECEIVED_VIEWED_JOBS",
                "ADD_VIEWED_RUN",
                "ADD_VIEWED_RUN"
            ]
        );
        let state = session.state();
        assert_eq!(
            *state.exports.viewed.ids,
            vec![RunUid::new("run-2"), RunUid::new("run-1")]
        );
        assert_eq!(state.exports.viewed.meta.range, "3/3");
        assert!(!state.exports.viewed.meta.next_page);
        assert!(state.exports.data.jobs.contains_key(&JobUid::new("job-1")));
    }

    #[tokio::test]
    async fn test_view_job() {
        let (session, server) = session().await;
        Mock::given(method("POST"))
            .and(path("/api/user/activity/jobs"))
            .and(query_param("activity", "viewed"))
            .and(body_json(json!({"job_uid": "job-1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut actions = session.store().actions();
        session
            .view_job(&JobUid::new("job-1"))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(drain(&mut actions), vec!["VIEWING_JOB", "VIEWED_JOB"]);
        assert!(session.state().user_activity.viewing.done);
    }

    #[tokio::test]
    async fn test_view_job_error() {
        let (session, server) = session().await;
        Mock::given(method("POST"))
            .and(path("/api/user/activity/jobs"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "denied"})))
            .mount(&server)
            .await;

        session
            .view_job(&JobUid::new("job-1"))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            session.state().user_activity.viewing.error,
            Some(json!({"detail": "denied"}))
        );
    }
}

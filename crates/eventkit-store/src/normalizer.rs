//! Flattening of nested run responses into id-keyed entity maps.
//!
//! A run response embeds its job, and each provider task embeds its tasks.
//! The store keeps every entity once, keyed by uid, with parents holding
//! ordered id lists instead of children.

use std::collections::BTreeMap;

use serde::Serialize;

use eventkit_core::{
    ApiProviderTask, ApiRun, Job, JobUid, ProviderTask, ProviderTaskUid, Run, RunUid, Task,
    TaskUid, ViewedJob,
};

/// Entity maps produced by normalization, one per entity type.
///
/// An empty map means the response carried no entity of that type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entities {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub runs: BTreeMap<RunUid, Run>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub jobs: BTreeMap<JobUid, Job>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub provider_tasks: BTreeMap<ProviderTaskUid, ProviderTask>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tasks: BTreeMap<TaskUid, Task>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
            && self.jobs.is_empty()
            && self.provider_tasks.is_empty()
            && self.tasks.is_empty()
    }

    /// Fold `other` into `self`. Entries with the same id are replaced.
    pub fn extend(&mut self, other: Entities) {
        self.runs.extend(other.runs);
        self.jobs.extend(other.jobs);
        self.provider_tasks.extend(other.provider_tasks);
        self.tasks.extend(other.tasks);
    }

    /// The run `id` together with its job, provider tasks and tasks.
    pub fn reachable_from(&self, id: &RunUid) -> Entities {
        let mut subset = Entities::default();
        let Some(run) = self.runs.get(id) else {
            return subset;
        };

        if let Some(job) = run.job.as_ref().and_then(|uid| self.jobs.get(uid)) {
            subset.jobs.insert(job.uid.clone(), job.clone());
        }
        for provider_task in run
            .provider_tasks
            .iter()
            .filter_map(|uid| self.provider_tasks.get(uid))
        {
            for task in provider_task
                .tasks
                .iter()
                .filter_map(|uid| self.tasks.get(uid))
            {
                subset.tasks.insert(task.uid.clone(), task.clone());
            }
            subset
                .provider_tasks
                .insert(provider_task.uid.clone(), provider_task.clone());
        }
        subset.runs.insert(id.clone(), run.clone());
        subset
    }

    fn add_run(&mut self, run: ApiRun) -> RunUid {
        let ApiRun {
            uid,
            user,
            status,
            started_at,
            finished_at,
            expiration,
            job,
            provider_tasks,
            extra,
        } = run;

        let job = job.map(|job| {
            let id = job.uid.clone();
            self.jobs.insert(id.clone(), job);
            id
        });

        let provider_tasks = provider_tasks
            .unwrap_or_default()
            .into_iter()
            .map(|task| self.add_provider_task(task))
            .collect();

        self.runs.insert(
            uid.clone(),
            Run {
                uid: uid.clone(),
                user,
                status,
                started_at,
                finished_at,
                expiration,
                job,
                provider_tasks,
                extra,
            },
        );
        uid
    }

    fn add_provider_task(&mut self, provider_task: ApiProviderTask) -> ProviderTaskUid {
        let ApiProviderTask {
            uid,
            name,
            slug,
            status,
            display,
            tasks,
            extra,
        } = provider_task;

        let tasks = tasks
            .unwrap_or_default()
            .into_iter()
            .map(|task| {
                let id = task.uid.clone();
                self.tasks.insert(id.clone(), task);
                id
            })
            .collect();

        self.provider_tasks.insert(
            uid.clone(),
            ProviderTask {
                uid: uid.clone(),
                name,
                slug,
                status,
                display,
                tasks,
                extra,
            },
        );
        uid
    }
}

/// Result of normalizing a response: root reference(s) plus entity maps.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<R> {
    pub result: R,
    pub entities: Entities,
}

impl Normalized<Vec<RunUid>> {
    /// Split a batch into one result per root run, each carrying only the
    /// entities reachable from that run.
    pub fn into_roots(self) -> Vec<Normalized<RunUid>> {
        self.result
            .into_iter()
            .map(|id| Normalized {
                entities: self.entities.reachable_from(&id),
                result: id,
            })
            .collect()
    }
}

/// Normalize a single run.
pub fn normalize_run(run: ApiRun) -> Normalized<RunUid> {
    let mut entities = Entities::default();
    let result = entities.add_run(run);
    Normalized { result, entities }
}

/// Normalize a list of runs. Root ids keep response order; a job shared by
/// several runs ends up as one entry holding the last copy seen.
pub fn normalize_runs(runs: Vec<ApiRun>) -> Normalized<Vec<RunUid>> {
    let mut entities = Entities::default();
    let result = runs.into_iter().map(|run| entities.add_run(run)).collect();
    Normalized { result, entities }
}

/// Normalize the last export run of each viewed job, skipping entries
/// without one.
pub fn normalize_viewed_jobs(viewed: Vec<ViewedJob>) -> Normalized<Vec<RunUid>> {
    normalize_runs(
        viewed
            .into_iter()
            .filter_map(|job| job.last_export_run)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn api_run(uid: &str, job: &str) -> ApiRun {
        serde_json::from_value(json!({
            "uid": uid,
            "user": "admin",
            "status": "COMPLETED",
            "zipfile_url": "http://cloud.eventkit.test/file.zip",
            "job": {"uid": job, "name": format!("name of {uid}"), "featured": false},
            "provider_tasks": [
                {
                    "uid": format!("{uid}-pt1"),
                    "name": "OSM",
                    "status": "COMPLETED",
                    "tasks": [
                        {"uid": format!("{uid}-t1"), "name": "Geopackage", "status": "SUCCESS"},
                        {"uid": format!("{uid}-t2"), "name": "Shapefile", "status": "SUCCESS"},
                    ],
                },
            ],
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_run() {
        let normalized = normalize_run(api_run("run1", "job1"));

        assert_eq!(normalized.result, RunUid::new("run1"));
        let run = &normalized.entities.runs[&RunUid::new("run1")];
        assert_eq!(run.job, Some(JobUid::new("job1")));
        assert_eq!(run.provider_tasks, vec![ProviderTaskUid::new("run1-pt1")]);
        assert_eq!(
            run.extra.get("zipfile_url"),
            Some(&json!("http://cloud.eventkit.test/file.zip"))
        );

        let provider_task = &normalized.entities.provider_tasks[&ProviderTaskUid::new("run1-pt1")];
        assert_eq!(
            provider_task.tasks,
            vec![TaskUid::new("run1-t1"), TaskUid::new("run1-t2")]
        );
        assert_eq!(normalized.entities.tasks.len(), 2);
        assert_eq!(normalized.entities.jobs.len(), 1);
    }

    #[test]
    fn test_shared_job_is_merged() {
        let mut second = api_run("run2", "job1");
        if let Some(job) = second.job.as_mut() {
            job.name = "renamed".to_string();
        }

        let normalized = normalize_runs(vec![api_run("run1", "job1"), second]);

        assert_eq!(
            normalized.result,
            vec![RunUid::new("run1"), RunUid::new("run2")]
        );
        assert_eq!(normalized.entities.jobs.len(), 1);
        assert_eq!(normalized.entities.jobs[&JobUid::new("job1")].name, "renamed");
    }

    #[test]
    fn test_missing_nested_fields_are_omitted() {
        let run: ApiRun = serde_json::from_value(json!({"uid": "bare"})).unwrap();
        let normalized = normalize_run(run);

        assert_eq!(normalized.entities.runs.len(), 1);
        assert!(normalized.entities.jobs.is_empty());
        assert!(normalized.entities.provider_tasks.is_empty());
        assert!(normalized.entities.tasks.is_empty());

        let serialized = serde_json::to_value(&normalized.entities).unwrap();
        assert!(serialized.get("jobs").is_none());
        assert!(serialized.get("tasks").is_none());
    }

    #[test]
    fn test_viewed_jobs_skip_missing_runs() {
        let viewed: Vec<ViewedJob> = serde_json::from_value(json!([
            {"last_export_run": {"uid": "run1"}, "type": "viewed"},
            {"type": "viewed"},
            {"last_export_run": {"uid": "run2"}},
        ]))
        .unwrap();

        let normalized = normalize_viewed_jobs(viewed);
        assert_eq!(
            normalized.result,
            vec![RunUid::new("run1"), RunUid::new("run2")]
        );
    }

    #[test]
    fn test_into_roots() {
        let roots = normalize_runs(vec![api_run("run1", "job1"), api_run("run2", "job2")])
            .into_roots();

        assert_eq!(roots.len(), 2);
        assert_eq!(roots[1].result, RunUid::new("run2"));
        assert_eq!(roots[1].entities, normalize_run(api_run("run2", "job2")).entities);
        assert!(Entities::default()
            .reachable_from(&RunUid::new("missing"))
            .is_empty());
    }

    #[test]
    fn test_entities_extend() {
        let mut entities = normalize_run(api_run("run1", "job1")).entities;
        entities.extend(normalize_run(api_run("run2", "job2")).entities);

        assert_eq!(entities.runs.len(), 2);
        assert_eq!(entities.jobs.len(), 2);
        assert_eq!(entities.tasks.len(), 4);
        assert!(!entities.is_empty());
        assert!(Entities::default().is_empty());
    }
}

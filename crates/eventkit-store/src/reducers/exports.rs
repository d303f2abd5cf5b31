use std::sync::Arc;

use eventkit_core::{JobUid, ProviderTaskUid, RunUid, TaskUid};

use super::{keep_if_equal, merge_entities, push_unique, remove_entities, replace_ids, without};
use crate::action::Action;
use crate::normalizer::Entities;
use crate::state::{
    DatacartDetails, ExportsData, ExportsState, IdList, PageMeta, RerunInfo, RunList,
};
use crate::status::{FetchStatus, MutationStatus};

pub(super) fn reduce(state: &Arc<ExportsState>, action: &Action) -> Arc<ExportsState> {
    let mut next = (**state).clone();

    match action {
        Action::FetchingRuns { cancel_source } => {
            next.all.status = FetchStatus::requesting(cancel_source.clone());
        }
        Action::ReceivedRuns {
            ids,
            next_page,
            range,
        } => received(&mut next.all, ids, *next_page, range),
        Action::FetchRunsError { error } => next.all.status = FetchStatus::failed(error.clone()),
        Action::AddRun {
            id,
            username,
            entities,
        } => {
            if owned_by(entities, id, username.as_deref()) {
                next.own = push_unique(&next.own, id);
            }
            next.data = merge(&next.data, entities);
        }

        Action::FetchingFeaturedRuns { cancel_source } => {
            next.featured.status = FetchStatus::requesting(cancel_source.clone());
        }
        Action::ReceivedFeaturedRuns {
            ids,
            next_page,
            range,
        } => received(&mut next.featured, ids, *next_page, range),
        Action::FetchFeaturedRunsError { error } => {
            next.featured.status = FetchStatus::failed(error.clone());
        }
        Action::AddFeaturedRun { id, entities, .. } => {
            next.featured.ids = push_unique(&next.featured.ids, id);
            next.data = merge(&next.data, entities);
        }

        Action::FetchingViewedJobs { cancel_source } => {
            next.viewed.status = FetchStatus::requesting(cancel_source.clone());
        }
        Action::ReceivedViewedJobs {
            ids,
            next_page,
            range,
        } => received(&mut next.viewed, ids, *next_page, range),
        Action::FetchViewedJobsError { error } => {
            next.viewed.status = FetchStatus::failed(error.clone());
        }
        Action::AddViewedRun { id, entities, .. } => {
            next.viewed.ids = push_unique(&next.viewed.ids, id);
            next.data = merge(&next.data, entities);
        }

        Action::GettingDatacartDetails { cancel_source } => {
            next.datacart_details.status = FetchStatus::requesting(cancel_source.clone());
        }
        Action::DatacartDetailsReceived { ids } => {
            next.datacart_details = DatacartDetails {
                status: FetchStatus::received(),
                ids: replace_ids(&next.datacart_details.ids, ids),
            };
        }
        Action::DatacartDetailsError { error } => {
            next.datacart_details = DatacartDetails {
                status: FetchStatus::failed(error.clone()),
                ids: replace_ids(&next.datacart_details.ids, &[]),
            };
        }
        Action::ClearDatacartDetails => next.datacart_details = DatacartDetails::default(),

        Action::DeletingRun { .. } => next.deletion = MutationStatus::pending(),
        Action::DeletedRun { id } => {
            purge_run(&mut next, id);
            next.deletion = MutationStatus::done();
        }
        Action::DeleteRunError { error } => next.deletion = MutationStatus::failed(error.clone()),

        Action::UpdatingExpiration { .. } => next.expiration = MutationStatus::pending(),
        Action::UpdateExpirationSuccess { .. } => next.expiration = MutationStatus::done(),
        Action::UpdateExpirationError { error } => {
            next.expiration = MutationStatus::failed(error.clone());
        }

        Action::RerunningExport { .. } => {
            next.rerun = RerunInfo {
                status: MutationStatus::pending(),
                data: None,
            };
        }
        Action::RerunExportSuccess { data } => {
            next.rerun = RerunInfo {
                status: MutationStatus::done(),
                data: Some(data.clone()),
            };
        }
        Action::RerunExportError { error } => {
            next.rerun = RerunInfo {
                status: MutationStatus::failed(error.clone()),
                data: None,
            };
        }
        Action::ClearRerunInfo => next.rerun = RerunInfo::default(),

        Action::UpdatingPermission { .. } => next.permissions = MutationStatus::pending(),
        Action::UpdatePermissionSuccess { .. } => next.permissions = MutationStatus::done(),
        Action::UpdatePermissionError { error } => {
            next.permissions = MutationStatus::failed(error.clone());
        }

        Action::CancelingProviderTask { .. } => {
            next.provider_task_cancel = MutationStatus::pending();
        }
        Action::CanceledProviderTask { .. } => next.provider_task_cancel = MutationStatus::done(),
        Action::CancelProviderTaskError { error } => {
            next.provider_task_cancel = MutationStatus::failed(error.clone());
        }

        Action::SetPageOrder { order } => next.order = order.clone(),
        Action::SetPageView { view } => next.view = view.clone(),

        _ => return state.clone(),
    }

    keep_if_equal(state, next)
}

fn received(list: &mut RunList, ids: &[RunUid], next_page: bool, range: &str) {
    list.status = FetchStatus::received();
    list.meta = PageMeta {
        next_page,
        range: range.to_string(),
    };
    list.ids = replace_ids(&list.ids, ids);
}

fn owned_by(entities: &Entities, id: &RunUid, username: Option<&str>) -> bool {
    match (entities.runs.get(id), username) {
        (Some(run), Some(username)) => run.is_owned_by(username),
        _ => false,
    }
}

fn merge(data: &ExportsData, entities: &Entities) -> ExportsData {
    ExportsData {
        runs: merge_entities(&data.runs, entities.runs.clone()),
        jobs: merge_entities(&data.jobs, entities.jobs.clone()),
        provider_tasks: merge_entities(&data.provider_tasks, entities.provider_tasks.clone()),
        tasks: merge_entities(&data.tasks, entities.tasks.clone()),
    }
}

/// Remove a run, its provider tasks and tasks, and every list entry for it.
/// Its job goes too unless another run still points at it.
fn purge_run(state: &mut ExportsState, id: &RunUid) {
    if let Some(run) = state.data.runs.get(id).cloned() {
        let provider_task_ids: Vec<ProviderTaskUid> = run.provider_tasks.clone();
        let task_ids: Vec<TaskUid> = provider_task_ids
            .iter()
            .filter_map(|uid| state.data.provider_tasks.get(uid))
            .flat_map(|pt| pt.tasks.iter().cloned())
            .collect();

        let orphan_job: Vec<JobUid> = run
            .job
            .iter()
            .filter(|job| {
                !state
                    .data
                    .runs
                    .values()
                    .any(|other| other.uid != *id && other.job.as_ref() == Some(*job))
            })
            .cloned()
            .collect();

        state.data = ExportsData {
            runs: remove_entities(&state.data.runs, std::slice::from_ref(id)),
            jobs: remove_entities(&state.data.jobs, &orphan_job),
            provider_tasks: remove_entities(&state.data.provider_tasks, &provider_task_ids),
            tasks: remove_entities(&state.data.tasks, &task_ids),
        };
    }

    let lists: [&mut IdList<RunUid>; 5] = [
        &mut state.all.ids,
        &mut state.featured.ids,
        &mut state.viewed.ids,
        &mut state.own,
        &mut state.datacart_details.ids,
    ];
    for list in lists {
        *list = without(list, id);
    }
}

//! Pure functions folding actions into state.
//!
//! Each slice reducer returns the pointer it was given when the action left
//! the slice unchanged.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::action::Action;
use crate::state::{AppState, EntityMap, IdList};

mod exports;
mod groups;
mod notifications;
mod providers;
mod user;

/// Root reducer.
pub fn reduce(state: &Arc<AppState>, action: &Action) -> Arc<AppState> {
    if let Action::UserLoggedOut = action {
        return keep_if_equal(state, AppState::default());
    }

    let next = AppState {
        exports: exports::reduce(&state.exports, action),
        notifications: notifications::reduce(&state.notifications, action),
        providers: providers::reduce(&state.providers, action),
        user_activity: user::reduce_activity(&state.user_activity, action),
        user: user::reduce_user(&state.user, action),
        groups: groups::reduce_groups(&state.groups, action),
        users: groups::reduce_users(&state.users, action),
    };

    if next.same_slices(state) {
        state.clone()
    } else {
        Arc::new(next)
    }
}

/// Keep `current` when `next` holds the same content.
pub(crate) fn keep_if_equal<T: PartialEq>(current: &Arc<T>, next: T) -> Arc<T> {
    if **current == next {
        current.clone()
    } else {
        Arc::new(next)
    }
}

/// Upsert entities. Entries whose content is unchanged keep their `Arc`,
/// and the map keeps its `Arc` when nothing changed at all.
pub(crate) fn merge_entities<K, V>(
    current: &EntityMap<K, V>,
    incoming: impl IntoIterator<Item = (K, V)>,
) -> EntityMap<K, V>
where
    K: Ord + Clone,
    V: PartialEq,
{
    let mut next: Option<BTreeMap<K, Arc<V>>> = None;
    for (id, entity) in incoming {
        if current.get(&id).is_some_and(|existing| **existing == entity) {
            continue;
        }
        next.get_or_insert_with(|| (**current).clone())
            .insert(id, Arc::new(entity));
    }
    next.map(Arc::new).unwrap_or_else(|| current.clone())
}

/// Replace the whole map with `incoming`, reusing entries that did not change.
pub(crate) fn replace_entities<K, V>(
    current: &EntityMap<K, V>,
    incoming: impl IntoIterator<Item = (K, V)>,
) -> EntityMap<K, V>
where
    K: Ord + Clone,
    V: PartialEq,
{
    let next: BTreeMap<K, Arc<V>> = incoming
        .into_iter()
        .map(|(id, entity)| {
            let entry = match current.get(&id) {
                Some(existing) if **existing == entity => existing.clone(),
                _ => Arc::new(entity),
            };
            (id, entry)
        })
        .collect();

    let unchanged = next.len() == current.len()
        && next
            .iter()
            .all(|(id, entry)| current.get(id).is_some_and(|old| Arc::ptr_eq(old, entry)));
    if unchanged {
        current.clone()
    } else {
        Arc::new(next)
    }
}

/// Drop the given keys from a map.
pub(crate) fn remove_entities<K: Ord + Clone, V>(
    current: &EntityMap<K, V>,
    ids: &[K],
) -> EntityMap<K, V> {
    if !ids.iter().any(|id| current.contains_key(id)) {
        return current.clone();
    }
    let mut next = (**current).clone();
    for id in ids {
        next.remove(id);
    }
    Arc::new(next)
}

/// Take a new canonical order.
pub(crate) fn replace_ids<K: Clone + PartialEq>(current: &IdList<K>, ids: &[K]) -> IdList<K> {
    if current.as_slice() == ids {
        current.clone()
    } else {
        Arc::new(ids.to_vec())
    }
}

/// Append `id` unless it is already listed.
pub(crate) fn push_unique<K: Clone + PartialEq>(current: &IdList<K>, id: &K) -> IdList<K> {
    if current.contains(id) {
        return current.clone();
    }
    let mut next = (**current).clone();
    next.push(id.clone());
    Arc::new(next)
}

/// Remove every occurrence of `id`.
pub(crate) fn without<K: Clone + PartialEq>(current: &IdList<K>, id: &K) -> IdList<K> {
    if !current.contains(id) {
        return current.clone();
    }
    Arc::new(current.iter().filter(|k| *k != id).cloned().collect())
}

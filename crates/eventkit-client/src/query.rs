//! Options accepted by the run search endpoints.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use eventkit_core::{Permissions, Visibility};

/// Longest search term forwarded to the server.
const MAX_SEARCH_LEN: usize = 1000;

/// Options for a filtered, paginated run search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunQuery {
    pub page_size: Option<u32>,
    /// Sort order, `-job__featured` when unset.
    pub ordering: Option<String>,
    /// Only runs owned by this user; `all` disables the filter.
    pub owner_filter: Option<String>,
    /// Status name to whether it is selected.
    ///
    /// A sorted map, so the `status` parameter lists names alphabetically
    /// and equal queries always produce the same request.
    pub status: BTreeMap<String, bool>,
    pub min_date: Option<String>,
    pub max_date: Option<String>,
    pub search: Option<String>,
    pub providers: Vec<String>,
    pub formats: Vec<String>,
    pub projections: Vec<String>,
    pub permissions: Option<Permissions>,
    /// Area of interest as GeoJSON.
    pub geojson: Option<Value>,
    /// Issued by a background poll rather than the user.
    pub is_auto: bool,
}

impl RunQuery {
    /// Query string parameters for `/api/runs/filter`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("slim".to_string(), "true".to_string())];
        let mut push = |key: &str, value: String| params.push((key.to_string(), value));

        if let Some(size) = self.page_size {
            push("page_size", size.to_string());
        }

        let ordering = match self.ordering.as_deref() {
            Some(o) if o.contains("featured") => format!("{},-started_at", o),
            Some(o) => o.to_string(),
            None => "-job__featured".to_string(),
        };
        push("ordering", ordering);

        if let Some(owner) = self.owner_filter.as_deref() {
            if owner != "all" && !owner.is_empty() {
                push("user", owner.to_string());
            }
        }

        let status: Vec<String> = self
            .status
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(name, _)| name.to_uppercase())
            .collect();
        if !status.is_empty() {
            push("status", status.join(","));
        }

        if let Some(min) = &self.min_date {
            push("min_date", min.clone());
        }
        if let Some(max) = &self.max_date {
            push("max_date", max.clone());
        }
        if let Some(search) = &self.search {
            push("search_term", search.chars().take(MAX_SEARCH_LEN).collect());
        }
        if !self.providers.is_empty() {
            push("providers", self.providers.join(","));
        }
        if !self.formats.is_empty() {
            push("formats", self.formats.join(","));
        }
        if !self.projections.is_empty() {
            push("projections", self.projections.join(","));
        }
        if let Some(permissions) = &self.permissions {
            push("visibility", permissions.value.as_str().to_string());
        }

        params
    }

    /// JSON body for `/api/runs/filter`.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();

        if let Some(geojson) = &self.geojson {
            body.insert("geojson".to_string(), Value::String(geojson.to_string()));
        }

        if let Some(permissions) = &self.permissions {
            if permissions.value == Visibility::Shared {
                let groups: Vec<&String> = permissions.groups.keys().collect();
                let members: Vec<&String> = permissions.members.keys().collect();
                body.insert(
                    "permissions".to_string(),
                    json!({ "groups": groups, "members": members }),
                );
            }
        }

        Value::Object(body)
    }
}

/// Options for the featured runs strip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeaturedQuery {
    pub page_size: Option<u32>,
    pub is_auto: bool,
}

impl FeaturedQuery {
    /// Query string parameters for `/api/runs/filter`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("slim".to_string(), "true".to_string())];
        if let Some(size) = self.page_size {
            params.push(("page_size".to_string(), size.to_string()));
        }
        params.push(("featured".to_string(), "true".to_string()));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_defaults() {
        let params = RunQuery::default().to_params();
        assert_eq!(param(&params, "slim"), Some("true"));
        assert_eq!(param(&params, "ordering"), Some("-job__featured"));
        assert_eq!(param(&params, "user"), None);
        assert_eq!(param(&params, "status"), None);
        assert_eq!(RunQuery::default().to_body(), json!({}));
    }

    #[test]
    fn test_selected_statuses_are_joined() {
        let mut query = RunQuery::default();
        query.status.insert("FAILED".to_string(), true);
        query.status.insert("INCOMPLETE".to_string(), false);
        query.status.insert("COMPLETED".to_string(), true);

        let params = query.to_params();
        assert_eq!(param(&params, "status"), Some("COMPLETED,FAILED"));
    }

    #[test]
    fn test_featured_ordering_and_owner() {
        let query = RunQuery {
            ordering: Some("-job__featured".to_string()),
            owner_filter: Some("admin".to_string()),
            ..Default::default()
        };
        let params = query.to_params();
        assert_eq!(param(&params, "ordering"), Some("-job__featured,-started_at"));
        assert_eq!(param(&params, "user"), Some("admin"));

        let all = RunQuery {
            owner_filter: Some("all".to_string()),
            ..Default::default()
        };
        assert_eq!(param(&all.to_params(), "user"), None);
    }

    #[test]
    fn test_search_is_truncated() {
        let query = RunQuery {
            search: Some("x".repeat(1500)),
            ..Default::default()
        };
        let params = query.to_params();
        assert_eq!(param(&params, "search_term").map(str::len), Some(1000));
    }

    #[test]
    fn test_shared_permissions_body() {
        let mut permissions = Permissions {
            value: Visibility::Shared,
            ..Default::default()
        };
        permissions
            .groups
            .insert("group_one".to_string(), "READ".to_string());
        permissions
            .members
            .insert("admin".to_string(), "ADMIN".to_string());

        let query = RunQuery {
            permissions: Some(permissions),
            geojson: Some(json!({"type": "FeatureCollection", "features": []})),
            ..Default::default()
        };

        assert_eq!(param(&query.to_params(), "visibility"), Some("SHARED"));
        let body = query.to_body();
        assert_eq!(body["permissions"], json!({"groups": ["group_one"], "members": ["admin"]}));
        assert!(body["geojson"].is_string());
    }
}

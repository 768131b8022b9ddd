//! Pull-request feature derivation
//!
//! Turns the loaded record sets into one row per pull request carrying the
//! acceptance label and every derived feature. Source tables are only read;
//! the pull-request table is cloned before columns are attached.

use super::aggregate::{
    count_column, group_count, group_nunique, group_sum, map_or_zero, sum_column,
};
use crate::data::{Column, Table, TableSet};
use crate::error::{FusionarError, Result};
use chrono::Timelike;
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

/// Columns recognized as a pull-request identifier, in preference order.
pub const KEY_CANDIDATES: [&str; 3] = ["number", "pr_number", "id"];

/// Prefix of the one-hot agent indicator columns
pub const AGENT_PREFIX: &str = "agent_";

/// Name of the label column
pub const LABEL: &str = "accepted_pr";

static PULL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/pulls/(\d+)$").expect("Invalid pull-number regex"));

/// Join keys resolved on the pull-request table.
///
/// Review comments (v2) only expose the pull-request *number* while every
/// other aggregate is keyed by the internal *id*. Both keys are kept apart;
/// if number and id ever diverge for a pull request, the review-comment count
/// follows the number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrKeys {
    /// Column matched against `pr_id` foreign keys
    pub id: &'static str,
    /// Column matched against numbers parsed from review-comment URLs
    pub number: &'static str,
}

impl PrKeys {
    /// Resolve both keys, failing when no identifier column exists at all.
    pub fn resolve(pr: &Table) -> Result<Self> {
        let fallback = pr
            .first_present(&KEY_CANDIDATES)
            .ok_or_else(|| FusionarError::MissingKeyColumn {
                table: "pull_request".to_string(),
                candidates: KEY_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            })?;

        let id = if pr.has_column("id") { "id" } else { fallback };
        let number = if pr.has_column("number") { "number" } else { fallback };
        Ok(Self { id, number })
    }
}

/// Build the labeled feature table.
///
/// When `agent_filter` is given only pull requests whose `agent` equals it are
/// kept; indicator columns are computed before filtering, so every agent seen
/// in the full table still gets a column.
pub fn build_features(tables: &TableSet, agent_filter: Option<&str>) -> Result<Table> {
    let mut pr = tables.get("pr").clone();
    let keys = PrKeys::resolve(&pr)?;

    encode_agents(&mut pr)?;
    if let Some(agent) = agent_filter {
        pr = filter_agent(&pr, agent);
    }

    pr.insert(LABEL, label_column(&pr))?;
    pr.insert("title_length", text_length(&pr, "title"))?;
    pr.insert("body_length", text_length(&pr, "body"))?;

    add_commit_features(&mut pr, tables.get("pr_commit_details"), keys.id)?;
    add_collaboration_features(&mut pr, tables, keys)?;
    add_issue_link(&mut pr, tables.get("related_issue"), keys.id)?;
    add_temporal_features(&mut pr)?;

    pr.clean_numeric();
    Ok(pr)
}

/// One indicator column per distinct agent value, sorted by value.
fn encode_agents(pr: &mut Table) -> Result<()> {
    let Some(agent) = pr.column("agent") else {
        return Ok(());
    };

    let values: Vec<Option<String>> = (0..pr.n_rows()).map(|i| agent.get_distinct(i)).collect();
    let distinct: BTreeSet<&str> = values.iter().flatten().map(String::as_str).collect();

    let indicators: Vec<(String, Column)> = distinct
        .iter()
        .map(|name| {
            let col: Vec<Option<bool>> = values
                .iter()
                .map(|v| Some(v.as_deref() == Some(*name)))
                .collect();
            (format!("{AGENT_PREFIX}{name}"), Column::Bool(col))
        })
        .collect();

    for (name, col) in indicators {
        pr.insert(name, col)?;
    }
    Ok(())
}

fn filter_agent(pr: &Table, agent: &str) -> Table {
    let Some(col) = pr.column("agent") else {
        return pr.clone();
    };
    let mask: Vec<bool> = (0..pr.n_rows())
        .map(|i| col.get_distinct(i).as_deref() == Some(agent))
        .collect();
    pr.filter(&mask)
}

/// `1` iff `state == "closed"` and `merged_at` is present.
pub fn label_column(pr: &Table) -> Column {
    let state = pr.column("state");
    let merged = pr.column("merged_at");
    Column::Int(
        (0..pr.n_rows())
            .map(|i| {
                let closed = state.and_then(|c| c.get_str(i)) == Some("closed");
                let has_merge = merged.is_some_and(|c| !c.is_null(i));
                Some(i64::from(closed && has_merge))
            })
            .collect(),
    )
}

fn text_length(pr: &Table, name: &str) -> Column {
    match pr.column(name) {
        Some(col) => Column::Int(col.char_lengths()),
        None => Column::Int(vec![Some(0); pr.n_rows()]),
    }
}

fn add_commit_features(pr: &mut Table, details: &Table, id_key: &str) -> Result<()> {
    let n = pr.n_rows();
    let ids = pr.column(id_key);

    let commits = map_or_zero(ids, n, &group_nunique(details, "pr_id", "sha"));
    let files = map_or_zero(ids, n, &group_nunique(details, "pr_id", "filename"));
    let additions = map_or_zero(ids, n, &group_sum(details, "pr_id", "additions"));
    let deletions = map_or_zero(ids, n, &group_sum(details, "pr_id", "deletions"));
    let changes = map_or_zero(ids, n, &group_sum(details, "pr_id", "changes"));

    pr.insert("commits", count_column(commits))?;
    pr.insert("changed_files", count_column(files))?;
    pr.insert("additions", sum_column(additions))?;
    pr.insert("deletions", sum_column(deletions))?;
    pr.insert("total_changes", sum_column(changes))?;
    Ok(())
}

fn add_collaboration_features(pr: &mut Table, tables: &TableSet, keys: PrKeys) -> Result<()> {
    let n = pr.n_rows();
    let comments = tables.get("pr_comments");
    let reviews = tables.get("pr_reviews");

    let ids = pr.column(keys.id);
    let num_comments = map_or_zero(ids, n, &group_count(comments, "pr_id"));
    let num_reviews = map_or_zero(ids, n, &group_count(reviews, "pr_id"));
    let num_reviewers = map_or_zero(ids, n, &group_nunique(reviews, "pr_id", "user"));

    let numbers = pr.column(keys.number);
    let review_comments = review_comments_by_number(tables.get("pr_review_comments_v2"));
    let num_review_comments = map_or_zero(numbers, n, &review_comments);

    pr.insert("num_comments", count_column(num_comments))?;
    pr.insert("num_reviews", count_column(num_reviews))?;
    pr.insert("num_reviewers_unique", count_column(num_reviewers))?;
    pr.insert("num_review_comments", count_column(num_review_comments))?;
    Ok(())
}

/// Extract the pull-request number from a `.../pulls/<n>` URL.
pub fn pull_number_from_url(url: &str) -> Option<i64> {
    PULL_NUMBER
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Review comments per pull-request number parsed from `pull_request_url`.
fn review_comments_by_number(rc: &Table) -> HashMap<i64, f64> {
    let mut counts = HashMap::new();
    let Some(urls) = rc.column("pull_request_url") else {
        return counts;
    };
    for i in 0..rc.n_rows() {
        if let Some(number) = urls.get_str(i).and_then(pull_number_from_url) {
            *counts.entry(number).or_insert(0.0) += 1.0;
        }
    }
    counts
}

fn add_issue_link(pr: &mut Table, related: &Table, id_key: &str) -> Result<()> {
    let linked: HashSet<i64> = match related.column("pr_id") {
        Some(col) => (0..related.n_rows()).filter_map(|i| col.get_key(i)).collect(),
        None => HashSet::new(),
    };

    let ids = pr.column(id_key);
    let flags: Vec<Option<i64>> = (0..pr.n_rows())
        .map(|i| {
            let hit = ids
                .and_then(|c| c.get_key(i))
                .is_some_and(|k| linked.contains(&k));
            Some(i64::from(hit))
        })
        .collect();
    pr.insert("has_issue_linked", Column::Int(flags))
}

fn add_temporal_features(pr: &mut Table) -> Result<()> {
    let n = pr.n_rows();
    let created = pr.column("created_at");
    let closed = pr.column("closed_at");
    let merged = pr.column("merged_at");

    let at = |col: Option<&Column>, i: usize| col.and_then(|c| c.get_datetime(i));

    let duration: Vec<Option<f64>> = (0..n)
        .map(|i| match (at(created, i), at(closed, i)) {
            (Some(start), Some(end)) => Some(days_between(start, end)),
            _ => None,
        })
        .collect();
    let created_hour: Vec<Option<i64>> = (0..n)
        .map(|i| at(created, i).map(|t| i64::from(t.hour())))
        .collect();
    let merged_hour: Vec<Option<i64>> = (0..n)
        .map(|i| at(merged, i).map(|t| i64::from(t.hour())))
        .collect();

    pr.insert("pr_duration_days", Column::Float(duration))?;
    pr.insert("created_hour", Column::Int(created_hour))?;
    pr.insert("merged_hour", Column::Int(merged_hour))?;
    Ok(())
}

/// Fractional days from `start` to `end` (negative if `end` precedes `start`).
pub fn days_between(start: chrono::DateTime<chrono::Utc>, end: chrono::DateTime<chrono::Utc>) -> f64 {
    let delta = end - start;
    let seconds = delta
        .num_microseconds()
        .map_or(delta.num_seconds() as f64, |us| us as f64 / 1e6);
    seconds / 86_400.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_datetime;
    use approx::assert_relative_eq;

    fn ts(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        parse_datetime(s)
    }

    fn pr_table() -> Table {
        Table::from_columns(vec![
            ("id", Column::Int(vec![Some(10), Some(20), Some(30)])),
            ("number", Column::Int(vec![Some(1), Some(2), Some(3)])),
            ("title", Column::strs([Some("Fix bug"), None, Some("Añadir")])),
            ("body", Column::strs([None, Some("body"), Some("")])),
            ("state", Column::strs([Some("closed"), Some("closed"), Some("open")])),
            (
                "created_at",
                Column::DateTime(vec![ts("2024-01-01T00:00:00Z"), ts("2024-02-01T08:30:00Z"), None]),
            ),
            (
                "closed_at",
                Column::DateTime(vec![ts("2024-01-03T12:00:00Z"), ts("2024-02-02T08:30:00Z"), None]),
            ),
            (
                "merged_at",
                Column::DateTime(vec![ts("2024-01-03T12:00:00Z"), None, ts("2024-03-01T00:00:00Z")]),
            ),
            ("agent", Column::strs([Some("Devin"), Some("Codex"), Some("Devin")])),
        ])
        .unwrap()
    }

    fn commit_details() -> Table {
        Table::from_columns(vec![
            ("pr_id", Column::Int(vec![Some(10), Some(10), Some(10)])),
            ("sha", Column::strs([Some("a1"), Some("b2"), Some("c3")])),
            ("filename", Column::strs([Some("x.rs"), Some("y.rs"), Some("x.rs")])),
            ("additions", Column::Int(vec![Some(10), Some(5), Some(0)])),
            ("deletions", Column::Int(vec![Some(0), Some(1), Some(2)])),
            ("changes", Column::Int(vec![Some(10), Some(6), Some(2)])),
        ])
        .unwrap()
    }

    fn int_at(t: &Table, name: &str, i: usize) -> Option<f64> {
        t.column(name).and_then(|c| c.get_f64(i))
    }

    #[test]
    fn test_commit_aggregate_scenario() {
        let tables = TableSet::new()
            .with("pr", pr_table())
            .with("pr_commit_details", commit_details());
        let out = build_features(&tables, None).unwrap();

        assert_eq!(int_at(&out, "commits", 0), Some(3.0));
        assert_eq!(int_at(&out, "changed_files", 0), Some(2.0));
        assert_eq!(int_at(&out, "additions", 0), Some(15.0));
        assert_eq!(int_at(&out, "deletions", 0), Some(3.0));
        assert_eq!(int_at(&out, "total_changes", 0), Some(18.0));
        assert_eq!(int_at(&out, "commits", 1), Some(0.0));
    }

    #[test]
    fn test_label_requires_closed_and_merged() {
        let out = build_features(&TableSet::new().with("pr", pr_table()), None).unwrap();
        // closed+merged, closed+unmerged, open+merged
        assert_eq!(int_at(&out, LABEL, 0), Some(1.0));
        assert_eq!(int_at(&out, LABEL, 1), Some(0.0));
        assert_eq!(int_at(&out, LABEL, 2), Some(0.0));
    }

    #[test]
    fn test_state_must_match_exactly() {
        let pr = Table::from_columns(vec![
            ("id", Column::Int(vec![Some(1)])),
            ("state", Column::strs([Some("Closed")])),
            ("merged_at", Column::DateTime(vec![ts("2024-01-01")])),
        ])
        .unwrap();
        assert_eq!(label_column(&pr), Column::Int(vec![Some(0)]));
    }

    #[test]
    fn test_text_lengths_and_temporal() {
        let out = build_features(&TableSet::new().with("pr", pr_table()), None).unwrap();

        assert_eq!(int_at(&out, "title_length", 0), Some(7.0));
        assert_eq!(int_at(&out, "title_length", 1), Some(0.0));
        assert_eq!(int_at(&out, "title_length", 2), Some(6.0));
        assert_eq!(int_at(&out, "body_length", 1), Some(4.0));

        assert_relative_eq!(int_at(&out, "pr_duration_days", 0).unwrap(), 2.5);
        assert_relative_eq!(int_at(&out, "pr_duration_days", 1).unwrap(), 1.0);
        assert_eq!(int_at(&out, "pr_duration_days", 2), Some(0.0));
        assert_eq!(int_at(&out, "created_hour", 1), Some(8.0));
        assert_eq!(int_at(&out, "merged_hour", 0), Some(12.0));
    }

    #[test]
    fn test_empty_sources_give_zero_counts() {
        let tables = TableSet::new()
            .with("pr", pr_table())
            .with("pr_comments", Table::new())
            .with("pr_reviews", Table::new());
        let out = build_features(&tables, None).unwrap();

        assert_eq!(out.n_rows(), 3);
        for name in [
            "commits",
            "num_comments",
            "num_reviews",
            "num_reviewers_unique",
            "num_review_comments",
            "has_issue_linked",
        ] {
            for i in 0..3 {
                assert_eq!(int_at(&out, name, i), Some(0.0), "{name}[{i}]");
            }
        }
    }

    #[test]
    fn test_collaboration_counts() {
        let reviews = Table::from_columns(vec![
            ("pr_id", Column::Int(vec![Some(10), Some(10), Some(10), Some(20)])),
            ("user", Column::strs([Some("ana"), Some("bo"), Some("ana"), Some("cy")])),
        ])
        .unwrap();
        let comments = Table::from_columns(vec![("pr_id", Column::Int(vec![Some(20), Some(20)]))]).unwrap();
        let related = Table::from_columns(vec![("pr_id", Column::Float(vec![Some(30.0)]))]).unwrap();
        let tables = TableSet::new()
            .with("pr", pr_table())
            .with("pr_reviews", reviews)
            .with("pr_comments", comments)
            .with("related_issue", related);

        let out = build_features(&tables, None).unwrap();
        assert_eq!(int_at(&out, "num_reviews", 0), Some(3.0));
        assert_eq!(int_at(&out, "num_reviewers_unique", 0), Some(2.0));
        assert_eq!(int_at(&out, "num_comments", 1), Some(2.0));
        assert_eq!(int_at(&out, "has_issue_linked", 2), Some(1.0));
        assert_eq!(int_at(&out, "has_issue_linked", 0), Some(0.0));
    }

    #[test]
    fn test_review_comments_join_on_number() {
        let rc = Table::from_columns(vec![(
            "pull_request_url",
            Column::strs([
                Some("https://api.github.com/repos/o/r/pulls/2"),
                Some("https://api.github.com/repos/o/r/pulls/2"),
                Some("https://api.github.com/repos/o/r/pulls/20/files"),
                None,
            ]),
        )])
        .unwrap();
        let tables = TableSet::new()
            .with("pr", pr_table())
            .with("pr_review_comments_v2", rc);

        let out = build_features(&tables, None).unwrap();
        assert_eq!(int_at(&out, "num_review_comments", 1), Some(2.0));
        assert_eq!(int_at(&out, "num_review_comments", 0), Some(0.0));
    }

    #[test]
    fn test_pull_number_from_url() {
        assert_eq!(pull_number_from_url("https://x/repos/a/b/pulls/123"), Some(123));
        assert_eq!(pull_number_from_url("https://x/repos/a/b/pulls/123/"), None);
        assert_eq!(pull_number_from_url("https://x/repos/a/b/issues/5"), None);
    }

    #[test]
    fn test_agent_one_hot_then_filter() {
        let tables = TableSet::new().with("pr", pr_table());
        let out = build_features(&tables, Some("Devin")).unwrap();

        assert_eq!(out.n_rows(), 2);
        assert!(out.has_column("agent_Codex"));
        assert_eq!(out.column("agent_Devin"), Some(&Column::Bool(vec![Some(true), Some(true)])));
        assert_eq!(out.column("agent_Codex"), Some(&Column::Bool(vec![Some(false), Some(false)])));
    }

    #[test]
    fn test_agent_columns_sorted_by_value() {
        let out = build_features(&TableSet::new().with("pr", pr_table()), None).unwrap();
        let agents: Vec<&str> = out
            .column_names()
            .iter()
            .map(String::as_str)
            .filter(|n| n.starts_with(AGENT_PREFIX))
            .collect();
        assert_eq!(agents, vec!["agent_Codex", "agent_Devin"]);
    }

    #[test]
    fn test_missing_identifier_is_fatal() {
        let pr = Table::from_columns(vec![("title", Column::strs([Some("t")]))]).unwrap();
        let err = build_features(&TableSet::new().with("pr", pr), None).unwrap_err();
        assert!(matches!(err, FusionarError::MissingKeyColumn { .. }));

        let err = build_features(&TableSet::new(), None).unwrap_err();
        assert!(matches!(err, FusionarError::MissingKeyColumn { .. }));
    }

    #[test]
    fn test_key_resolution_falls_back() {
        let pr = Table::from_columns(vec![("pr_number", Column::Int(vec![Some(1)]))]).unwrap();
        let keys = PrKeys::resolve(&pr).unwrap();
        assert_eq!(keys, PrKeys { id: "pr_number", number: "pr_number" });

        let keys = PrKeys::resolve(&pr_table()).unwrap();
        assert_eq!(keys, PrKeys { id: "id", number: "number" });
    }

    #[test]
    fn test_build_is_idempotent() {
        let tables = TableSet::new()
            .with("pr", pr_table())
            .with("pr_commit_details", commit_details());
        let a = build_features(&tables, None).unwrap();
        let b = build_features(&tables, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(tables.get("pr"), &pr_table());
    }

    #[test]
    fn test_days_between_negative() {
        let a = ts("2024-01-02").unwrap();
        let b = ts("2024-01-01").unwrap();
        assert_relative_eq!(days_between(a, b), -1.0);
    }
}

//! User and repository enrichment
//!
//! Both joins are left joins on a normalized integer key. A right-hand id that
//! occurs more than once contributes its first row only, so the pull-request
//! row count and order never change.

use super::builder::days_between;
use crate::data::{to_datetime, Column, Table};
use crate::error::Result;
use std::collections::HashMap;

/// User columns carried onto pull requests
const USER_COLUMNS: [&str; 4] = ["user_id", "created_at", "followers", "public_repos"];

/// Repository columns carried onto pull requests
const REPO_COLUMNS: [&str; 5] = ["repo_id", "language", "forks", "stars", "description"];

/// Legacy repository column names and their canonical replacements
const REPO_ALIASES: [(&str, &str); 2] = [("forks_count", "forks"), ("stargazers_count", "stars")];

/// Attach author and repository attributes to the feature table.
pub fn merge_with_user_repo(features: &Table, user: &Table, repo: &Table) -> Result<Table> {
    let merged = merge_user(features, user)?;
    merge_repo(&merged, repo)
}

fn merge_user(features: &Table, user: &Table) -> Result<Table> {
    let mut user = user.clone();
    user.rename("id", "user_id");
    if let Some(col) = user.column("created_at") {
        let coerced = to_datetime(col);
        user.insert("created_at", coerced)?;
    }

    let mut out = left_join(features, &user.select(&USER_COLUMNS), "user_id", "_user")?;

    let n = out.n_rows();
    let tenure: Vec<Option<f64>> = match (out.column("created_at"), out.column("created_at_user")) {
        (Some(pr_created), Some(user_created)) => (0..n)
            .map(|i| {
                let days = match (pr_created.get_datetime(i), user_created.get_datetime(i)) {
                    (Some(end), Some(start)) => days_between(start, end),
                    _ => 0.0,
                };
                Some(days)
            })
            .collect(),
        _ => vec![Some(0.0); n],
    };
    out.insert("author_tenure_days", Column::Float(tenure))?;
    Ok(out)
}

fn merge_repo(features: &Table, repo: &Table) -> Result<Table> {
    let mut repo = repo.clone();
    repo.rename("id", "repo_id");
    for (legacy, canonical) in REPO_ALIASES {
        if repo.has_column(canonical) {
            continue;
        }
        if let Some(col) = repo.column(legacy).cloned() {
            repo.insert(canonical, col)?;
        }
    }

    let mut out = left_join(features, &repo.select(&REPO_COLUMNS), "repo_id", "_repo")?;

    let n = out.n_rows();
    for name in ["forks", "stars"] {
        match out.column_mut(name) {
            Some(col) => col.fill_null_zero(),
            None => out.insert(name, Column::Int(vec![Some(0); n]))?,
        }
    }

    let description_length = match out.column("description") {
        Some(col) => Column::Int(col.char_lengths()),
        None => Column::Int(vec![Some(0); n]),
    };
    out.insert("repo_description_length", description_length)?;
    Ok(out)
}

/// Left join `right` onto `left` by `key`.
///
/// Right-hand columns colliding with a left-hand name are renamed with
/// `suffix`. When either side lacks the key nothing is attached.
pub fn left_join(left: &Table, right: &Table, key: &str, suffix: &str) -> Result<Table> {
    let mut out = left.clone();
    let (Some(left_keys), Some(right_keys)) = (left.column(key), right.column(key)) else {
        tracing::warn!(
            key,
            left = left.has_column(key),
            right = right.has_column(key),
            "join key missing, skipping join"
        );
        return Ok(out);
    };

    let mut first_row: HashMap<i64, usize> = HashMap::new();
    for i in 0..right.n_rows() {
        if let Some(k) = right_keys.get_key(i) {
            first_row.entry(k).or_insert(i);
        }
    }

    let positions: Vec<Option<usize>> = (0..left.n_rows())
        .map(|i| left_keys.get_key(i).and_then(|k| first_row.get(&k).copied()))
        .collect();

    let matched = positions.iter().filter(|p| p.is_some()).count();
    tracing::debug!(key, matched, rows = left.n_rows(), "left join");

    for (name, col) in right.iter() {
        if name == key {
            continue;
        }
        let target = if out.has_column(name) {
            format!("{name}{suffix}")
        } else {
            name.to_string()
        };
        out.insert(target, col.take_opt(&positions))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_datetime;
    use approx::assert_relative_eq;

    fn features() -> Table {
        Table::from_columns(vec![
            ("id", Column::Int(vec![Some(1), Some(2), Some(3)])),
            ("user_id", Column::Int(vec![Some(100), Some(999), Some(100)])),
            ("repo_id", Column::Float(vec![Some(7.0), Some(8.0), None])),
            (
                "created_at",
                Column::DateTime(vec![
                    parse_datetime("2024-01-11T00:00:00Z"),
                    parse_datetime("2024-01-11T00:00:00Z"),
                    None,
                ]),
            ),
        ])
        .unwrap()
    }

    fn users() -> Table {
        Table::from_columns(vec![
            ("id", Column::Int(vec![Some(100), Some(100)])),
            ("created_at", Column::strs([Some("2024-01-01 00:00:00"), Some("2020-01-01")])),
            ("followers", Column::Int(vec![Some(5), Some(50)])),
            ("login", Column::strs([Some("a"), Some("b")])),
        ])
        .unwrap()
    }

    fn repos() -> Table {
        Table::from_columns(vec![
            ("id", Column::Int(vec![Some(7), Some(8)])),
            ("stars", Column::Int(vec![Some(12), None])),
            ("stargazers_count", Column::Int(vec![Some(99), Some(99)])),
            ("forks_count", Column::Int(vec![Some(3), Some(4)])),
            ("description", Column::strs([Some("tool"), None])),
        ])
        .unwrap()
    }

    #[test]
    fn test_row_count_preserved_on_misses() {
        let out = merge_with_user_repo(&features(), &users(), &repos()).unwrap();
        assert_eq!(out.n_rows(), 3);
        assert_eq!(out.column("id"), features().column("id"));
    }

    #[test]
    fn test_first_user_occurrence_wins() {
        let out = merge_with_user_repo(&features(), &users(), &Table::new()).unwrap();
        let followers = out.column("followers").unwrap();
        assert_eq!(followers.get_f64(0), Some(5.0));
        assert_eq!(followers.get_f64(1), None);
        assert!(!out.has_column("login"));
    }

    #[test]
    fn test_author_tenure() {
        let out = merge_with_user_repo(&features(), &users(), &Table::new()).unwrap();
        assert!(out.has_column("created_at_user"));
        let tenure = out.column("author_tenure_days").unwrap();
        assert_relative_eq!(tenure.get_f64(0).unwrap(), 10.0);
        assert_eq!(tenure.get_f64(1), Some(0.0));
        assert_eq!(tenure.get_f64(2), Some(0.0));
    }

    #[test]
    fn test_tenure_zero_without_users() {
        let out = merge_with_user_repo(&features(), &Table::new(), &Table::new()).unwrap();
        assert_eq!(
            out.column("author_tenure_days"),
            Some(&Column::Float(vec![Some(0.0); 3]))
        );
    }

    #[test]
    fn test_canonical_stars_kept_and_forks_aliased() {
        let out = merge_with_user_repo(&features(), &users(), &repos()).unwrap();
        let stars = out.column("stars").unwrap();
        assert_eq!(stars.get_f64(0), Some(12.0));
        assert_eq!(stars.get_f64(1), Some(0.0));
        assert_eq!(stars.get_f64(2), Some(0.0));

        let forks = out.column("forks").unwrap();
        assert_eq!(forks.get_f64(0), Some(3.0));
        assert_eq!(forks.get_f64(1), Some(4.0));
    }

    #[test]
    fn test_missing_popularity_columns_are_zero() {
        let repo = Table::from_columns(vec![("id", Column::Int(vec![Some(7)]))]).unwrap();
        let out = merge_with_user_repo(&features(), &Table::new(), &repo).unwrap();
        assert_eq!(out.column("stars"), Some(&Column::Int(vec![Some(0); 3])));
        assert_eq!(out.column("forks"), Some(&Column::Int(vec![Some(0); 3])));
    }

    #[test]
    fn test_description_length() {
        let out = merge_with_user_repo(&features(), &users(), &repos()).unwrap();
        assert_eq!(
            out.column("repo_description_length"),
            Some(&Column::Int(vec![Some(4), Some(0), Some(0)]))
        );
    }

    #[test]
    fn test_collisions_are_suffixed() {
        let left = Table::from_columns(vec![
            ("k", Column::Int(vec![Some(1)])),
            ("v", Column::Int(vec![Some(0)])),
        ])
        .unwrap();
        let right = Table::from_columns(vec![
            ("k", Column::Int(vec![Some(1)])),
            ("v", Column::Int(vec![Some(9)])),
        ])
        .unwrap();
        let out = left_join(&left, &right, "k", "_repo").unwrap();
        assert_eq!(out.column_names(), &["k", "v", "v_repo"]);
        assert_eq!(out.column("v_repo").unwrap().get_key(0), Some(9));
    }

    #[test]
    fn test_inputs_untouched() {
        let f = features();
        let u = users();
        let _ = merge_with_user_repo(&f, &u, &repos()).unwrap();
        assert_eq!(f, features());
        assert_eq!(u, users());
    }
}

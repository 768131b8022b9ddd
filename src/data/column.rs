//! Typed, nullable columns

use chrono::{DateTime, Utc};

/// A single nullable column of one physical type.
///
/// Missing cells are `None`; floats never carry `NaN` (it is mapped to `None`
/// on construction through [`Column::floats`]).
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// 64-bit signed integers
    Int(Vec<Option<i64>>),
    /// 64-bit floats (may hold ±inf until cleanup)
    Float(Vec<Option<f64>>),
    /// Booleans / indicator values
    Bool(Vec<Option<bool>>),
    /// UTF-8 text
    Str(Vec<Option<String>>),
    /// UTC timestamps
    DateTime(Vec<Option<DateTime<Utc>>>),
}

impl Column {
    /// Build a float column, mapping `NaN` to null.
    pub fn floats(values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self::Float(
            values
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect(),
        )
    }

    /// Build a string column from borrowed values.
    pub fn strs<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        Self::Str(values.into_iter().map(|v| v.map(str::to_string)).collect())
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::Str(v) => v.len(),
            Self::DateTime(v) => v.len(),
        }
    }

    /// Whether the column has no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the physical type, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Str(_) => "str",
            Self::DateTime(_) => "datetime",
        }
    }

    /// Whether the column can be read as a number
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_) | Self::Bool(_))
    }

    /// Whether cell `i` is null
    pub fn is_null(&self, i: usize) -> bool {
        match self {
            Self::Int(v) => v[i].is_none(),
            Self::Float(v) => v[i].is_none(),
            Self::Bool(v) => v[i].is_none(),
            Self::Str(v) => v[i].is_none(),
            Self::DateTime(v) => v[i].is_none(),
        }
    }

    /// Numeric view of cell `i`. Booleans read as 0/1; text and timestamps as null.
    pub fn get_f64(&self, i: usize) -> Option<f64> {
        match self {
            Self::Int(v) => v[i].map(|x| x as f64),
            Self::Float(v) => v[i],
            Self::Bool(v) => v[i].map(|b| if b { 1.0 } else { 0.0 }),
            Self::Str(_) | Self::DateTime(_) => None,
        }
    }

    /// Text view of cell `i`
    pub fn get_str(&self, i: usize) -> Option<&str> {
        match self {
            Self::Str(v) => v[i].as_deref(),
            _ => None,
        }
    }

    /// Timestamp view of cell `i`
    pub fn get_datetime(&self, i: usize) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(v) => v[i],
            _ => None,
        }
    }

    /// Join key of cell `i`.
    ///
    /// Integral floats and numeric strings normalize to the same key as the
    /// equal integer, so `42`, `42.0` and `"42"` all join together.
    pub fn get_key(&self, i: usize) -> Option<i64> {
        match self {
            Self::Int(v) => v[i],
            Self::Float(v) => v[i]
                .filter(|x| x.is_finite() && x.fract() == 0.0)
                .map(|x| x as i64),
            Self::Str(v) => v[i].as_deref().and_then(|s| s.trim().parse().ok()),
            Self::Bool(_) | Self::DateTime(_) => None,
        }
    }

    /// Hashable rendering of cell `i`, used for distinct counts.
    pub fn get_distinct(&self, i: usize) -> Option<String> {
        match self {
            Self::Int(v) => v[i].map(|x| x.to_string()),
            Self::Float(v) => v[i].map(|x| x.to_string()),
            Self::Bool(v) => v[i].map(|x| x.to_string()),
            Self::Str(v) => v[i].clone(),
            Self::DateTime(v) => v[i].map(|x| x.to_rfc3339()),
        }
    }

    /// Select cells by position
    pub fn take(&self, indices: &[usize]) -> Self {
        match self {
            Self::Int(v) => Self::Int(indices.iter().map(|&i| v[i]).collect()),
            Self::Float(v) => Self::Float(indices.iter().map(|&i| v[i]).collect()),
            Self::Bool(v) => Self::Bool(indices.iter().map(|&i| v[i]).collect()),
            Self::Str(v) => Self::Str(indices.iter().map(|&i| v[i].clone()).collect()),
            Self::DateTime(v) => Self::DateTime(indices.iter().map(|&i| v[i]).collect()),
        }
    }

    /// Select cells by optional position; `None` yields a null cell.
    ///
    /// This is the gather step of a left join.
    pub fn take_opt(&self, indices: &[Option<usize>]) -> Self {
        match self {
            Self::Int(v) => Self::Int(indices.iter().map(|i| i.and_then(|i| v[i])).collect()),
            Self::Float(v) => Self::Float(indices.iter().map(|i| i.and_then(|i| v[i])).collect()),
            Self::Bool(v) => Self::Bool(indices.iter().map(|i| i.and_then(|i| v[i])).collect()),
            Self::Str(v) => Self::Str(
                indices
                    .iter()
                    .map(|i| i.and_then(|i| v[i].clone()))
                    .collect(),
            ),
            Self::DateTime(v) => {
                Self::DateTime(indices.iter().map(|i| i.and_then(|i| v[i])).collect())
            }
        }
    }

    /// Replace ±inf with null
    pub fn replace_infinite(&mut self) {
        if let Self::Float(v) = self {
            for cell in v.iter_mut() {
                if cell.is_some_and(|x| x.is_infinite()) {
                    *cell = None;
                }
            }
        }
    }

    /// Fill null numeric cells with 0 and null booleans with `false`.
    ///
    /// Text and timestamp columns have no zero and are left untouched.
    pub fn fill_null_zero(&mut self) {
        match self {
            Self::Int(v) => v.iter_mut().for_each(|c| *c = Some(c.unwrap_or(0))),
            Self::Float(v) => v.iter_mut().for_each(|c| *c = Some(c.unwrap_or(0.0))),
            Self::Bool(v) => v.iter_mut().for_each(|c| *c = Some(c.unwrap_or(false))),
            Self::Str(_) | Self::DateTime(_) => {}
        }
    }

    /// Character length of every cell; null text counts as the empty string.
    pub fn char_lengths(&self) -> Vec<Option<i64>> {
        (0..self.len())
            .map(|i| Some(self.get_str(i).map_or(0, |s| s.chars().count() as i64)))
            .collect()
    }
}

//! Categorical label handling
//!
//! The label column is read as text and mapped onto a bounded domain made of
//! exactly the distinct values observed at load time.

use std::collections::BTreeSet;

use polars::prelude::*;
use serde::Serialize;

use super::error::{LoadError, PipelineResult};

/// Sorted set of class names; a class code is its index in this list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelDomain {
    classes: Vec<String>,
}

impl LabelDomain {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn code_of(&self, value: &str) -> Option<u32> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
            .map(|i| i as u32)
    }

    pub fn name_of(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }
}

/// Read a label column into its domain and one code per row.
///
/// Fails if the column is absent or any row has no label.
pub fn encode_labels(df: &DataFrame, label: &str) -> PipelineResult<(LabelDomain, Vec<u32>)> {
    let column = df.column(label).map_err(|_| LoadError::MissingLabel {
        label: label.to_string(),
        available: df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect(),
    })?;

    let null_count = column.null_count();
    if null_count > 0 {
        return Err(LoadError::MissingLabelValues {
            label: label.to_string(),
            count: null_count,
        }
        .into());
    }

    let as_text = column.cast(&DataType::String)?;
    let values: Vec<&str> = as_text.str()?.into_no_null_iter().collect();

    let domain = LabelDomain::new(values.iter().copied());
    // Every value came from the domain just built, so lookups always succeed.
    let codes = values
        .iter()
        .map(|v| domain.code_of(v).unwrap_or_default())
        .collect();

    Ok((domain, codes))
}

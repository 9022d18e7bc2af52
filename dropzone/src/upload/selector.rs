use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which multipart fields may carry files, and how many.
///
/// Text fields are never affected by the selector; it only decides whether a file part is
/// accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FileSelector {
    /// Exactly one file, from the named field
    Single { field: String },
    /// Any number of files (optionally capped) from the named field
    Array {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_count: Option<usize>,
    },
    /// Several named fields, each with its own optional cap
    Fields { fields: Vec<FieldLimit> },
    /// Text fields only; every file is rejected
    None,
    /// Files from any field
    #[default]
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FieldLimit {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<usize>,
}

impl FileSelector {
    pub fn single(field: impl Into<String>) -> Self {
        Self::Single { field: field.into() }
    }

    pub fn array(field: impl Into<String>, max_count: Option<usize>) -> Self {
        Self::Array {
            field: field.into(),
            max_count,
        }
    }

    /// Per-request admission tracker
    pub fn admission(&self) -> Admission<'_> {
        Admission {
            selector: self,
            seen: HashMap::new(),
        }
    }

    /// `None` if files from `field` are not accepted at all, otherwise the optional cap
    fn limit_for(&self, field: &str) -> Option<Option<usize>> {
        match self {
            FileSelector::Any => Some(None),
            FileSelector::None => None,
            FileSelector::Single { field: name } => (name == field).then_some(Some(1)),
            FileSelector::Array { field: name, max_count } => (name == field).then_some(*max_count),
            FileSelector::Fields { fields } => fields.iter().find(|limit| limit.name == field).map(|limit| limit.max_count),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        let check = |name: &str, max_count: Option<usize>| {
            if name.is_empty() {
                return Err("field name cannot be empty".to_string());
            }
            if max_count == Some(0) {
                return Err(format!("max_count for field '{name}' must be at least 1"));
            }
            Ok(())
        };

        match self {
            FileSelector::Single { field } => check(field, Some(1)),
            FileSelector::Array { field, max_count } => check(field, *max_count),
            FileSelector::Fields { fields } => {
                if fields.is_empty() {
                    return Err("fields selector needs at least one field".to_string());
                }
                fields.iter().try_for_each(|limit| check(&limit.name, limit.max_count))
            }
            FileSelector::None | FileSelector::Any => Ok(()),
        }
    }
}

/// Counts files per field over the course of one request.
#[derive(Debug)]
pub struct Admission<'a> {
    selector: &'a FileSelector,
    seen: HashMap<String, usize>,
}

impl Admission<'_> {
    /// Accept or reject the next file arriving in `field`
    pub fn admit(&mut self, field: &str) -> Result<()> {
        let unexpected = || Error::UnexpectedField { field: field.to_string() };

        let max_count = self.selector.limit_for(field).ok_or_else(unexpected)?;

        let count = self.seen.entry(field.to_string()).or_default();
        *count += 1;

        match max_count {
            Some(max) if *count > max => Err(unexpected()),
            _ => Ok(()),
        }
    }
}

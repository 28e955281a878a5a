//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (parents declared before children)
//! - Reject duplicate route names and empty names
//! - Check the fallback path is a path
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Template syntax is left to registration, which reports it precisely

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{0} has an empty name")]
    EmptyName(usize),

    #[error("route '{0}' is declared more than once")]
    DuplicateName(String),

    #[error("route '{route}' refers to parent '{parent}' which is not declared before it")]
    MissingParent { route: String, parent: String },

    #[error("otherwise path '{0}' must start with '/'")]
    OtherwiseNotAPath(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut declared: HashSet<&str> = HashSet::new();

    for (index, route) in config.routes.iter().enumerate() {
        if route.name.is_empty() {
            errors.push(ValidationError::EmptyName(index));
            continue;
        }

        let parent = route
            .parent
            .as_deref()
            .or_else(|| route.name.rsplit_once('.').map(|(parent, _)| parent));
        if let Some(parent) = parent {
            if !declared.contains(parent) {
                errors.push(ValidationError::MissingParent {
                    route: route.name.clone(),
                    parent: parent.to_string(),
                });
            }
        }

        if !declared.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateName(route.name.clone()));
        }
    }

    if let Some(otherwise) = &config.router.otherwise {
        if !otherwise.starts_with('/') {
            errors.push(ValidationError::OtherwiseNotAPath(otherwise.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

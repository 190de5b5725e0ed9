// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque record identifier. Backends send either strings or integers, so
/// both decode into the same string form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawApplicationId", into = "String")]
pub struct ApplicationId(String);

impl ApplicationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApplicationId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ApplicationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for ApplicationId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<ApplicationId> for String {
    fn from(value: ApplicationId) -> Self {
        value.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawApplicationId {
    Text(String),
    Integer(i64),
}

impl From<RawApplicationId> for ApplicationId {
    fn from(value: RawApplicationId) -> Self {
        match value {
            RawApplicationId::Text(text) => Self(text),
            RawApplicationId::Integer(number) => Self(number.to_string()),
        }
    }
}

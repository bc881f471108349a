//! Environment data models.
//!
//! An environment is a named base URL (local, staging, production, ...). At
//! most one environment is active at a time; relative request URLs are
//! resolved against it.

use serde::{Deserialize, Serialize};

/// A named base-URL configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    /// Stable identifier (e.g., "local", "staging")
    pub id: String,

    /// Display name
    pub name: String,

    /// Base URL that relative request URLs are joined onto
    pub base_url: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Whether this is the active environment
    #[serde(default)]
    pub is_active: bool,
}

impl Environment {
    /// Creates an inactive environment.
    pub fn new(id: impl Into<String>, name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_url: base_url.into(),
            description: String::new(),
            is_active: false,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Ordered collection of environments, serialized as a plain JSON array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Environments {
    entries: Vec<Environment>,
}

impl Environments {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The stock environments a fresh installation starts with.
    ///
    /// `local` is active.
    pub fn defaults() -> Self {
        let mut local = Environment::new("local", "Local Development", "http://localhost:3000")
            .with_description("Local development server");
        local.is_active = true;

        Self {
            entries: vec![
                local,
                Environment::new("staging", "Staging", "https://api-staging.example.com")
                    .with_description("Staging environment for testing"),
                Environment::new("production", "Production", "https://api.example.com")
                    .with_description("Production environment"),
            ],
        }
    }

    /// Adds an environment to the end of the collection.
    ///
    /// The first environment added to an empty collection becomes active.
    pub fn add_environment(&mut self, mut env: Environment) {
        if self.entries.is_empty() {
            env.is_active = true;
        }
        self.entries.push(env);
    }

    /// Gets an environment by id.
    pub fn get(&self, id: &str) -> Option<&Environment> {
        self.entries.iter().find(|env| env.id == id)
    }

    /// Gets the active environment, if any.
    pub fn get_active(&self) -> Option<&Environment> {
        self.entries.iter().find(|env| env.is_active)
    }

    /// Marks `id` active and every other environment inactive.
    ///
    /// Returns `false`, leaving flags untouched, when `id` is unknown.
    pub fn set_active(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        for env in &mut self.entries {
            env.is_active = env.id == id;
        }
        true
    }

    /// Makes the first environment active when none is.
    ///
    /// Returns `true` if a flag was changed.
    pub fn ensure_active(&mut self) -> bool {
        if self.get_active().is_some() {
            return false;
        }
        match self.entries.first_mut() {
            Some(first) => {
                first.is_active = true;
                true
            }
            None => false,
        }
    }

    /// Iterates environments in order.
    pub fn iter(&self) -> impl Iterator<Item = &Environment> {
        self.entries.iter()
    }

    /// Returns the number of environments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if there are no environments.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

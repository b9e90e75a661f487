/*
 * loader.rs
 * Copyright (c) 2026 The brine developers
 */

//! Partial template loading.
//!
//! `{% include %}` asks the environment's [`Loader`] for template source by
//! name. The trait is async so loaders backed by slow storage can suspend;
//! blocking renders drive the same future on the current thread.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{TemplateError, TemplateResult};

/// Resolves partial names to template source.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Load the source for `name`, or fail with
    /// [`TemplateError::TemplateNotFound`].
    async fn load(&self, name: &str) -> TemplateResult<String>;

    /// Blocking convenience: drives [`Loader::load`] on the current thread.
    fn load_sync(&self, name: &str) -> TemplateResult<String> {
        pollster::block_on(self.load(name))
    }
}

/// The default loader: every lookup fails. Environments that never use
/// `{% include %}` need nothing more.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLoader;

#[async_trait]
impl Loader for NullLoader {
    async fn load(&self, name: &str) -> TemplateResult<String> {
        Err(TemplateError::TemplateNotFound {
            name: name.to_string(),
        })
    }
}

/// An in-memory name → source map.
#[derive(Debug, Clone, Default)]
pub struct DictLoader {
    templates: HashMap<String, String>,
}

impl DictLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a template under `name`.
    pub fn add(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }
}

#[async_trait]
impl Loader for DictLoader {
    async fn load(&self, name: &str) -> TemplateResult<String> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::TemplateNotFound {
                name: name.to_string(),
            })
    }
}

//! Prompt Loader
//!
//! Loads prompt templates from the override directory or falls back to the
//! embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;

/// Loads and renders prompt templates
pub struct PromptLoader {
    hbs: Handlebars<'static>,
    /// Override directory (e.g. `~/.config/tripgenie/prompts/`)
    user_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that checks `user_dir` before the embedded prompts
    pub fn new(user_dir: impl AsRef<Path>) -> Self {
        let user_dir = user_dir.as_ref();
        let exists = user_dir.is_dir();
        debug!(?user_dir, %exists, "PromptLoader::new: called");
        Self {
            hbs: Self::engine(),
            user_dir: exists.then(|| user_dir.to_path_buf()),
        }
    }

    /// Loader over the platform config directory
    pub fn from_default_dir() -> Self {
        match dirs::config_dir() {
            Some(dir) => Self::new(dir.join("tripgenie").join("prompts")),
            None => Self::embedded_only(),
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text for the model, not HTML
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                info!(?path, "Using prompt override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
        }

        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// The planner persona
    pub fn system_prompt(&self) -> Result<String> {
        debug!("PromptLoader::system_prompt: called");
        self.load_template("system")
    }
}

pub mod assets;
pub mod compile;
pub mod generate;
pub mod info;
pub mod init;
pub mod list;
pub mod wizard;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use texforge_compile::EngineKind;
use texforge_core::config::{self, Settings, TEMPLATE_DIR_ENV};
use texforge_renderer::TemplateEngine;

/// Settings from `~/.texforge/config.yaml`, or defaults when absent.
pub fn load_settings() -> Result<Settings> {
    config::load().context("failed to load texforge settings")
}

/// Template engine over the directory picked from `--template-dir`,
/// `TEXFORGE_TEMPLATE_DIR`, the settings file, or `./templates`.
pub fn template_engine(settings: &Settings, flag: Option<&Path>) -> TemplateEngine {
    let env = std::env::var(TEMPLATE_DIR_ENV).ok();
    TemplateEngine::new(settings.template_dir(flag, env.as_deref()))
}

/// Engines to try: the explicit list, with the configured fallback order
/// appended when `fallback` is set or nothing was named.
pub fn engine_order(settings: &Settings, explicit: &[EngineKind], fallback: bool) -> Result<Vec<EngineKind>> {
    let mut engines = explicit.to_vec();
    if explicit.is_empty() || fallback {
        for name in &settings.engines {
            let engine: EngineKind = name
                .parse()
                .with_context(|| format!("invalid engine '{name}' in settings"))?;
            if !engines.contains(&engine) {
                engines.push(engine);
            }
        }
    }
    Ok(engines)
}

pub fn compile_timeout(settings: &Settings, flag: Option<u64>) -> Duration {
    Duration::from_secs(flag.unwrap_or(settings.compile_timeout_secs))
}

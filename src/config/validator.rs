//! Configuration validation.

use crate::config::schema::{PackageKind, PipelineConfig};
use crate::error::{RelayError, Result};
use std::collections::HashSet;

/// Collect every problem in a configuration.
pub fn validate_config(config: &PipelineConfig) -> Vec<String> {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();
    let mut prefixes = HashSet::new();

    let all_packages = config.packages.iter().chain(config.main_package.iter());
    for spec in all_packages {
        if spec.id.trim().is_empty() {
            errors.push("package id must not be empty".to_string());
            continue;
        }
        if !ids.insert(spec.id.as_str()) {
            errors.push(format!("duplicate package id '{}'", spec.id));
        }
        if spec.prefix().contains('@') {
            errors.push(format!("tag prefix '{}' must not contain '@'", spec.prefix()));
        }
        if !prefixes.insert(spec.prefix()) {
            errors.push(format!("duplicate tag prefix '{}'", spec.prefix()));
        }
        if let PackageKind::WebBundle {
            install_command,
            build_command,
            ..
        } = &spec.kind
        {
            if install_command.is_empty() || build_command.is_empty() {
                errors.push(format!("web bundle '{}' needs install and build commands", spec.id));
            }
        }
    }

    if let Some(main) = &config.main_package {
        if !matches!(main.kind, PackageKind::NativeBinary { .. }) {
            errors.push(format!("main package '{}' must be a native-binary", main.id));
        }
    }

    let mut plugin_ids = HashSet::new();
    for plugin in &config.plugins {
        if !plugin_ids.insert(plugin.id.as_str()) {
            errors.push(format!("duplicate plugin id '{}'", plugin.id));
        }
    }

    errors
}

/// Validate a configuration, failing on the first report.
pub fn validate(config: &PipelineConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RelayError::ConfigValidationError {
            message: errors.join("; "),
        })
    }
}

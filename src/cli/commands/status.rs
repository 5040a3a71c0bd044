//! Status command implementation.
//!
//! The `release-relay status` command shows, for every configured package,
//! the local and released versions and whether `prepare` would release it.
//! Nothing is tagged, created or written.

use crate::catalog::{GitHubClient, ReleaseHost};
use crate::error::Result;
use crate::pipeline::{plan_releases, PackagePlan};

use super::dispatcher::{Command, CommandResult, RelayContext};

/// The status command implementation.
pub struct StatusCommand {
    context: RelayContext,
}

impl StatusCommand {
    pub fn new(context: RelayContext) -> Self {
        Self { context }
    }
}

impl Command for StatusCommand {
    fn execute(&self) -> Result<CommandResult> {
        let RelayContext { env, config } = &self.context;
        let host = GitHubClient::new(&config.api_base, env)?;
        let releases = host.list_releases()?;

        let plans = plan_releases(config, &env.workspace, &releases);
        for plan in &plans {
            println!("{}", format_plan(plan));
        }

        let pending = plans.iter().filter(|p| p.should_release()).count();
        tracing::info!("{} of {} packages would be released", pending, plans.len());
        Ok(CommandResult::success())
    }
}

/// One status line: `id  local -> remote  action`.
pub fn format_plan(plan: &PackagePlan) -> String {
    let action = match plan.usable_local() {
        Err(reason) => format!("skip ({reason})"),
        Ok(_) if plan.should_release() => "release".to_string(),
        Ok(_) => "up to date".to_string(),
    };

    format!(
        "{:<24} {:>10} -> {:<10} {}",
        plan.id,
        plan.local.as_deref().unwrap_or("-"),
        plan.remote.as_deref().unwrap_or("-"),
        action
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(local: Option<&str>, remote: Option<&str>) -> PackagePlan {
        PackagePlan {
            id: "manga_dex".to_string(),
            tag_prefix: "manga_dex".to_string(),
            local: local.map(str::to_string),
            remote: remote.map(str::to_string),
        }
    }

    #[test]
    fn new_package_is_released() {
        let line = format_plan(&plan(Some("0.1.0"), None));
        assert!(line.starts_with("manga_dex"));
        assert!(line.contains("0.1.0 -> -"));
        assert!(line.ends_with("release"));
    }

    #[test]
    fn same_version_is_up_to_date() {
        assert!(format_plan(&plan(Some("1.0.0"), Some("1.0.0"))).ends_with("up to date"));
    }

    #[test]
    fn missing_local_version_is_skipped() {
        assert!(format_plan(&plan(None, Some("1.0.0"))).ends_with("skip (no local version)"));
    }

    #[test]
    fn non_numeric_local_version_is_skipped() {
        let line = format_plan(&plan(Some("banana"), None));
        assert!(line.ends_with("skip (unparseable local version \"banana\")"));
    }
}

//! [`Prompter`] implementations used by the commands.
//!
//! - [`ScriptedPrompter`] answers from `--access` flags, and answers
//!   "nothing" when none were given.
//! - [`DialoguerPrompter`] asks on the terminal (feature `interactive`).

use std::io::IsTerminal;

use tracing::debug;

use terraplate_core::{
    application::{ApplicationError, Prompter, SelectionRole},
    domain::{DomainError, InstanceRef, ServiceType},
    error::{TerraplateError, TerraplateResult},
};

use crate::cli::AccessSpec;

/// `true` when both stdin and stderr are terminals and prompting is built in.
pub fn can_prompt() -> bool {
    cfg!(feature = "interactive") && std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Pick the prompter for a connect step.
///
/// Scripted answers win; otherwise prompt when possible, else connect
/// nothing.
pub fn connect_prompter(access: Vec<AccessSpec>, interactive: bool) -> Box<dyn Prompter> {
    #[cfg(feature = "interactive")]
    {
        if access.is_empty() && interactive {
            return Box::new(DialoguerPrompter::new());
        }
    }
    #[cfg(not(feature = "interactive"))]
    let _ = interactive;

    Box::new(ScriptedPrompter::new(access))
}

// ── scripted ──────────────────────────────────────────────────────────────────

/// Answers selections from a fixed list of grants.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    specs: Vec<AccessSpec>,
}

impl ScriptedPrompter {
    pub fn new(specs: Vec<AccessSpec>) -> Self {
        Self { specs }
    }

    /// The scripted grant naming either side of `holder -> target`.
    fn spec_for(&self, holder: &InstanceRef, target: &InstanceRef) -> Option<&AccessSpec> {
        self.specs.iter().find(|spec| {
            [target, holder]
                .iter()
                .any(|r| r.service == spec.service && r.instance == spec.instance)
        })
    }
}

impl Prompter for ScriptedPrompter {
    fn select_relations(
        &self,
        current: &InstanceRef,
        candidates: &[ServiceType],
    ) -> TerraplateResult<Vec<ServiceType>> {
        // Types outside the candidates are passed through so the resolver
        // reports why they cannot be connected.
        let mut selected: Vec<ServiceType> = candidates
            .iter()
            .copied()
            .filter(|service| self.specs.iter().any(|spec| spec.service == *service))
            .collect();
        for spec in &self.specs {
            if !selected.contains(&spec.service) {
                selected.push(spec.service);
            }
        }
        debug!(%current, ?selected, "Scripted relation selection");
        Ok(selected)
    }

    fn select_instances(
        &self,
        _current: &InstanceRef,
        service: ServiceType,
        _role: SelectionRole,
        _candidates: &[String],
    ) -> TerraplateResult<Vec<String>> {
        // Names absent from the candidates are passed through so the
        // resolver reports them as unknown instances.
        let mut selected: Vec<String> = Vec::new();
        for spec in self.specs.iter().filter(|spec| spec.service == service) {
            if !selected.contains(&spec.instance) {
                selected.push(spec.instance.clone());
            }
        }
        Ok(selected)
    }

    fn select_access_levels(
        &self,
        holder: &InstanceRef,
        target: &InstanceRef,
        levels: &[&'static str],
    ) -> TerraplateResult<Vec<String>> {
        let Some(spec) = self.spec_for(holder, target) else {
            return Ok(Vec::new());
        };

        spec.levels
            .iter()
            .map(|wanted| {
                levels
                    .iter()
                    .find(|level| level.eq_ignore_ascii_case(wanted))
                    .map(|level| (*level).to_string())
                    .ok_or_else(|| {
                        TerraplateError::from(DomainError::InvalidConfig {
                            field: "access",
                            reason: format!(
                                "unknown access level '{wanted}' for {holder} -> {target} (expected one of: {})",
                                levels.join(", ")
                            ),
                        })
                    })
            })
            .collect()
    }
}

// ── interactive ───────────────────────────────────────────────────────────────

/// Terminal multi-select prompts.
#[cfg(feature = "interactive")]
pub struct DialoguerPrompter {
    theme: dialoguer::theme::ColorfulTheme,
}

#[cfg(feature = "interactive")]
impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: dialoguer::theme::ColorfulTheme::default(),
        }
    }

    fn multi_select<T: ToString>(&self, prompt: &str, items: &[T]) -> TerraplateResult<Vec<usize>> {
        let labels: Vec<String> = items.iter().map(ToString::to_string).collect();
        dialoguer::MultiSelect::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(&labels)
            .interact_opt()
            .map_err(prompt_failed)?
            .ok_or_else(|| ApplicationError::Cancelled.into())
    }
}

#[cfg(feature = "interactive")]
impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "interactive")]
impl Prompter for DialoguerPrompter {
    fn select_relations(
        &self,
        current: &InstanceRef,
        candidates: &[ServiceType],
    ) -> TerraplateResult<Vec<ServiceType>> {
        let labels: Vec<&str> = candidates
            .iter()
            .map(|s| terraplate_core::domain::service_def(*s).label)
            .collect();
        let picked = self.multi_select(
            &format!("Connect {current} to which services? (space to select)"),
            &labels,
        )?;
        Ok(picked.into_iter().map(|i| candidates[i]).collect())
    }

    fn select_instances(
        &self,
        current: &InstanceRef,
        service: ServiceType,
        role: SelectionRole,
        candidates: &[String],
    ) -> TerraplateResult<Vec<String>> {
        let prompt = match role {
            SelectionRole::Targets => format!("Which {service} instances should {current} access?"),
            SelectionRole::Holders => format!("Which {service} instances should access {current}?"),
        };
        let picked = self.multi_select(&prompt, candidates)?;
        Ok(picked.into_iter().map(|i| candidates[i].clone()).collect())
    }

    fn select_access_levels(
        &self,
        holder: &InstanceRef,
        target: &InstanceRef,
        levels: &[&'static str],
    ) -> TerraplateResult<Vec<String>> {
        let picked = self.multi_select(
            &format!("Access levels for {holder} on {target}"),
            levels,
        )?;
        Ok(picked.into_iter().map(|i| levels[i].to_string()).collect())
    }
}

#[cfg(feature = "interactive")]
fn prompt_failed(err: dialoguer::Error) -> TerraplateError {
    ApplicationError::PromptFailed {
        reason: err.to_string(),
    }
    .into()
}

/// Free-text answer with a default, or the default when not prompting.
pub fn text(prompt: &str, default: Option<&str>, interactive: bool) -> TerraplateResult<Option<String>> {
    #[cfg(feature = "interactive")]
    {
        if interactive {
            let theme = dialoguer::theme::ColorfulTheme::default();
            let mut input = dialoguer::Input::<String>::with_theme(&theme).with_prompt(prompt);
            if let Some(default) = default {
                input = input.default(default.to_string());
            }
            let answer = input.interact_text().map_err(prompt_failed)?;
            return Ok(Some(answer.trim().to_string()));
        }
    }
    #[cfg(not(feature = "interactive"))]
    let _ = (prompt, interactive);

    Ok(default.map(str::to_string))
}

/// Yes/no question; `default` when not prompting.
pub fn confirm(prompt: &str, default: bool, interactive: bool) -> TerraplateResult<bool> {
    #[cfg(feature = "interactive")]
    {
        if interactive {
            let theme = dialoguer::theme::ColorfulTheme::default();
            return dialoguer::Confirm::with_theme(&theme)
                .with_prompt(prompt)
                .default(default)
                .interact()
                .map_err(prompt_failed);
        }
    }
    #[cfg(not(feature = "interactive"))]
    let _ = (prompt, interactive);

    Ok(default)
}

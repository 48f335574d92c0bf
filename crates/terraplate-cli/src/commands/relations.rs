//! `terraplate relations`: what the permission registry allows.

use serde::Serialize;

use terraplate_core::domain::{PermissionRegistry, PermissionTemplate, ServiceType};

use crate::{
    cli::RelationsArgs,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: RelationsArgs, output: OutputManager) -> CliResult<()> {
    let registry = PermissionRegistry::builtin();
    let filter = args.service.map(ServiceType::from);
    let views = relation_views(registry, filter);

    if output.is_json() {
        output.json(&views)?;
        return Ok(());
    }

    match filter {
        Some(service) => output.header(&format!("Relations for {service}:"))?,
        None => output.header("Supported relations:")?,
    }
    for view in &views {
        output.print("")?;
        output.print(&format!("  {}  (grant stored on {})", view.relation, view.holder))?;
        for level in &view.levels {
            output.print(&format!("    {:<7} {}", level.level, level.actions.join(", ")))?;
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct RelationView {
    relation: String,
    holder: String,
    target: String,
    levels: Vec<LevelView>,
}

#[derive(Debug, Serialize)]
struct LevelView {
    level: &'static str,
    actions: Vec<&'static str>,
}

fn relation_views(registry: PermissionRegistry, filter: Option<ServiceType>) -> Vec<RelationView> {
    registry
        .templates()
        .iter()
        .filter(|t| filter.is_none_or(|s| t.key().contains(s)))
        .map(relation_view)
        .collect()
}

fn relation_view(template: &PermissionTemplate) -> RelationView {
    RelationView {
        relation: template.name(),
        holder: template.updated_service().to_string(),
        target: template.referenced_service().to_string(),
        levels: template
            .supported_access_levels
            .iter()
            .map(|&level| LevelView {
                level,
                actions: template.actions_for(level).to_vec(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_relations_without_filter() {
        let registry = PermissionRegistry::builtin();
        assert_eq!(relation_views(registry, None).len(), registry.templates().len());
    }

    #[test]
    fn filter_keeps_relations_involving_service() {
        let views = relation_views(PermissionRegistry::builtin(), Some(ServiceType::S3));
        assert!(!views.is_empty());
        assert!(views.iter().all(|v| v.relation.contains("s3")));
    }

    #[test]
    fn s3_to_lambda_is_held_by_lambda() {
        let views = relation_views(PermissionRegistry::builtin(), Some(ServiceType::S3));
        let view = views.iter().find(|v| v.relation == "s3-to-lambda").unwrap();
        assert_eq!(view.holder, "lambda");
        assert_eq!(view.target, "s3");
        assert_eq!(view.levels[0].level, "Read");
    }
}

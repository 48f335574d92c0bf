//! `terraplate list`: services, instances and grants of the project.

use serde::Serialize;

use terraplate_adapters::JsonManifestStore;
use terraplate_core::{application::ManifestStore, domain::ProjectManifest};

use crate::{
    cli::{GlobalArgs, ListArgs, ListFormat},
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, global: GlobalArgs, output: OutputManager) -> CliResult<()> {
    let manifest = JsonManifestStore::new(global.project_root()).load()?;
    let view = ProjectView::from(&manifest);

    let format = if output.is_json() { ListFormat::Json } else { args.format };
    match format {
        ListFormat::Json => output.json(&view)?,

        ListFormat::List => {
            for service in &view.services {
                for instance in &service.instances {
                    output.print(&format!("{}/{}", service.service, instance.name))?;
                }
            }
        }

        ListFormat::Table => {
            output.header(&format!("Project '{}' ({})", view.project, view.region))?;
            output.print(&format!("  Environments: {}", view.environments.join(", ")))?;
            if view.services.is_empty() {
                output.print("  No services yet. Try: terraplate add lambda")?;
            }
            for service in &view.services {
                output.print("")?;
                output.header(&service.service)?;
                if service.instances.is_empty() {
                    output.print("  (no instances)")?;
                }
                for instance in &service.instances {
                    output.print(&format!("  {}", instance.name))?;
                    for grant in &instance.grants {
                        output.print(&format!(
                            "    -> {}/{}: {}",
                            grant.service,
                            grant.instance,
                            grant.actions.join(", ")
                        ))?;
                    }
                }
            }
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct ProjectView {
    project: String,
    region: String,
    environments: Vec<String>,
    services: Vec<ServiceView>,
}

#[derive(Debug, Serialize)]
struct ServiceView {
    service: String,
    instances: Vec<InstanceView>,
}

#[derive(Debug, Serialize)]
struct InstanceView {
    name: String,
    grants: Vec<AccessView>,
}

#[derive(Debug, Serialize)]
struct AccessView {
    service: String,
    instance: String,
    actions: Vec<String>,
}

impl From<&ProjectManifest> for ProjectView {
    fn from(manifest: &ProjectManifest) -> Self {
        let services = manifest
            .services
            .iter()
            .map(|(service, record)| ServiceView {
                service: service.clone(),
                instances: record
                    .instances
                    .iter()
                    .map(|(name, instance)| InstanceView {
                        name: name.clone(),
                        grants: instance
                            .access
                            .iter()
                            .flat_map(|(target_service, targets)| {
                                targets.iter().map(move |(target, actions)| AccessView {
                                    service: target_service.clone(),
                                    instance: target.clone(),
                                    actions: actions.clone(),
                                })
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            project: manifest.project_name.clone(),
            region: manifest.region.clone(),
            environments: manifest.environments.clone(),
            services,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terraplate_core::domain::ServiceType;

    #[test]
    fn view_flattens_grants() {
        let mut m = ProjectManifest::new("shop", vec!["dev".into()], "us-east-1");
        m.register_instance(ServiceType::DynamoDb, "orders").unwrap();
        m.register_instance(ServiceType::Lambda, "checkout").unwrap();
        m.grant_access(
            ServiceType::Lambda,
            "checkout",
            ServiceType::DynamoDb,
            "orders",
            vec!["dynamodb:GetItem".into()],
        )
        .unwrap();

        let json = serde_json::to_value(ProjectView::from(&m)).unwrap();
        assert_eq!(json["project"], "shop");
        assert_eq!(json["services"][0]["service"], "dynamodb");
        let lambda = &json["services"][1];
        assert_eq!(lambda["instances"][0]["name"], "checkout");
        assert_eq!(lambda["instances"][0]["grants"][0]["instance"], "orders");
        assert_eq!(
            lambda["instances"][0]["grants"][0]["actions"][0],
            "dynamodb:GetItem"
        );
    }
}

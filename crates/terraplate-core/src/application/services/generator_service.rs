//! Instance Generator - materializes one instance on disk.
//!
//! For every environment of the project, in order:
//! 1. `environments/{env}/{service}/backend.tf` - written once, never touched again
//! 2. `environments/{env}/{service}/main.tf` - provider header, then one module block per instance
//! 3. `environments/{env}/{service}/{instance}/` - the service's templates, rendered
//!
//! Re-running generation for the same instance leaves `backend.tf` and
//! `main.tf` byte-identical and rewrites the instance files from the current
//! manifest.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::{
    application::{
        ports::{Filesystem, TemplateRenderer},
        services::access_policy::AccessPolicy,
    },
    domain::{
        InstanceRef, ModuleName, PermissionRegistry, ProjectManifest, RenderContext,
        ServiceConfig, ServiceType, service_def,
    },
    error::TerraplateResult,
};

/// Directory under the project root holding one directory per environment.
pub const ENVIRONMENTS_DIR: &str = "environments";
pub const BACKEND_FILE: &str = "backend.tf";
pub const MAIN_FILE: &str = "main.tf";

/// What happened to one aggregated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Created,
    Appended,
    Unchanged,
}

impl std::fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Appended => "appended",
            Self::Unchanged => "unchanged",
        })
    }
}

/// Generation results for one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentReport {
    pub environment: String,
    pub service_dir: PathBuf,
    pub backend: FileOutcome,
    pub main: FileOutcome,
    pub instance_files: Vec<PathBuf>,
    pub skipped_templates: Vec<String>,
}

/// Generation results for one instance across all environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub instance: InstanceRef,
    pub environments: Vec<EnvironmentReport>,
}

impl GenerationReport {
    /// Instance files written, over all environments.
    pub fn files_written(&self) -> usize {
        self.environments
            .iter()
            .map(|env| env.instance_files.len())
            .sum()
    }
}

/// Creates and merges Terraform files for service instances.
pub struct InstanceGenerator {
    filesystem: Box<dyn Filesystem>,
    renderer: Box<dyn TemplateRenderer>,
    registry: PermissionRegistry,
    root: PathBuf,
}

impl InstanceGenerator {
    pub fn new(
        filesystem: Box<dyn Filesystem>,
        renderer: Box<dyn TemplateRenderer>,
        registry: PermissionRegistry,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            filesystem,
            renderer,
            registry,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `environments/{env}/{service}` under the project root.
    pub fn service_dir(&self, environment: &str, service: ServiceType) -> PathBuf {
        self.root
            .join(ENVIRONMENTS_DIR)
            .join(environment)
            .join(service.as_str())
    }

    /// Create the empty per-environment directories of a new project.
    #[instrument(skip_all, fields(root = %self.root.display()))]
    pub fn prepare_environments(&self, environments: &[String]) -> TerraplateResult<Vec<PathBuf>> {
        let mut created = Vec::with_capacity(environments.len());
        for env in environments {
            let dir = self.root.join(ENVIRONMENTS_DIR).join(env);
            self.filesystem.create_dir_all(&dir)?;
            debug!(path = %dir.display(), "Environment directory ready");
            created.push(dir);
        }
        Ok(created)
    }

    /// Generate `config`'s instance in every environment of the manifest.
    ///
    /// The instance's grants are read from `manifest`; the first failing
    /// step aborts the run, leaving earlier environments in place.
    #[instrument(
        skip_all,
        fields(
            service = %config.service_type(),
            instance = %config.instance_name(),
        )
    )]
    pub fn generate(
        &self,
        manifest: &ProjectManifest,
        config: &ServiceConfig,
    ) -> TerraplateResult<GenerationReport> {
        let service = config.service_type();
        let instance = config.instance_name();
        let def = service_def(service);
        let module = ModuleName::from_instance(instance);

        let mut environments = Vec::with_capacity(manifest.environments.len());
        for env in &manifest.environments {
            let service_dir = self.service_dir(env, service);
            self.filesystem.create_dir_all(&service_dir)?;

            let backend = self.ensure_backend(&service_dir, manifest, env, service)?;
            let main = self.ensure_module(&service_dir, &manifest.region, &module, instance)?;

            let instance_dir = service_dir.join(instance);
            self.filesystem.create_dir_all(&instance_dir)?;

            let context = self.context(manifest, config, env);
            let mut instance_files = Vec::with_capacity(def.template_files.len());
            let mut skipped_templates = Vec::new();
            for (template, output) in def.template_files {
                match self.renderer.render(service, template, &context)? {
                    Some(content) => {
                        let path = instance_dir.join(output);
                        self.filesystem.write_file(&path, &content)?;
                        instance_files.push(path);
                    }
                    None => {
                        debug!(template, "Renderer has no such template, skipping");
                        skipped_templates.push((*template).to_string());
                    }
                }
            }

            info!(
                environment = %env,
                %backend,
                %main,
                files = instance_files.len(),
                "Environment generated"
            );
            environments.push(EnvironmentReport {
                environment: env.clone(),
                service_dir,
                backend,
                main,
                instance_files,
                skipped_templates,
            });
        }

        Ok(GenerationReport {
            instance: InstanceRef::new(service, instance),
            environments,
        })
    }

    /// Variables available to every template of the instance.
    pub fn context(
        &self,
        manifest: &ProjectManifest,
        config: &ServiceConfig,
        environment: &str,
    ) -> RenderContext {
        let service = config.service_type();
        let instance = config.instance_name();
        let project = manifest.project_name.to_lowercase();

        let access = manifest
            .instance(service, instance)
            .map(|record| {
                AccessPolicy::build(self.registry, service, record, &project, environment)
            })
            .unwrap_or_default();

        let mut context = RenderContext::new(project)
            .with_variable("REGION", manifest.region.as_str())
            .with_variable("ENVIRONMENT", environment)
            .with_variable("SERVICE", service.as_str())
            .with_variable("INSTANCE_NAME", instance)
            .with_variable("MODULE_NAME", ModuleName::from_instance(instance).as_str())
            .with_variable("ACCESS_VARIABLES", access.variables_hcl())
            .with_variable("ACCESS_POLICY_STATEMENTS", access.statements_hcl());

        for (key, value) in config.variables() {
            context = context.with_variable(key, value);
        }
        context
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn ensure_backend(
        &self,
        service_dir: &Path,
        manifest: &ProjectManifest,
        environment: &str,
        service: ServiceType,
    ) -> TerraplateResult<FileOutcome> {
        let path = service_dir.join(BACKEND_FILE);
        if self.filesystem.exists(&path) {
            return Ok(FileOutcome::Unchanged);
        }

        let content = backend_config(
            &manifest.project_name.to_lowercase(),
            environment,
            service,
            &manifest.region,
        );
        self.filesystem.write_file(&path, &content)?;
        Ok(FileOutcome::Created)
    }

    fn ensure_module(
        &self,
        service_dir: &Path,
        region: &str,
        module: &ModuleName,
        instance: &str,
    ) -> TerraplateResult<FileOutcome> {
        let path = service_dir.join(MAIN_FILE);

        let (existing, outcome) = match self.filesystem.read_file(&path)? {
            Some(existing) => {
                if existing.contains(&module.declaration_header()) {
                    return Ok(FileOutcome::Unchanged);
                }
                (existing, FileOutcome::Appended)
            }
            None => (provider_header(region), FileOutcome::Created),
        };

        let mut content = existing;
        content.push_str(&module_block(module, instance));
        self.filesystem.write_file(&path, &content)?;
        Ok(outcome)
    }
}

/// S3 remote-state backend for one environment and service type.
pub fn backend_config(project: &str, environment: &str, service: ServiceType, region: &str) -> String {
    format!(
        r#"terraform {{
  backend "s3" {{
    bucket         = "{project}-terraform-states-bucket-{environment}"
    key            = "{environment}/{service}/terraform.tfstate"
    region         = "{region}"
    dynamodb_table = "{project}-terraform-lock-table-{environment}"
    encrypt        = true
  }}
}}
"#
    )
}

/// Opening of a fresh `main.tf`.
pub fn provider_header(region: &str) -> String {
    format!("provider \"aws\" {{\n  region = \"{region}\"\n}}\n\n")
}

/// Module block wiring one instance directory into `main.tf`.
pub fn module_block(module: &ModuleName, instance: &str) -> String {
    format!(
        "{} {{\n  source = \"./{}\"\n}}\n\n",
        module.declaration_header(),
        instance
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, RwLock};

    use crate::application::ApplicationError;
    use crate::error::TerraplateError;

    /// Filesystem double sharing its state with the test.
    #[derive(Clone, Default)]
    struct SharedFs {
        files: Arc<RwLock<HashMap<PathBuf, String>>>,
        fail_writes_under: Option<PathBuf>,
    }

    impl SharedFs {
        fn read(&self, path: impl AsRef<Path>) -> Option<String> {
            self.files.read().unwrap().get(path.as_ref()).cloned()
        }
    }

    impl Filesystem for SharedFs {
        fn create_dir_all(&self, _path: &Path) -> TerraplateResult<()> {
            Ok(())
        }

        fn write_file(&self, path: &Path, content: &str) -> TerraplateResult<()> {
            if let Some(prefix) = &self.fail_writes_under {
                if path.starts_with(prefix) {
                    return Err(ApplicationError::WriteFailed {
                        path: path.to_path_buf(),
                        reason: "disk full".into(),
                    }
                    .into());
                }
            }
            self.files
                .write()
                .unwrap()
                .insert(path.to_path_buf(), content.to_string());
            Ok(())
        }

        fn read_file(&self, path: &Path) -> TerraplateResult<Option<String>> {
            Ok(self.read(path))
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.read().unwrap().contains_key(path)
        }
    }

    /// Renders `{{INSTANCE_NAME}}` for known templates; `data.tf.tmpl` is unknown.
    struct EchoRenderer;

    impl TemplateRenderer for EchoRenderer {
        fn render(
            &self,
            _service: ServiceType,
            template: &str,
            context: &RenderContext,
        ) -> TerraplateResult<Option<String>> {
            if template == "data.tf.tmpl" {
                return Ok(None);
            }
            Ok(Some(context.render(&format!("# {template} for {{{{INSTANCE_NAME}}}}\n"))))
        }
    }

    fn generator(fs: &SharedFs) -> InstanceGenerator {
        InstanceGenerator::new(
            Box::new(fs.clone()),
            Box::new(EchoRenderer),
            PermissionRegistry::builtin(),
            "/proj",
        )
    }

    fn manifest() -> ProjectManifest {
        ProjectManifest::new("Shop", vec!["dev".into(), "prod".into()], "us-east-1")
    }

    #[test]
    fn generates_module_once_per_environment() {
        let fs = SharedFs::default();
        let gen_ = generator(&fs);
        let config = ServiceConfig::lambda("my-func");

        let report = gen_.generate(&manifest(), &config).unwrap();
        assert_eq!(report.environments.len(), 2);

        for env in ["dev", "prod"] {
            let main = fs
                .read(format!("/proj/environments/{env}/lambda/main.tf"))
                .unwrap();
            assert!(main.starts_with("provider \"aws\" {\n  region = \"us-east-1\"\n}\n\n"));
            assert_eq!(
                main.matches("module \"my_func\" {\n  source = \"./my-func\"\n}\n\n")
                    .count(),
                1
            );
        }
    }

    #[test]
    fn regeneration_is_byte_identical() {
        let fs = SharedFs::default();
        let gen_ = generator(&fs);
        let config = ServiceConfig::lambda("my-func");

        gen_.generate(&manifest(), &config).unwrap();
        let before = fs.files.read().unwrap().clone();

        let report = gen_.generate(&manifest(), &config).unwrap();
        assert_eq!(*fs.files.read().unwrap(), before);
        for env in &report.environments {
            assert_eq!(env.backend, FileOutcome::Unchanged);
            assert_eq!(env.main, FileOutcome::Unchanged);
        }
    }

    #[test]
    fn second_instance_is_appended_verbatim() {
        let fs = SharedFs::default();
        let gen_ = generator(&fs);
        gen_.generate(&manifest(), &ServiceConfig::lambda("a")).unwrap();
        let first = fs.read("/proj/environments/dev/lambda/main.tf").unwrap();

        let report = gen_.generate(&manifest(), &ServiceConfig::lambda("b")).unwrap();
        assert_eq!(report.environments[0].main, FileOutcome::Appended);

        let second = fs.read("/proj/environments/dev/lambda/main.tf").unwrap();
        assert!(second.starts_with(&first));
        assert!(second.ends_with("module \"b\" {\n  source = \"./b\"\n}\n\n"));
    }

    #[test]
    fn similar_module_names_are_not_confused() {
        let fs = SharedFs::default();
        let gen_ = generator(&fs);
        gen_.generate(&manifest(), &ServiceConfig::lambda("my-func-v2")).unwrap();

        let report = gen_.generate(&manifest(), &ServiceConfig::lambda("my-func")).unwrap();
        assert_eq!(report.environments[0].main, FileOutcome::Appended);
    }

    #[test]
    fn backend_is_never_overwritten() {
        let fs = SharedFs::default();
        fs.files.write().unwrap().insert(
            PathBuf::from("/proj/environments/dev/dynamodb/backend.tf"),
            "# hand edited\n".into(),
        );

        let report = generator(&fs)
            .generate(&manifest(), &ServiceConfig::dynamodb("orders"))
            .unwrap();
        assert_eq!(report.environments[0].backend, FileOutcome::Unchanged);
        assert_eq!(report.environments[1].backend, FileOutcome::Created);
        assert_eq!(
            fs.read("/proj/environments/dev/dynamodb/backend.tf").unwrap(),
            "# hand edited\n"
        );
    }

    #[test]
    fn backend_names_state_bucket_and_lock_table() {
        let fs = SharedFs::default();
        generator(&fs)
            .generate(&manifest(), &ServiceConfig::s3("uploads"))
            .unwrap();

        let backend = fs.read("/proj/environments/prod/s3/backend.tf").unwrap();
        assert!(backend.contains("bucket         = \"shop-terraform-states-bucket-prod\""));
        assert!(backend.contains("key            = \"prod/s3/terraform.tfstate\""));
        assert!(backend.contains("dynamodb_table = \"shop-terraform-lock-table-prod\""));
        assert!(backend.contains("encrypt        = true"));
    }

    #[test]
    fn unknown_templates_are_skipped() {
        let fs = SharedFs::default();
        let report = generator(&fs)
            .generate(&manifest(), &ServiceConfig::lambda("my-func"))
            .unwrap();

        let dev = &report.environments[0];
        assert_eq!(dev.skipped_templates, vec!["data.tf.tmpl"]);
        assert_eq!(dev.instance_files.len(), 4);
        assert_eq!(report.files_written(), 8);
        assert_eq!(
            fs.read("/proj/environments/dev/lambda/my-func/lambda.tf").unwrap(),
            "# lambda.tf.tmpl for my-func\n"
        );
        assert!(!fs.exists(Path::new("/proj/environments/dev/lambda/my-func/data.tf")));
    }

    #[test]
    fn write_failure_keeps_earlier_environments() {
        let fs = SharedFs {
            fail_writes_under: Some(PathBuf::from("/proj/environments/prod")),
            ..SharedFs::default()
        };

        let err = generator(&fs)
            .generate(&manifest(), &ServiceConfig::lambda("my-func"))
            .unwrap_err();
        assert!(matches!(
            err,
            TerraplateError::Application(ApplicationError::WriteFailed { .. })
        ));
        assert!(fs.read("/proj/environments/dev/lambda/main.tf").is_some());
        assert!(fs.read("/proj/environments/prod/lambda/backend.tf").is_none());
    }

    #[test]
    fn context_carries_grants_of_the_instance() {
        let fs = SharedFs::default();
        let gen_ = generator(&fs);
        let mut m = manifest();
        m.register_instance(ServiceType::DynamoDb, "orders").unwrap();
        m.register_configured_instance(&ServiceConfig::lambda("checkout"))
            .unwrap();
        m.grant_access(
            ServiceType::Lambda,
            "checkout",
            ServiceType::DynamoDb,
            "orders",
            vec!["dynamodb:GetItem".into()],
        )
        .unwrap();

        let ctx = gen_.context(&m, &ServiceConfig::lambda("checkout"), "dev");
        assert_eq!(ctx.get("PROJECT_NAME"), Some("shop"));
        assert_eq!(ctx.get("MODULE_NAME"), Some("checkout"));
        assert_eq!(ctx.get("RUNTIME"), Some("nodejs20.x"));
        assert!(
            ctx.get("ACCESS_VARIABLES")
                .unwrap()
                .contains("orders_table_arn = data.aws_dynamodb_table.orders.arn")
        );
        assert!(
            ctx.get("ACCESS_POLICY_STATEMENTS")
                .unwrap()
                .contains("\"dynamodb:GetItem\"")
        );
    }

    #[test]
    fn prepare_environments_returns_created_dirs() {
        let fs = SharedFs::default();
        let dirs = generator(&fs)
            .prepare_environments(&["dev".into(), "prod".into()])
            .unwrap();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/proj/environments/dev"),
                PathBuf::from("/proj/environments/prod"),
            ]
        );
    }
}

//! Service catalog.
//!
//! One [`ServiceDef`] per supported service type: its prompt label, the
//! fixed set of templates rendered into every instance directory, and how a
//! deployed instance is looked up from another module.

use crate::domain::value_objects::ServiceType;

/// Describes what the generator needs to know about one service type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDef {
    /// The service type this entry describes.
    pub service: ServiceType,

    /// Label shown when selecting services interactively.
    pub label: &'static str,

    /// Template name → output file name, rendered into `{instance}/`.
    ///
    /// A template the renderer does not know is skipped, so a service may
    /// list optional files here.
    pub template_files: &'static [(&'static str, &'static str)],

    /// Terraform data source that resolves a deployed instance.
    pub data_source: &'static str,

    /// Attribute of [`Self::data_source`] holding the physical name.
    pub name_attribute: &'static str,

    /// Suffixes appended to the instance ARN in policy resources. The empty
    /// suffix stands for the ARN itself.
    pub arn_suffixes: &'static [&'static str],
}

impl ServiceDef {
    /// Deployed name of an instance: `{project}-{instance}-{environment}`.
    ///
    /// Templates name resources the same way, so a data source built from
    /// this finds what the instance's own module created.
    pub fn physical_name(&self, project: &str, instance: &str, environment: &str) -> String {
        format!("{}-{}-{}", project.to_lowercase(), instance, environment)
    }
}

const LAMBDA: ServiceDef = ServiceDef {
    service: ServiceType::Lambda,
    label: "Lambda (Serverless Functions)",
    template_files: &[
        ("lambda.tf.tmpl", "lambda.tf"),
        ("variables.tf.tmpl", "variables.tf"),
        ("outputs.tf.tmpl", "outputs.tf"),
        ("iam.tf.tmpl", "iam.tf"),
        ("data.tf.tmpl", "data.tf"),
    ],
    data_source: "aws_lambda_function",
    name_attribute: "function_name",
    arn_suffixes: &[""],
};

const DYNAMODB: ServiceDef = ServiceDef {
    service: ServiceType::DynamoDb,
    label: "DynamoDB (NoSQL Database)",
    template_files: &[
        ("dynamodb.tf.tmpl", "dynamodb.tf"),
        ("variables.tf.tmpl", "variables.tf"),
        ("outputs.tf.tmpl", "outputs.tf"),
    ],
    data_source: "aws_dynamodb_table",
    name_attribute: "name",
    arn_suffixes: &["", "/index/*"],
};

const S3: ServiceDef = ServiceDef {
    service: ServiceType::S3,
    label: "S3 (Object Storage)",
    template_files: &[
        ("s3.tf.tmpl", "s3.tf"),
        ("variables.tf.tmpl", "variables.tf"),
        ("outputs.tf.tmpl", "outputs.tf"),
    ],
    data_source: "aws_s3_bucket",
    name_attribute: "bucket",
    // Bucket-level actions (ListBucket) need the bare ARN, object actions `/*`.
    arn_suffixes: &["", "/*"],
};

/// Single source of truth for service capabilities, in prompt order.
pub static SERVICE_CATALOG: &[ServiceDef] = &[LAMBDA, DYNAMODB, S3];

/// Look up the catalog entry for a service type.
pub fn service_def(service: ServiceType) -> &'static ServiceDef {
    match service {
        ServiceType::Lambda => &LAMBDA,
        ServiceType::DynamoDb => &DYNAMODB,
        ServiceType::S3 => &S3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_service_type_is_cataloged() {
        for service in ServiceType::ALL {
            assert_eq!(service_def(service).service, service);
        }
    }

    #[test]
    fn template_outputs_are_unique_per_service() {
        for def in SERVICE_CATALOG {
            let mut outputs: Vec<_> = def.template_files.iter().map(|(_, out)| *out).collect();
            outputs.sort_unstable();
            outputs.dedup();
            assert_eq!(outputs.len(), def.template_files.len(), "{}", def.service);
        }
    }

    #[test]
    fn physical_name_lowercases_project() {
        assert_eq!(
            service_def(ServiceType::DynamoDb).physical_name("Shop", "orders", "dev"),
            "shop-orders-dev"
        );
    }

    #[test]
    fn bare_arn_is_always_a_resource() {
        for def in SERVICE_CATALOG {
            assert_eq!(def.arn_suffixes.first(), Some(&""), "{}", def.service);
        }
    }
}

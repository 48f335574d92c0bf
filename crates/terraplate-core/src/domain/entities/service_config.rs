//! Typed per-service configuration.
//!
//! Prompting produces one of these once; nothing downstream inspects an
//! untyped key/value bag.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{LambdaRuntime, ServiceType};

pub const DEFAULT_HANDLER: &str = "index.handler";
pub const DEFAULT_HASH_KEY: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "lowercase")]
pub enum ServiceConfig {
    Lambda {
        function_name: String,
        runtime: LambdaRuntime,
        handler: String,
    },
    #[serde(rename = "dynamodb")]
    DynamoDb {
        table_name: String,
        hash_key: String,
    },
    S3 {
        bucket_name: String,
        versioning: bool,
    },
}

impl ServiceConfig {
    pub fn lambda(function_name: impl Into<String>) -> Self {
        Self::Lambda {
            function_name: function_name.into(),
            runtime: LambdaRuntime::default(),
            handler: DEFAULT_HANDLER.into(),
        }
    }

    pub fn dynamodb(table_name: impl Into<String>) -> Self {
        Self::DynamoDb {
            table_name: table_name.into(),
            hash_key: DEFAULT_HASH_KEY.into(),
        }
    }

    pub fn s3(bucket_name: impl Into<String>) -> Self {
        Self::S3 {
            bucket_name: bucket_name.into(),
            versioning: false,
        }
    }

    pub const fn service_type(&self) -> ServiceType {
        match self {
            Self::Lambda { .. } => ServiceType::Lambda,
            Self::DynamoDb { .. } => ServiceType::DynamoDb,
            Self::S3 { .. } => ServiceType::S3,
        }
    }

    /// The instance name this configuration is registered under.
    pub fn instance_name(&self) -> &str {
        match self {
            Self::Lambda { function_name, .. } => function_name,
            Self::DynamoDb { table_name, .. } => table_name,
            Self::S3 { bucket_name, .. } => bucket_name,
        }
    }

    /// Template variables specific to this service.
    pub fn variables(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Lambda {
                function_name,
                runtime,
                handler,
            } => vec![
                ("FUNCTION_NAME", function_name.clone()),
                ("RUNTIME", runtime.to_string()),
                ("HANDLER", handler.clone()),
            ],
            Self::DynamoDb {
                table_name,
                hash_key,
            } => vec![
                ("TABLE_NAME", table_name.clone()),
                ("HASH_KEY", hash_key.clone()),
            ],
            Self::S3 {
                bucket_name,
                versioning,
            } => vec![
                ("BUCKET_NAME", bucket_name.clone()),
                (
                    "VERSIONING",
                    if *versioning { "Enabled" } else { "Suspended" }.to_string(),
                ),
            ],
        }
    }
}

//! Template bodies compiled into the binary.
//!
//! One entry per `(service, template)` listed in the service catalog. Bodies
//! use `{{VARIABLE}}` placeholders resolved by
//! [`RenderContext`](terraplate_core::domain::RenderContext); Terraform's own
//! `${...}` interpolation passes through untouched.

use terraplate_core::domain::ServiceType;

/// A built-in template body.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinTemplate {
    pub service: ServiceType,
    pub name: &'static str,
    pub body: &'static str,
}

/// Look up a built-in body.
pub fn builtin_template(service: ServiceType, name: &str) -> Option<&'static str> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|t| t.service == service && t.name == name)
        .map(|t| t.body)
}

pub static BUILTIN_TEMPLATES: &[BuiltinTemplate] = &[
    // ── Lambda ───────────────────────────────────────────────────────────────
    BuiltinTemplate {
        service: ServiceType::Lambda,
        name: "lambda.tf.tmpl",
        body: LAMBDA_MAIN,
    },
    BuiltinTemplate {
        service: ServiceType::Lambda,
        name: "variables.tf.tmpl",
        body: LAMBDA_VARIABLES,
    },
    BuiltinTemplate {
        service: ServiceType::Lambda,
        name: "outputs.tf.tmpl",
        body: LAMBDA_OUTPUTS,
    },
    BuiltinTemplate {
        service: ServiceType::Lambda,
        name: "iam.tf.tmpl",
        body: LAMBDA_IAM,
    },
    BuiltinTemplate {
        service: ServiceType::Lambda,
        name: "data.tf.tmpl",
        body: "{{ACCESS_VARIABLES}}",
    },
    // ── DynamoDB ─────────────────────────────────────────────────────────────
    BuiltinTemplate {
        service: ServiceType::DynamoDb,
        name: "dynamodb.tf.tmpl",
        body: DYNAMODB_MAIN,
    },
    BuiltinTemplate {
        service: ServiceType::DynamoDb,
        name: "variables.tf.tmpl",
        body: DYNAMODB_VARIABLES,
    },
    BuiltinTemplate {
        service: ServiceType::DynamoDb,
        name: "outputs.tf.tmpl",
        body: DYNAMODB_OUTPUTS,
    },
    // ── S3 ───────────────────────────────────────────────────────────────────
    BuiltinTemplate {
        service: ServiceType::S3,
        name: "s3.tf.tmpl",
        body: S3_MAIN,
    },
    BuiltinTemplate {
        service: ServiceType::S3,
        name: "variables.tf.tmpl",
        body: S3_VARIABLES,
    },
    BuiltinTemplate {
        service: ServiceType::S3,
        name: "outputs.tf.tmpl",
        body: S3_OUTPUTS,
    },
];

const LAMBDA_MAIN: &str = r#"locals {
  function_name = "{{PROJECT_NAME}}-{{FUNCTION_NAME}}-{{ENVIRONMENT}}"
}

resource "aws_lambda_function" "this" {
  function_name    = local.function_name
  role             = aws_iam_role.this.arn
  runtime          = "{{RUNTIME}}"
  handler          = "{{HANDLER}}"
  filename         = var.package_path
  source_code_hash = filebase64sha256(var.package_path)
  memory_size      = var.memory_size
  timeout          = var.timeout

  environment {
    variables = merge({
      ENVIRONMENT = "{{ENVIRONMENT}}"
    }, var.environment_variables)
  }

  depends_on = [aws_cloudwatch_log_group.this]

  tags = {
    Project     = "{{PROJECT_NAME}}"
    Environment = "{{ENVIRONMENT}}"
    ManagedBy   = "terraform"
  }
}

resource "aws_cloudwatch_log_group" "this" {
  name              = "/aws/lambda/${local.function_name}"
  retention_in_days = var.log_retention_days
}
"#;

const LAMBDA_VARIABLES: &str = r#"variable "package_path" {
  description = "Deployment package of {{FUNCTION_NAME}}"
  type        = string
  default     = "build/{{FUNCTION_NAME}}.zip"
}

variable "memory_size" {
  description = "Memory in MB"
  type        = number
  default     = 128
}

variable "timeout" {
  description = "Timeout in seconds"
  type        = number
  default     = 10
}

variable "log_retention_days" {
  type    = number
  default = 14
}

variable "environment_variables" {
  description = "Extra environment variables for the function"
  type        = map(string)
  default     = {}
}
"#;

const LAMBDA_OUTPUTS: &str = r#"output "{{MODULE_NAME}}_function_name" {
  value = aws_lambda_function.this.function_name
}

output "{{MODULE_NAME}}_function_arn" {
  value = aws_lambda_function.this.arn
}

output "{{MODULE_NAME}}_invoke_arn" {
  value = aws_lambda_function.this.invoke_arn
}

output "{{MODULE_NAME}}_role_arn" {
  value = aws_iam_role.this.arn
}
"#;

const LAMBDA_IAM: &str = r#"data "aws_iam_policy_document" "assume_role" {
  statement {
    effect  = "Allow"
    actions = ["sts:AssumeRole"]

    principals {
      type        = "Service"
      identifiers = ["lambda.amazonaws.com"]
    }
  }
}

resource "aws_iam_role" "this" {
  name               = "${local.function_name}-role"
  assume_role_policy = data.aws_iam_policy_document.assume_role.json
}

data "aws_iam_policy_document" "access" {
  statement {
    sid     = "Logs"
    effect  = "Allow"
    actions = [
      "logs:CreateLogStream",
      "logs:PutLogEvents",
    ]
    resources = ["${aws_cloudwatch_log_group.this.arn}:*"]
  }
{{ACCESS_POLICY_STATEMENTS}}}

resource "aws_iam_role_policy" "access" {
  name   = "${local.function_name}-access"
  role   = aws_iam_role.this.id
  policy = data.aws_iam_policy_document.access.json
}
"#;

const DYNAMODB_MAIN: &str = r#"resource "aws_dynamodb_table" "this" {
  name         = "{{PROJECT_NAME}}-{{TABLE_NAME}}-{{ENVIRONMENT}}"
  billing_mode = var.billing_mode
  hash_key     = "{{HASH_KEY}}"

  attribute {
    name = "{{HASH_KEY}}"
    type = var.hash_key_type
  }

  point_in_time_recovery {
    enabled = var.point_in_time_recovery
  }

  tags = {
    Project     = "{{PROJECT_NAME}}"
    Environment = "{{ENVIRONMENT}}"
    ManagedBy   = "terraform"
  }
}
"#;

const DYNAMODB_VARIABLES: &str = r#"variable "billing_mode" {
  type    = string
  default = "PAY_PER_REQUEST"
}

variable "hash_key_type" {
  description = "Attribute type of {{HASH_KEY}}: S, N or B"
  type        = string
  default     = "S"
}

variable "point_in_time_recovery" {
  type    = bool
  default = false
}
"#;

const DYNAMODB_OUTPUTS: &str = r#"output "{{MODULE_NAME}}_table_name" {
  value = aws_dynamodb_table.this.name
}

output "{{MODULE_NAME}}_table_arn" {
  value = aws_dynamodb_table.this.arn
}
"#;

const S3_MAIN: &str = r#"resource "aws_s3_bucket" "this" {
  bucket        = "{{PROJECT_NAME}}-{{BUCKET_NAME}}-{{ENVIRONMENT}}"
  force_destroy = var.force_destroy

  tags = {
    Project     = "{{PROJECT_NAME}}"
    Environment = "{{ENVIRONMENT}}"
    ManagedBy   = "terraform"
  }
}

resource "aws_s3_bucket_versioning" "this" {
  bucket = aws_s3_bucket.this.id

  versioning_configuration {
    status = "{{VERSIONING}}"
  }
}

resource "aws_s3_bucket_public_access_block" "this" {
  bucket                  = aws_s3_bucket.this.id
  block_public_acls       = true
  block_public_policy     = true
  ignore_public_acls      = true
  restrict_public_buckets = true
}
"#;

const S3_VARIABLES: &str = r#"variable "force_destroy" {
  description = "Allow destroying the bucket while it still holds objects"
  type        = bool
  default     = false
}
"#;

const S3_OUTPUTS: &str = r#"output "{{MODULE_NAME}}_bucket_name" {
  value = aws_s3_bucket.this.id
}

output "{{MODULE_NAME}}_bucket_arn" {
  value = aws_s3_bucket.this.arn
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use terraplate_core::domain::SERVICE_CATALOG;

    #[test]
    fn every_cataloged_template_has_a_body() {
        for def in SERVICE_CATALOG {
            for (template, _) in def.template_files {
                assert!(
                    builtin_template(def.service, template).is_some(),
                    "{}/{} has no built-in body",
                    def.service,
                    template
                );
            }
        }
    }

    #[test]
    fn no_body_is_registered_twice() {
        for (i, a) in BUILTIN_TEMPLATES.iter().enumerate() {
            for b in &BUILTIN_TEMPLATES[i + 1..] {
                assert!(!(a.service == b.service && a.name == b.name), "{}", a.name);
            }
        }
    }

    #[test]
    fn unknown_template_is_none() {
        assert!(builtin_template(ServiceType::S3, "iam.tf.tmpl").is_none());
    }
}

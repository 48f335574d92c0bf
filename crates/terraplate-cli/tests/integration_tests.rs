//! End-to-end tests for the `terraplate` binary.

use std::fs;
use std::path::Path;

use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

/// A project directory plus an empty config file, so the user's own
/// configuration never leaks into a test.
struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("terraplate.toml"), "").unwrap();
        Self { dir }
    }

    fn initialised() -> Self {
        let project = Self::new();
        project
            .cmd(&["init", "--name", "Shop", "--env", "dev", "--env", "prod", "--yes"])
            .assert()
            .success();
        project
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn cmd(&self, args: &[&str]) -> assert_cmd::Command {
        let mut cmd = cargo::cargo_bin_cmd!("terraplate");
        cmd.arg("-C")
            .arg(self.path())
            .arg("-c")
            .arg(self.path().join("terraplate.toml"))
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .args(args);
        cmd
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative)).unwrap()
    }

    fn manifest(&self) -> serde_json::Value {
        serde_json::from_str(&self.read(".terraplate.json")).unwrap()
    }
}

// ── basics ────────────────────────────────────────────────────────────────────

#[test]
fn help_lists_commands() {
    cargo::cargo_bin_cmd!("terraplate")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("relations"));
}

#[test]
fn version_flag() {
    cargo::cargo_bin_cmd!("terraplate")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_service_is_usage_error() {
    Project::new()
        .cmd(&["add", "sqs", "--name", "jobs"])
        .assert()
        .code(2);
}

#[test]
fn no_color_environment_variable_accepts_any_value() {
    let project = Project::new();
    for value in ["1", "true", "yes"] {
        project
            .cmd(&["relations"])
            .env("NO_COLOR", value)
            .assert()
            .success()
            .stdout(predicate::str::contains("lambda-to-dynamodb"));
    }
}

// ── init ──────────────────────────────────────────────────────────────────────

#[test]
fn init_creates_manifest_and_environments() {
    let project = Project::initialised();

    assert!(project.path().join("environments/dev").is_dir());
    assert!(project.path().join("environments/prod").is_dir());

    let manifest = project.manifest();
    assert_eq!(manifest["project_name"], "shop");
    assert_eq!(manifest["region"], "us-east-1");
    assert_eq!(manifest["environments"], serde_json::json!(["dev", "prod"]));
}

#[test]
fn init_twice_requires_force() {
    let project = Project::initialised();

    project
        .cmd(&["init", "--name", "shop", "--env", "dev", "--yes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("--force"));

    project
        .cmd(&["init", "--name", "shop", "--env", "dev", "--yes", "--force"])
        .assert()
        .success();
    assert_eq!(project.manifest()["environments"], serde_json::json!(["dev"]));
}

#[test]
fn init_with_invalid_name_fails() {
    Project::new()
        .cmd(&["init", "--name", "bad name!", "--env", "dev", "--yes"])
        .assert()
        .code(2);
}

#[test]
fn config_file_supplies_defaults() {
    let project = Project::new();
    fs::write(
        project.path().join("terraplate.toml"),
        "[defaults]\nregion = \"eu-west-1\"\nenvironments = [\"staging\"]\n",
    )
    .unwrap();

    project.cmd(&["init", "--name", "shop", "--yes"]).assert().success();

    let manifest = project.manifest();
    assert_eq!(manifest["region"], "eu-west-1");
    assert_eq!(manifest["environments"], serde_json::json!(["staging"]));
}

// ── add ───────────────────────────────────────────────────────────────────────

#[test]
fn add_without_project_is_not_found() {
    Project::new()
        .cmd(&["add", "lambda", "--name", "checkout", "--yes"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("terraplate init"));
}

#[test]
fn add_generates_files_in_every_environment() {
    let project = Project::initialised();
    project
        .cmd(&["add", "lambda", "--name", "my-func", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lambda/my-func"));

    for env in ["dev", "prod"] {
        let base = format!("environments/{env}/lambda");
        let main = project.read(&format!("{base}/main.tf"));
        assert_eq!(main.matches("module \"my_func\"").count(), 1);
        assert!(main.contains("source = \"./my-func\""));
        assert!(project.read(&format!("{base}/backend.tf")).contains(&format!(
            "key            = \"{env}/lambda/terraform.tfstate\""
        )));
        assert!(project.path().join(format!("{base}/my-func/lambda.tf")).is_file());
    }
}

#[test]
fn duplicate_instance_is_user_error() {
    let project = Project::initialised();
    project
        .cmd(&["add", "dynamodb", "--name", "orders", "--yes"])
        .assert()
        .success();
    project
        .cmd(&["add", "dynamodb", "--name", "orders", "--yes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn scripted_access_records_and_renders_grant() {
    let project = Project::initialised();
    project
        .cmd(&["add", "dynamodb", "--name", "orders", "--yes"])
        .assert()
        .success();
    project
        .cmd(&[
            "add",
            "lambda",
            "--name",
            "checkout",
            "--access",
            "dynamodb:orders:Read",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Granted"));

    let manifest = project.manifest();
    let grant = &manifest["services"]["lambda"]["instances"]["checkout"]["access"]["dynamodb"]["orders"];
    assert_eq!(
        grant,
        &serde_json::json!(["dynamodb:GetItem", "dynamodb:Scan", "dynamodb:Query"])
    );
    assert!(
        manifest["services"]["dynamodb"]["instances"]["orders"]
            .get("access")
            .is_none()
    );

    let iam = project.read("environments/dev/lambda/checkout/iam.tf");
    assert!(iam.contains("\"dynamodb:Query\""));
    assert!(iam.contains("local.orders_table_arn"));
    let data = project.read("environments/prod/lambda/checkout/data.tf");
    assert!(data.contains("name = \"shop-orders-prod\""));
}

#[test]
fn adding_bucket_regenerates_granted_lambda() {
    let project = Project::initialised();
    project
        .cmd(&["add", "lambda", "--name", "resizer", "--yes"])
        .assert()
        .success();
    let before = project.read("environments/dev/lambda/resizer/iam.tf");
    assert!(!before.contains("s3:GetObject"));

    project
        .cmd(&["add", "s3", "--name", "uploads", "--access", "lambda:resizer:Read"])
        .assert()
        .success();

    let manifest = project.manifest();
    assert!(
        manifest["services"]["lambda"]["instances"]["resizer"]["access"]["s3"]["uploads"]
            .is_array()
    );
    let after = project.read("environments/dev/lambda/resizer/iam.tf");
    assert!(after.contains("s3:GetObject"));
    assert!(after.contains("\"${local.uploads_bucket_arn}/*\""));
}

#[test]
fn access_to_missing_instance_changes_nothing() {
    let project = Project::initialised();
    project
        .cmd(&["add", "dynamodb", "--name", "orders", "--yes"])
        .assert()
        .success();
    let before = project.read(".terraplate.json");

    project
        .cmd(&["add", "lambda", "--name", "checkout", "--access", "dynamodb:carts:Read"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("carts"));

    assert_eq!(project.read(".terraplate.json"), before);
    assert!(!project.path().join("environments/dev/lambda").exists());
}

#[test]
fn unknown_access_level_is_user_error() {
    let project = Project::initialised();
    project
        .cmd(&["add", "dynamodb", "--name", "orders", "--yes"])
        .assert()
        .success();
    project
        .cmd(&["add", "lambda", "--name", "checkout", "--access", "dynamodb:orders:Admin"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Admin"));
}

#[test]
fn separator_variant_of_existing_name_is_rejected() {
    let project = Project::initialised();
    project
        .cmd(&["add", "lambda", "--name", "my-func", "--yes"])
        .assert()
        .success();
    let before = project.read(".terraplate.json");

    project
        .cmd(&["add", "lambda", "--name", "my_func", "--yes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("my-func"));

    assert_eq!(project.read(".terraplate.json"), before);
    assert!(!project.path().join("environments/dev/lambda/my_func").exists());
}

#[test]
fn quote_in_handler_is_rejected_before_writing() {
    let project = Project::initialised();
    project
        .cmd(&["add", "lambda", "--name", "checkout", "--handler", "index.handler\"", "--yes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("handler"));

    assert!(!project.path().join("environments/dev/lambda").exists());
}

// ── connect / generate ────────────────────────────────────────────────────────

#[test]
fn connect_existing_instance() {
    let project = Project::initialised();
    project
        .cmd(&["add", "lambda", "--name", "checkout", "--yes"])
        .assert()
        .success();
    project
        .cmd(&["add", "dynamodb", "--name", "orders", "--no-connect"])
        .assert()
        .success();

    project
        .cmd(&["connect", "lambda", "checkout", "--access", "dynamodb:orders:Write"])
        .assert()
        .success();

    let iam = project.read("environments/dev/lambda/checkout/iam.tf");
    assert!(iam.contains("dynamodb:PutItem"));
}

#[test]
fn connect_unknown_instance_is_not_found() {
    Project::initialised()
        .cmd(&["connect", "lambda", "ghost"])
        .assert()
        .code(3);
}

#[test]
fn generate_is_idempotent() {
    let project = Project::initialised();
    project
        .cmd(&["add", "lambda", "--name", "my-func", "--yes"])
        .assert()
        .success();
    project
        .cmd(&["add", "lambda", "--name", "my-func-v2", "--yes"])
        .assert()
        .success();
    let main = project.read("environments/dev/lambda/main.tf");
    let iam = project.read("environments/prod/lambda/my-func/iam.tf");

    project.cmd(&["generate"]).assert().success();
    project.cmd(&["generate", "lambda"]).assert().success();

    assert_eq!(project.read("environments/dev/lambda/main.tf"), main);
    assert_eq!(project.read("environments/prod/lambda/my-func/iam.tf"), iam);
    assert_eq!(main.matches("module \"my_func\"").count(), 1);
    assert_eq!(main.matches("module \"my_func_v2\"").count(), 1);
}

// ── list / relations / config ─────────────────────────────────────────────────

#[test]
fn list_json_describes_project() {
    let project = Project::initialised();
    project
        .cmd(&["add", "s3", "--name", "uploads", "--yes"])
        .assert()
        .success();

    let out = project.cmd(&["list", "--format", "json"]).output().unwrap();
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["project"], "shop");
    assert_eq!(json["services"][0]["service"], "s3");
    assert_eq!(json["services"][0]["instances"][0]["name"], "uploads");
}

#[test]
fn list_plain_one_per_line() {
    let project = Project::initialised();
    project
        .cmd(&["add", "dynamodb", "--name", "orders", "--yes"])
        .assert()
        .success();
    project
        .cmd(&["list", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dynamodb/orders"));
}

#[test]
fn relations_for_lambda() {
    Project::new()
        .cmd(&["relations", "lambda"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lambda-to-dynamodb"))
        .stdout(predicate::str::contains("s3-to-lambda"));
}

#[test]
fn config_get_region() {
    Project::new()
        .cmd(&["config", "get", "defaults.region"])
        .assert()
        .success()
        .stdout(predicate::str::contains("us-east-1"));
}

#[test]
fn config_get_unknown_key_is_configuration_error() {
    Project::new()
        .cmd(&["config", "get", "nope.nope"])
        .assert()
        .code(4);
}

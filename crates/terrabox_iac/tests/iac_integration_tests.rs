//! Integration tests for containerized Terraform execution.
//!
//! These tests drive the runner with a mock executor, so no Docker or Podman
//! is required. Argument quoting is checked against a real `sh`.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use tempfile::tempdir;

use terrabox_iac::env::{TERRAFORM_DIR, TERRAFORM_DIR_MOUNT_POINT, TERRAFORM_VAR_FILE, TERRAFORM_VAR_FILE_MOUNT_POINT};
use terrabox_iac::{
    CommandOptions, ExecutionParameters, IacError, TerraformCommand, TerraformOutput,
    TerraformRunner,
};
use terrabox_runner::{
    discard_progress, Arg, CapturedCall, CommandExecutor, ContainerRuntime, ExecRequest,
    MockExecutor, MockResponse, ProgressHandler, RunnerError, ShellExecutor,
};

fn runner(executor: &MockExecutor) -> TerraformRunner {
    TerraformRunner::new(Arc::new(executor.clone()), ContainerRuntime::Docker).with_user("1000:1000")
}

fn single_call(executor: &MockExecutor) -> CapturedCall {
    let calls = executor.get_calls();
    assert_eq!(calls.len(), 1);
    calls.into_iter().next().unwrap()
}

#[tokio::test]
async fn test_default_working_directory_is_cwd() {
    let executor = MockExecutor::new().add_response(MockResponse::success(""));

    runner(&executor)
        .execute(&ExecutionParameters::new("init").raw_output(true), discard_progress())
        .await
        .unwrap();

    let call = single_call(&executor);
    let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
    assert_eq!(call.env[TERRAFORM_DIR], cwd.display().to_string());
    assert!(call.env[TERRAFORM_DIR_MOUNT_POINT].starts_with("/tmp/terrabox-"));
    assert!(!call.env.contains_key(TERRAFORM_VAR_FILE));
    assert!(!call.env.contains_key(TERRAFORM_VAR_FILE_MOUNT_POINT));
}

#[tokio::test]
async fn test_container_command_shape() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new().add_response(MockResponse::success("{}"));

    runner(&executor)
        .execute(
            &ExecutionParameters::new("terraform show").working_directory(dir.path()),
            discard_progress(),
        )
        .await
        .unwrap();

    let call = single_call(&executor);
    assert_eq!(
        call.command,
        "docker run --rm -u 1000:1000 -w \"$TERRAFORM_DIR_MOUNT_POINT\" \
         -v \"$TERRAFORM_DIR:$TERRAFORM_DIR_MOUNT_POINT\" hashicorp/terraform:latest show -json"
    );
}

#[tokio::test]
async fn test_variable_file_is_mounted_and_shredded() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new()
        .watch_file_env(TERRAFORM_VAR_FILE)
        .add_response(MockResponse::success("{\"a\":1}"));

    let params = ExecutionParameters::new("plan")
        .working_directory(dir.path())
        .variables(json!({"db_password": "hunter2"}));
    runner(&executor).execute(&params, discard_progress()).await.unwrap();

    let call = single_call(&executor);
    let var_file = &call.env[TERRAFORM_VAR_FILE];
    assert_eq!(call.existing_files, vec![var_file.clone()]);
    assert!(call.env[TERRAFORM_VAR_FILE_MOUNT_POINT].ends_with(".tfvars.json"));
    assert!(call.command.contains("-v \"$TERRAFORM_VAR_FILE:$TERRAFORM_VAR_FILE_MOUNT_POINT:ro\""));
    assert!(call.command.contains("\"-var-file=$TERRAFORM_VAR_FILE_MOUNT_POINT\""));
    assert!(!call.command.contains("hunter2"));
    assert!(!Path::new(var_file).exists());
}

#[tokio::test]
async fn test_variable_file_shredded_on_execution_failure() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new()
        .watch_file_env(TERRAFORM_VAR_FILE)
        .add_response(MockResponse::failure(1, "Error: Invalid provider"));

    let params = ExecutionParameters::new("apply")
        .working_directory(dir.path())
        .variables(json!({"count": 2}));
    let err = runner(&executor).execute(&params, discard_progress()).await.unwrap_err();

    assert!(matches!(&err, IacError::Execution(msg) if msg.contains("Invalid provider")));
    let call = single_call(&executor);
    assert_eq!(call.existing_files.len(), 1);
    assert!(!Path::new(&call.env[TERRAFORM_VAR_FILE]).exists());
}

#[tokio::test]
async fn test_variable_file_shredded_when_secrets_are_invalid() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new();

    let params = ExecutionParameters::new("plan")
        .working_directory(dir.path())
        .variables(json!({"a": 1}))
        .secret_env_variables("NOT_A_PAIR");
    let err = runner(&executor).execute(&params, discard_progress()).await.unwrap_err();

    assert!(matches!(err, IacError::Runner(RunnerError::InvalidKeyValue(_))));
    assert_eq!(executor.call_count(), 0);
    let leftovers = std::fs::read_dir(std::env::temp_dir())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tfvars.json"))
        .filter(|e| std::fs::read_to_string(e.path()).map(|c| c.contains("\"a\": 1")).unwrap_or(false))
        .count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn test_missing_working_directory_fails_before_launch() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new();

    let params = ExecutionParameters::new("plan").working_directory(dir.path().join("nope"));
    let err = runner(&executor).execute(&params, discard_progress()).await.unwrap_err();

    assert!(matches!(err, IacError::Configuration(_)));
    assert_eq!(executor.call_count(), 0);
}

#[tokio::test]
async fn test_raw_output_returns_empty() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new().add_response(MockResponse::success("Apply complete!\n"));

    let params = ExecutionParameters::new("apply")
        .working_directory(dir.path())
        .raw_output(true)
        .additional_arg("-auto-approve");
    let output = runner(&executor).execute(&params, discard_progress()).await.unwrap();

    assert_eq!(output, TerraformOutput::Empty);
    let call = single_call(&executor);
    assert!(call.command.ends_with("apply -auto-approve"));
}

#[tokio::test]
async fn test_json_lines_are_parsed() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new().add_response(MockResponse::success("{\"a\":1}\n{\"b\":2}"));

    let output = runner(&executor)
        .execute(&ExecutionParameters::new("plan").working_directory(dir.path()), discard_progress())
        .await
        .unwrap();

    assert_eq!(output, TerraformOutput::Stream(vec![json!({"a": 1}), json!({"b": 2})]));
}

#[tokio::test]
async fn test_unparseable_json_output_fails() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new().add_response(MockResponse::success("Plan: 1 to add\n"));

    let err = runner(&executor)
        .execute(&ExecutionParameters::new("plan").working_directory(dir.path()), discard_progress())
        .await
        .unwrap_err();

    assert!(matches!(err, IacError::Parse(_)));
}

#[tokio::test]
async fn test_stderr_without_stdout_fails() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new()
        .add_response(MockResponse::success("").with_stderr("Error: No configuration files"));

    let err = runner(&executor)
        .execute(&ExecutionParameters::new("validate").working_directory(dir.path()), discard_progress())
        .await
        .unwrap_err();

    assert!(matches!(&err, IacError::Stderr(_)));
    assert_eq!(err.to_string(), "Error: No configuration files");
}

#[tokio::test]
async fn test_stderr_with_stdout_is_advisory() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new()
        .add_response(MockResponse::success("{\"valid\":true}").with_stderr("Warning: provider deprecated"));

    let output = runner(&executor)
        .execute(&ExecutionParameters::new("validate").working_directory(dir.path()), discard_progress())
        .await
        .unwrap();

    assert_eq!(output, TerraformOutput::Document(json!({"valid": true})));
}

#[tokio::test]
async fn test_secrets_are_forwarded_by_name() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new().add_response(MockResponse::success("{}"));

    let params = ExecutionParameters::new("plan")
        .working_directory(dir.path())
        .secret_env_variables("AWS_ACCESS_KEY_ID=AKIA123\nAWS_SECRET_ACCESS_KEY=s3cr3t");
    runner(&executor).execute(&params, discard_progress()).await.unwrap();

    let call = single_call(&executor);
    assert!(call.command.contains("-e AWS_ACCESS_KEY_ID -e AWS_SECRET_ACCESS_KEY"));
    assert!(!call.command.contains("s3cr3t"));
    assert_eq!(call.env["AWS_SECRET_ACCESS_KEY"], "s3cr3t");
    assert_eq!(call.env["AWS_ACCESS_KEY_ID"], "AKIA123");
}

#[tokio::test]
async fn test_custom_image_and_unsupported_json() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new().add_response(MockResponse::success(""));

    let params = ExecutionParameters::new("terraform fmt")
        .working_directory(dir.path())
        .custom_docker_image("registry.local/terraform:1.6");
    let output = runner(&executor).execute(&params, discard_progress()).await.unwrap();

    assert!(output.is_empty());
    let call = single_call(&executor);
    assert!(call.command.ends_with("registry.local/terraform:1.6 fmt"));
}

#[tokio::test]
async fn test_progress_is_forwarded() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new().add_response(MockResponse::success("line one\nline two\n"));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let handler: ProgressHandler = Arc::new(move |chunk: &str| sink.lock().push(chunk.to_string()));

    runner(&executor)
        .execute(
            &ExecutionParameters::new("plan").working_directory(dir.path()).raw_output(true),
            handler,
        )
        .await
        .unwrap();

    assert_eq!(*seen.lock(), vec!["line one\n".to_string(), "line two\n".to_string()]);
}

#[tokio::test]
async fn test_dry_run_does_not_execute() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new();

    let params = ExecutionParameters::new("plan")
        .working_directory(dir.path())
        .variables(json!({"dry": true}));
    let output = runner(&executor)
        .dry_run(true)
        .execute(&params, discard_progress())
        .await
        .unwrap();

    assert!(output.is_empty());
    assert_eq!(executor.call_count(), 0);
}

#[tokio::test]
async fn test_concurrent_invocations_use_distinct_files() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new().add_response(MockResponse::success("{}"));
    let runner = Arc::new(runner(&executor));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let runner = runner.clone();
            let params = ExecutionParameters::new("plan")
                .working_directory(dir.path())
                .variables(json!({"index": i}));
            tokio::spawn(async move { runner.execute(&params, discard_progress()).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let mut files: Vec<_> = executor
        .get_calls()
        .into_iter()
        .map(|c| c.env[TERRAFORM_VAR_FILE].clone())
        .collect();
    files.sort();
    files.dedup();
    assert_eq!(files.len(), 8);
    assert!(files.iter().all(|f| !Path::new(f).exists()));
}

#[tokio::test]
async fn test_quoted_variable_reaches_terraform_as_one_argument() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new().add_response(MockResponse::success(""));

    let params = ExecutionParameters::new("terraform plan -var 'region=eu west'")
        .working_directory(dir.path())
        .additional_arg("-var env=prod")
        .raw_output(true);
    runner(&executor).execute(&params, discard_progress()).await.unwrap();

    let words = shell_words::split(&single_call(&executor).command).unwrap();
    let image_at = words
        .iter()
        .position(|w| w == "hashicorp/terraform:latest")
        .unwrap();
    assert_eq!(
        words[image_at + 1..],
        ["plan", "-var", "region=eu west", "-var", "env=prod"]
    );
}

#[tokio::test]
async fn test_rendered_arguments_survive_the_shell() {
    let command = TerraformCommand::build(
        "terraform plan -var 'region=eu west' -var \"owner=o'brien\"",
        &CommandOptions {
            variable_file: true,
            json: true,
            additional_args: vec!["-target='module.a b'".to_string()],
        },
    )
    .unwrap();
    let rendered: Vec<String> = command.args().iter().map(Arg::to_shell).collect();

    let request = ExecRequest::new(format!("printf '<%s>' {}", rendered.join(" ")))
        .env(TERRAFORM_VAR_FILE_MOUNT_POINT, "/tmp/terrabox-x.tfvars.json");
    let output = ShellExecutor::new().execute(request, discard_progress()).await;

    assert!(output.success());
    assert_eq!(
        output.stdout,
        "<plan><-var><region=eu west><-var><owner=o'brien><-target=module.a b>\
         <-var-file=/tmp/terrabox-x.tfvars.json><-json>"
    );
}

#[tokio::test]
async fn test_unbalanced_quote_fails_before_launch() {
    let dir = tempdir().unwrap();
    let executor = MockExecutor::new();

    let params = ExecutionParameters::new("plan -var 'region=eu")
        .working_directory(dir.path())
        .variables(json!({"region": "eu"}));
    let err = runner(&executor).execute(&params, discard_progress()).await.unwrap_err();

    assert!(matches!(err, IacError::Configuration(_)));
    assert_eq!(executor.call_count(), 0);
}

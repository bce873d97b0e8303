use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const ERROR_CODES_URL: &str =
    "https://developers.facebook.com/docs/whatsapp/cloud-api/support/error-codes/?locale=pt_BR";

fn unique_temp_path(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("deskbot-test-{label}-{nanos}.toml"))
}

/// A command with a clean environment and a config path that does not exist.
fn deskbot_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("deskbot"));
    cmd.env_remove("DESK_PROVIDER")
        .env_remove("DESK_MODEL")
        .env_remove("DESK_TEMPERATURE")
        .env_remove("DESK_TIMEOUT")
        .env_remove("DESK_RETRIES")
        .env_remove("DESK_RECURSION_LIMIT")
        .env_remove("DESK_LOG")
        .env_remove("OPENAI_API_KEY")
        .env_remove("FIREWORKS_API_KEY")
        .env("DESK_CONFIG", unique_temp_path("absent"));
    cmd
}

fn parse_stdout_json(output: &[u8]) -> Value {
    let text = String::from_utf8(output.to_vec()).expect("stdout should be utf-8");
    serde_json::from_str(text.trim()).expect("stdout should contain valid JSON")
}

#[test]
fn dry_run_reports_defaults_without_api_key() {
    let assert = deskbot_cmd()
        .args(["ask", "--dry-run", "Oi"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["dry_run"], json!(true));
    assert_eq!(body["question"], json!("Oi"));
    assert_eq!(body["api_key_present"], json!(false));
    assert_eq!(body["catalog_documents"], json!(36));
    assert_eq!(body["settings"]["provider"], json!("openai"));
    assert_eq!(body["settings"]["model"], json!("gpt-4.1"));
    assert_eq!(body["settings"]["recursion_limit"], json!(10));
    assert_eq!(body["settings"]["native_language"], json!("pt"));
    let temperature = body["settings"]["temperature"]
        .as_f64()
        .expect("temperature should be a number");
    assert!((temperature - 0.8).abs() < 1e-6);
}

#[test]
fn argument_question_has_priority_over_stdin() {
    let assert = deskbot_cmd()
        .args(["ask", "--dry-run", "from argument"])
        .write_stdin("from stdin")
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["question"], json!("from argument"));
}

#[test]
fn question_is_read_from_stdin() {
    let assert = deskbot_cmd()
        .args(["ask", "--dry-run"])
        .write_stdin("  Como configuro o chatbot?\n")
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["question"], json!("Como configuro o chatbot?"));
}

#[test]
fn empty_question_is_rejected() {
    deskbot_cmd()
        .args(["ask", "--dry-run"])
        .write_stdin("   \n")
        .assert()
        .failure()
        .stderr(contains("No question provided"));
}

#[test]
fn invalid_provider_from_env_returns_error() {
    deskbot_cmd()
        .env("DESK_PROVIDER", "bogus")
        .args(["ask", "--dry-run", "Oi"])
        .assert()
        .failure()
        .stderr(contains(
            "Invalid DESK_PROVIDER 'bogus'. Supported values: openai, fireworks.",
        ));
}

#[test]
fn zero_recursion_limit_is_rejected() {
    deskbot_cmd()
        .args(["ask", "--dry-run", "--recursion-limit", "0", "Oi"])
        .assert()
        .failure()
        .stderr(contains("recursion limit must be at least 1"));
}

#[test]
fn precedence_is_cli_then_env_then_profile() {
    let config_path = unique_temp_path("precedence");
    fs::write(
        &config_path,
        "[profiles.work]\nprovider = \"fireworks\"\nmodel = \"profile-model\"\nrecursion_limit = 6\nretries = 1\n",
    )
    .expect("config should be writable");

    let profile_only = deskbot_cmd()
        .env("DESK_CONFIG", &config_path)
        .args(["ask", "--profile", "work", "--dry-run", "Oi"])
        .assert()
        .success();
    let body = parse_stdout_json(&profile_only.get_output().stdout);
    assert_eq!(body["settings"]["profile"], json!("work"));
    assert_eq!(body["settings"]["provider"], json!("fireworks"));
    assert_eq!(body["settings"]["model"], json!("profile-model"));
    assert_eq!(body["settings"]["recursion_limit"], json!(6));

    let env_over_profile = deskbot_cmd()
        .env("DESK_CONFIG", &config_path)
        .env("DESK_MODEL", "env-model")
        .env("DESK_RECURSION_LIMIT", "8")
        .args(["ask", "--profile", "work", "--dry-run", "Oi"])
        .assert()
        .success();
    let body = parse_stdout_json(&env_over_profile.get_output().stdout);
    assert_eq!(body["settings"]["model"], json!("env-model"));
    assert_eq!(body["settings"]["recursion_limit"], json!(8));
    assert_eq!(body["settings"]["retries"], json!(1));

    let cli_over_env = deskbot_cmd()
        .env("DESK_CONFIG", &config_path)
        .env("DESK_MODEL", "env-model")
        .env("DESK_RECURSION_LIMIT", "8")
        .args([
            "ask",
            "--profile",
            "work",
            "--model",
            "cli-model",
            "--recursion-limit",
            "4",
            "--dry-run",
            "Oi",
        ])
        .assert()
        .success();
    let body = parse_stdout_json(&cli_over_env.get_output().stdout);
    assert_eq!(body["settings"]["model"], json!("cli-model"));
    assert_eq!(body["settings"]["recursion_limit"], json!(4));

    let _ = fs::remove_file(config_path);
}

#[test]
fn profile_is_not_implicit_when_not_passed() {
    let config_path = unique_temp_path("no-implicit");
    fs::write(
        &config_path,
        "[profiles.default]\nprovider = \"fireworks\"\nmodel = \"profile-model\"\n",
    )
    .expect("config should be writable");

    let assert = deskbot_cmd()
        .env("DESK_CONFIG", &config_path)
        .args(["ask", "--dry-run", "Oi"])
        .assert()
        .success();
    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["settings"]["provider"], json!("openai"));
    assert_eq!(body["settings"]["profile"], Value::Null);

    let _ = fs::remove_file(config_path);
}

#[test]
fn missing_profile_returns_explicit_error() {
    let config_path = unique_temp_path("missing-profile");
    fs::write(&config_path, "[profiles.work]\nmodel = \"m\"\n").expect("config should be writable");

    deskbot_cmd()
        .env("DESK_CONFIG", &config_path)
        .args(["ask", "--profile", "nope", "--dry-run", "Oi"])
        .assert()
        .failure()
        .stderr(contains("Profile 'nope' not found"));

    let _ = fs::remove_file(config_path);
}

#[test]
fn invalid_toml_is_reported_by_config_check() {
    let config_path = unique_temp_path("broken");
    fs::write(&config_path, "[profiles.work\nmodel = ").expect("config should be writable");

    deskbot_cmd()
        .env("DESK_CONFIG", &config_path)
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(contains("Failed to parse config file"));

    let _ = fs::remove_file(config_path);
}

#[test]
fn config_check_accepts_valid_profile() {
    let config_path = unique_temp_path("valid");
    fs::write(
        &config_path,
        "[profiles.work]\nprovider = \"openai\"\nmodel = \"gpt-4.1-mini\"\n",
    )
    .expect("config should be writable");

    deskbot_cmd()
        .env("DESK_CONFIG", &config_path)
        .args(["config", "check", "--profile", "work"])
        .assert()
        .success()
        .stdout(contains("config OK:"));

    let _ = fs::remove_file(config_path);
}

#[test]
fn config_check_rejects_bad_profile_provider() {
    let config_path = unique_temp_path("bad-provider");
    fs::write(&config_path, "[profiles.work]\nprovider = \"acme\"\n")
        .expect("config should be writable");

    deskbot_cmd()
        .env("DESK_CONFIG", &config_path)
        .args(["config", "check", "--profile", "work"])
        .assert()
        .failure()
        .stderr(contains("Invalid profile 'work' provider 'acme'"));

    let _ = fs::remove_file(config_path);
}

#[test]
fn catalog_lists_builtin_and_configured_documents() {
    deskbot_cmd()
        .args(["catalog"])
        .assert()
        .success()
        .stdout(contains(ERROR_CODES_URL).and(contains("Códigos de Erro da API")));

    let config_path = unique_temp_path("documents");
    fs::write(
        &config_path,
        "[[documents]]\ntitle = \"Guia Interno\"\nurl = \"https://intranet.example.com/guia\"\n",
    )
    .expect("config should be writable");

    let assert = deskbot_cmd()
        .env("DESK_CONFIG", &config_path)
        .args(["catalog", "--json"])
        .assert()
        .success();
    let body = parse_stdout_json(&assert.get_output().stdout);
    let documents = body.as_array().expect("catalog JSON should be an array");
    assert_eq!(documents.len(), 37);
    assert_eq!(documents[36]["title"], json!("Guia Interno"));

    let _ = fs::remove_file(config_path);
}

#[test]
fn ask_without_api_key_fails_before_any_request() {
    deskbot_cmd()
        .args(["ask", "Oi"])
        .assert()
        .failure()
        .stderr(contains("OPENAI_API_KEY is not set"));
}

#[test]
fn chat_exits_on_sair() {
    deskbot_cmd()
        .env("OPENAI_API_KEY", "test-key")
        .args(["chat"])
        .write_stdin("\n   \nsair\n")
        .assert()
        .success()
        .stdout(contains("Você:").and(contains("Encerrando.")));
}

#[test]
fn chat_exits_on_end_of_input() {
    deskbot_cmd()
        .env("OPENAI_API_KEY", "test-key")
        .args(["chat"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(contains("Encerrando."));
}

#[test]
fn verbose_does_not_leak_api_key() {
    let secret = "sk-deskbot-secret-value";
    deskbot_cmd()
        .env("OPENAI_API_KEY", secret)
        .args(["--verbose", "ask", "--dry-run", "Oi"])
        .assert()
        .success()
        .stderr(contains("api_key_present=true").and(contains(secret).not()))
        .stdout(contains(secret).not());
}

#[test]
fn completion_script_names_the_binary() {
    deskbot_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(contains("deskbot"));
}

#[test]
fn version_reports_build_metadata() {
    deskbot_cmd()
        .args(["--version"])
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

use assert_cmd::Command;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

fn story(project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("story").unwrap();
    cmd.current_dir(project)
        .env("STORY_PROJECT_DIR", project)
        .env_remove("STORY_ACCESS_TOKEN")
        .env_remove("STORY_API_URL")
        .env_remove("STORY_HTTP_TIMEOUT");
    cmd
}

fn story_against(project: &Path, server: &MockServer) -> Command {
    let mut cmd = story(project);
    cmd.env("STORY_API_URL", server.base_url())
        .env("STORY_ACCESS_TOKEN", "test-token");
    cmd
}

fn project() -> TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn manifest_lists_actions() {
    let dir = project();
    story(dir.path())
        .arg("--manifest")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"registry.create\""))
        .stdout(predicate::str::contains("\"containers.update\""));
}

#[test]
fn container_config_from_directory_exits_nonzero() {
    let dir = project();
    let config_dir = dir.path().join("configs");
    std::fs::create_dir(&config_dir).unwrap();

    story(dir.path())
        .args(["containers", "create", "cfg", config_dir.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn container_config_with_invalid_json_exits_nonzero() {
    let dir = project();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json").unwrap();

    story(dir.path())
        .args(["containers", "create", "cfg", path.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not valid JSON"));
}

#[test]
fn registry_config_from_missing_file_reports_json_error_in_agent_mode() {
    let dir = project();

    story(dir.path())
        .args(["--agent", "registry", "update", "-n", "my_config", "-f", "missing.json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"type\":\"error\""))
        .stdout(predicate::str::contains("FILE_NOT_FOUND"));
}

#[test]
fn api_commands_require_a_token() {
    let dir = project();

    story(dir.path())
        .args(["registry", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn aborted_prompts_send_nothing() {
    // Nothing is mocked: a request would come back 404 and exit with 2
    let dir = project();
    let server = MockServer::start();

    story_against(dir.path(), &server)
        .args(["registry", "create", "-n", "my_config"])
        .write_stdin("\n\nmy_user\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Aborted!"));
}

#[test]
fn registry_create_interactive_docker_hub() {
    let dir = project();
    let server = MockServer::start();
    let auth = STANDARD.encode("my_dockerhub_username:my_dockerhub_password");
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/registry_configs")
            .header("authorization", "Bearer test-token")
            .json_body(json!({
                "name": "my_config",
                "config": {"auths": {"https://index.docker.io/v1/": {"auth": auth}}},
                "team": null
            }));
        then.status(201);
    });

    story_against(dir.path(), &server)
        .args(["registry", "create", "-n", "my_config", "-i"])
        .write_stdin("\n\nmy_dockerhub_username\nmy_dockerhub_password\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created registry config - my_config"));

    create.assert();
}

#[test]
fn registry_create_interactive_gcr() {
    let dir = project();
    let server = MockServer::start();
    let auth = STANDARD.encode(r#"_json_key:{"type":"service_account"}"#);
    let create = server.mock(|when, then| {
        when.method(POST).path("/registry_configs").json_body(json!({
            "name": "my_config",
            "config": {"auths": {"https://gcr.io": {"auth": auth}}},
            "team": "core"
        }));
        then.status(201);
    });

    story_against(dir.path(), &server)
        .args(["registry", "create", "-n", "my_config", "--team", "core"])
        .write_stdin("gcr\ngcr.io\n{\"type\":\"service_account\"}\n")
        .assert()
        .success();

    create.assert();
}

#[test]
fn registry_create_from_file_sends_contents_unchanged() {
    let dir = project();
    let document = json!({"auths": {"https://index.docker.io/v1/": {"auth": "b64_username_password"}}});
    let path = dir.path().join("config.json");
    std::fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();

    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST).path("/registry_configs").json_body(json!({
            "name": "my_config",
            "config": document,
            "team": null
        }));
        then.status(201);
    });

    story_against(dir.path(), &server)
        .args(["registry", "create", "-n", "my_config", "-f", path.to_str().unwrap()])
        .assert()
        .success();

    create.assert();
}

#[test]
fn registry_get_prints_indented_json() {
    let dir = project();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/registry_configs/my_config");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"name": "my_config"}));
    });

    story_against(dir.path(), &server)
        .args(["registry", "get", "-n", "my_config"])
        .assert()
        .success()
        .stdout("{\n    \"name\": \"my_config\"\n}\n");
}

#[test]
fn empty_registry_list_shows_hint() {
    let dir = project();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/registry_configs");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([]));
    });

    story_against(dir.path(), &server)
        .args(["registry", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No registry configs found"))
        .stdout(predicate::str::contains("$ story registry create"));
}

#[test]
fn container_update_and_delete() {
    let dir = project();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"auths": {}}"#).unwrap();

    let server = MockServer::start();
    let update = server.mock(|when, then| {
        when.method(PUT)
            .path("/container_configs/cfg")
            .json_body(json!({"config": {"auths": {}}}));
        then.status(200);
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/container_configs/cfg");
        then.status(204);
    });

    story_against(dir.path(), &server)
        .args(["containers", "update", "cfg", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated container config - cfg"));
    story_against(dir.path(), &server)
        .args(["containers", "delete", "cfg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted container config - cfg"));

    update.assert();
    delete.assert();
}

#[test]
fn remote_errors_exit_with_api_code() {
    let dir = project();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path("/registry_configs/gone");
        then.status(404)
            .header("content-type", "application/json")
            .json_body(json!({"message": "Registry config not found"}));
    });

    story_against(dir.path(), &server)
        .args(["registry", "delete", "-n", "gone"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Registry config not found"));
}

#[test]
fn registry_delete_cannot_reach_an_app() {
    let dir = project();
    let server = MockServer::start();
    let app_delete = server.mock(|when, then| {
        when.method(DELETE).path("/apps/victim");
        then.status(204);
    });

    story_against(dir.path(), &server)
        .args(["registry", "delete", "-n", "../apps/victim"])
        .assert()
        .code(2);
    story_against(dir.path(), &server)
        .args(["registry", "delete", "-n", ".."])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a valid name"));

    assert_eq!(app_delete.calls(), 0);
}

#[test]
fn short_app_names_are_rejected() {
    let dir = project();

    story(dir.path())
        .args(["apps", "create", "abc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("too short"));
    assert!(!dir.path().join("story.yml").exists());
}

#[test]
fn create_refuses_existing_project() {
    let dir = project();
    std::fs::write(dir.path().join("story.yml"), "app_name: existing\n").unwrap();

    story(dir.path())
        .args(["create", "new-app"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("$ story deploy"));
}

#[test]
fn create_app_writes_story_yml() {
    let dir = project();
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/apps")
            .json_body(json!({"name": "hello-world", "team": null}));
        then.status(201);
    });

    story_against(dir.path(), &server)
        .args(["apps", "create", "hello-world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://hello-world.storyscriptapp.com/"));

    create.assert();
    let written = std::fs::read_to_string(dir.path().join("story.yml")).unwrap();
    assert_eq!(written, "app_name: hello-world\n");
}

#[test]
fn apps_url_reads_story_yml() {
    let dir = project();
    std::fs::write(dir.path().join("story.yml"), "app_name: my-app\n").unwrap();

    story(dir.path())
        .args(["apps", "url"])
        .assert()
        .success()
        .stdout("https://my-app.storyscriptapp.com/");
}

#[test]
fn destroy_declined_keeps_app() {
    let dir = project();
    let server = MockServer::start();

    story_against(dir.path(), &server)
        .args(["apps", "destroy", "-a", "my-app"])
        .write_stdin("n\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Aborted!"));
}

#[test]
fn destroy_with_yes_skips_confirmation() {
    let dir = project();
    let server = MockServer::start();
    let destroy = server.mock(|when, then| {
        when.method(DELETE).path("/apps/my-app");
        then.status(204);
    });

    story_against(dir.path(), &server)
        .args(["apps", "destroy", "-a", "my-app", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Destroyed application - my-app"));

    destroy.assert();
}

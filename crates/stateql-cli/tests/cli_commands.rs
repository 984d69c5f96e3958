use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn workdir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stateql-cli-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create workdir");
    dir
}

fn stateql(dir: &PathBuf, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stateql"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("DATABASE_URL")
        .output()
        .expect("run stateql")
}

#[test]
fn ddl_prints_one_statement_per_table() {
    let dir = workdir("ddl");
    fs::write(dir.join("post.stateql"), "Post:\n- title is text\n- views is number\n")
        .expect("write source");

    let output = stateql(&dir, &["ddl", "post.stateql"]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "CREATE TABLE IF NOT EXISTS post (id SERIAL PRIMARY KEY, title TEXT, views NUMERIC);\n"
    );
    fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn ddl_json_honors_id_policy_from_settings() {
    let dir = workdir("settings");
    fs::write(
        dir.join("user.stateql"),
        "User:\n- id is text\n- friends is many User thru befriendedBy\n",
    )
    .expect("write source");
    fs::write(dir.join("stateql.toml"), "id_policy = \"adopt\"\n").expect("write settings");

    let output = stateql(&dir, &["ddl", "user.stateql", "--json"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let statements: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(statements[0]["table"], "user");
    assert_eq!(statements[1]["table"], "user_friends");
    assert_eq!(statements[1]["kind"], "junction");
    fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn check_reports_every_error_and_fails() {
    let dir = workdir("check");
    fs::write(
        dir.join("broken.stateql"),
        "User:\n- id text\n- friends is many User\n",
    )
    .expect("write source");

    let output = stateql(&dir, &["check", "broken.stateql"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2: error[malformed_field_declaration]"), "{stderr}");
    assert!(stderr.contains("line 3: error[malformed_relationship_clause]"), "{stderr}");
    assert!(stderr.contains("2 error(s) found"), "{stderr}");
    fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn default_policy_rejects_declared_id() {
    let dir = workdir("reject");
    fs::write(dir.join("user.stateql"), "User:\n- id is text\n").expect("write source");

    let output = stateql(&dir, &["ddl", "user.stateql"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("collides with the synthetic primary key"));
    fs::remove_dir_all(&dir).expect("cleanup");
}

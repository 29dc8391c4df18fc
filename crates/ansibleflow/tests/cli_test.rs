#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// ホストの設定に影響されないコマンドを作る
fn ansibleflow(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ansibleflow").unwrap();
    cmd.current_dir(home)
        .env_remove("ANSIBLEFLOW_CONFIG")
        .env_remove("ANSIBLEFLOW_ANSIBLE_PATH")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

fn source_with(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let home = tempfile::tempdir().unwrap();
    ansibleflow(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Run Ansible playbooks as pipeline stages"))
        .stdout(predicate::str::contains("stages"))
        .stdout(predicate::str::contains("pipeline"))
        .stdout(predicate::str::contains("run"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let home = tempfile::tempdir().unwrap();
    ansibleflow(home.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ansibleflow "));
}

/// stagesコマンドが ANSIBLE_PLAYBOOK を列挙することを確認
#[test]
fn test_stages_lists_ansible_playbook() {
    let home = tempfile::tempdir().unwrap();
    ansibleflow(home.path())
        .arg("stages")
        .assert()
        .success()
        .stdout("ANSIBLE_PLAYBOOK\n");
}

/// 標準入力のリクエストからパイプラインを組み立てられることを確認
#[test]
fn test_pipeline_from_stdin() {
    let home = tempfile::tempdir().unwrap();
    let output = ansibleflow(home.path())
        .args(["pipeline", "-"])
        .write_stdin(r#"[{"index": 0, "name": "ANSIBLE_PLAYBOOK"}, {"index": 1, "name": "ANSIBLE_PLAYBOOK"}]"#)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stages: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let stages = stages.as_array().unwrap();
    assert_eq!(stages.len(), 2);
    assert_eq!(stages[1]["index"], 1);
    assert_eq!(stages[1]["rollback"], false);
}

/// 不正なリクエストがエラーになることを確認
#[test]
fn test_pipeline_rejects_malformed_request() {
    let home = tempfile::tempdir().unwrap();
    ansibleflow(home.path())
        .args(["pipeline", "-"])
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON list"));
}

/// commandコマンドが解決済みのコマンドラインを表示することを確認
#[test]
fn test_command_prints_invocation() {
    let home = tempfile::tempdir().unwrap();
    let source = source_with(&[
        ("site.yml", "- hosts: all\n"),
        ("stage.json", r#"{"playbook": "site.yml", "inventory": "hosts", "checkMode": true}"#),
    ]);
    let expected = format!(
        "ansible-playbook {} -i {} --check\n",
        source.path().join("site.yml").display(),
        source.path().join("hosts").display()
    );

    ansibleflow(home.path())
        .arg("command")
        .arg("--source")
        .arg(source.path())
        .arg(source.path().join("stage.json"))
        .assert()
        .success()
        .stdout(expected);
}

/// 設定ファイルのデフォルト値が使われることを確認
#[test]
fn test_command_uses_config_file_defaults() {
    let home = tempfile::tempdir().unwrap();
    let source = source_with(&[
        ("site.yml", "- hosts: all\n"),
        ("stage.json", r#"{"playbook": "site.yml"}"#),
        (
            "plugin.yaml",
            "ansiblePath: /opt/ansible/bin/ansible-playbook\ninventory: inventories/prod\n",
        ),
    ]);

    ansibleflow(home.path())
        .arg("--config")
        .arg(source.path().join("plugin.yaml"))
        .arg("command")
        .arg("-s")
        .arg(source.path())
        .arg(source.path().join("stage.json"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("/opt/ansible/bin/ansible-playbook "))
        .stdout(predicate::str::contains("inventories/prod"));
}

/// 空のインベントリ指定では設定ファイルのデフォルトが使われることを確認
#[test]
fn test_command_empty_inventory_uses_default() {
    let home = tempfile::tempdir().unwrap();
    let source = source_with(&[
        ("site.yml", "- hosts: all\n"),
        ("stage.json", r#"{"playbook": "site.yml", "inventory": ""}"#),
        ("plugin.yaml", "inventory: inventories/prod\n"),
    ]);

    ansibleflow(home.path())
        .arg("--config")
        .arg(source.path().join("plugin.yaml"))
        .arg("command")
        .arg("-s")
        .arg(source.path())
        .arg(source.path().join("stage.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "-i {}",
            source.path().join("inventories/prod").display()
        )));
}

/// playbook 未指定がエラーになることを確認
#[test]
fn test_command_requires_playbook() {
    let home = tempfile::tempdir().unwrap();
    let source = source_with(&[("stage.json", r#"{"inventory": "hosts"}"#)]);

    ansibleflow(home.path())
        .arg("command")
        .arg("-s")
        .arg(source.path())
        .arg(source.path().join("stage.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("playbook is required"));
}

/// 存在しない playbook で run が失敗することを確認
#[test]
fn test_run_missing_playbook_fails() {
    let home = tempfile::tempdir().unwrap();
    let source = source_with(&[("stage.json", r#"{"playbook": "missing.yml"}"#)]);

    ansibleflow(home.path())
        .arg("run")
        .arg("-s")
        .arg(source.path())
        .arg(source.path().join("stage.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Playbook file does not exist"));
}

/// 未対応のステージ種別が拒否されることを確認
#[test]
fn test_run_unsupported_stage() {
    let home = tempfile::tempdir().unwrap();
    let source = source_with(&[("stage.json", r#"{"playbook": "site.yml"}"#)]);

    ansibleflow(home.path())
        .arg("run")
        .args(["--stage", "K8S_SYNC"])
        .arg("-s")
        .arg(source.path())
        .arg(source.path().join("stage.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("K8S_SYNC"));
}

/// 実行出力がストリームされ成功が報告されることを確認
#[cfg(unix)]
#[test]
fn test_run_streams_output_and_reports_success() {
    let home = tempfile::tempdir().unwrap();
    let source = source_with(&[
        ("site.yml", "echo \"PLAY RECAP\"; echo \"args: $*\"\n"),
        ("stage.json", r#"{"playbook": "site.yml", "diffMode": true}"#),
    ]);

    ansibleflow(home.path())
        .args(["--ansible-path", "/bin/sh"])
        .arg("run")
        .arg("-s")
        .arg(source.path())
        .arg(source.path().join("stage.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("PLAY RECAP"))
        .stdout(predicate::str::contains("args: --diff"))
        .stdout(predicate::str::contains("Ansible playbook executed successfully"));
}

/// --json で失敗結果が JSON 出力されることを確認
#[cfg(unix)]
#[test]
fn test_run_json_reports_failure() {
    let home = tempfile::tempdir().unwrap();
    let source = source_with(&[
        ("site.yml", "echo unreachable >&2; exit 4\n"),
        ("stage.json", r#"{"playbook": "site.yml"}"#),
    ]);

    let output = ansibleflow(home.path())
        .env("ANSIBLEFLOW_ANSIBLE_PATH", "/bin/sh")
        .args(["run", "--json", "-s"])
        .arg(source.path())
        .arg(source.path().join("stage.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unreachable"))
        .get_output()
        .stdout
        .clone();

    let result: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(result["status"], "FAILURE");
    assert!(result["error"].as_str().unwrap().contains("exit code 4"));
}

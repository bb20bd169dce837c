use std::process::Command;

fn vehsim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_vehsim"))
}

/// 向かい合う2台のシナリオが衝突で終了すること
#[test]
fn test_batch_head_on_collision() {
    let output = vehsim()
        .args(["--scenario", "scenarios/head_on.yaml", "--batch", "--no-pacing"])
        .output()
        .expect("Failed to execute vehsim");

    assert!(
        output.status.success(),
        "vehsim failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[警告]"), "Missing collision alert: {}", stdout);
    assert!(
        stdout.contains("Run ID: 1 ステップ数: 3 状態: Collision"),
        "Unexpected history: {}",
        stdout
    );
}

/// 衝突しないシナリオが最大時間で停止すること
#[test]
fn test_batch_parallel_stops_at_time_limit() {
    let output = vehsim()
        .args(["-s", "scenarios/parallel.yaml", "-b", "--no-pacing"])
        .output()
        .expect("Failed to execute vehsim");

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("最大シミュレーション時間に到達しました"));
    assert!(stdout.contains("Run ID: 1 ステップ数: 5 状態: Stopped"));
}

/// 車両が不足している場合は実行を拒否し、終了コード1を返すこと
#[test]
fn test_batch_without_vehicles_is_refused() {
    let output = vehsim()
        .args(["--batch", "--no-pacing"])
        .output()
        .expect("Failed to execute vehsim");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2台以上の車両が必要です"), "stderr: {}", stderr);
}

/// 存在しないシナリオファイルはエラー
#[test]
fn test_missing_scenario_file() {
    let output = vehsim()
        .args(["--scenario", "scenarios/nope.yaml", "--info"])
        .output()
        .expect("Failed to execute vehsim");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("シナリオファイルが見つかりません"));
}

/// --info はシナリオ概要のみ表示する
#[test]
fn test_info_prints_summary() {
    let output = vehsim()
        .args(["--scenario", "scenarios/head_on.yaml", "--info"])
        .output()
        .expect("Failed to execute vehsim");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("名前: head_on"));
    assert!(stdout.contains("車両数: 2台"));
    assert!(!stdout.contains("Run ID"));
}

/// 対話メニューで実行・履歴・再生を操作できること
#[test]
fn test_interactive_menu_run_and_replay() {
    use std::io::Write;
    use std::process::Stdio;

    let mut child = vehsim()
        .args(["--scenario", "scenarios/head_on.yaml", "--no-pacing"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn vehsim");

    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"3\n4\n5\n1\n5\n9\n0\n")
        .expect("Failed to write menu input");

    let output = child.wait_with_output().expect("Failed to wait for vehsim");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("シミュレーション終了。状態: Collision"));
    assert!(stdout.contains("Run ID: 1 ステップ数: 3 状態: Collision"));
    assert!(stdout.contains("=== Run 1 の再生 ==="));
    assert!(stdout.contains("Run ID 9 が見つかりません"));
    assert!(stdout.contains("プログラムを終了します"));
}

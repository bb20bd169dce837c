mod console;
mod logging;
mod models;
mod observer;
mod scenario;
mod simulation;

use std::io::{self, BufRead, Write};

use clap::{Arg, ArgMatches, Command};
use console::ConsoleObserver;
use logging::{LogConfig, LogOutput};
use models::Vehicle;
use observer::{NoPacing, Pacer, RealTimePacer};
use scenario::{ScenarioConfig, Settings};
use simulation::SimulationEngine;
use tracing::{error, info};

fn main() {
    let matches = build_cli().get_matches();

    let _log_guard = match init_logging_from_args(&matches) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ログ初期化エラー: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&matches) {
        error!("{}", e);
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}

fn build_cli() -> Command {
    Command::new("vehsim")
        .version("0.1.0")
        .about("車両シミュレーション (Vehicle Simulation)")
        .long_about("平面上の車両を固定時間刻みで移動させ、車両間の接近（衝突）を判定する\n\
                     時間駆動型シミュレーションです。実行履歴の表示と再生ができます。")
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
                .long_help("設定と初期車両を記述したシナリオファイル(.yaml)のパスを指定します。\n\
                           指定しない場合、デフォルト設定・車両なしで起動します。")
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(clap::ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
                .conflicts_with("batch")
        )
        .arg(
            Arg::new("batch")
                .short('b')
                .long("batch")
                .action(clap::ArgAction::SetTrue)
                .help("対話メニューを使わずに1回実行して終了")
        )
        .arg(
            Arg::new("no-pacing")
                .long("no-pacing")
                .action(clap::ArgAction::SetTrue)
                .help("ステップ間の実時間待機を行わない")
        )
        .arg(
            Arg::new("time-step")
                .long("time-step")
                .value_name("SECONDS")
                .value_parser(clap::value_parser!(f64))
                .help("時間刻み（秒）")
        )
        .arg(
            Arg::new("safety-distance")
                .long("safety-distance")
                .value_name("METERS")
                .value_parser(clap::value_parser!(f64))
                .help("安全距離（メートル）")
        )
        .arg(
            Arg::new("max-time")
                .long("max-time")
                .value_name("SECONDS")
                .value_parser(clap::value_parser!(f64))
                .help("1回の実行の最大シミュレーション時間（秒）")
        )
        .arg(
            Arg::new("no-log-snapshots")
                .long("no-log-snapshots")
                .action(clap::ArgAction::SetTrue)
                .help("ステップごとのスナップショット記録を無効化（再生不可）")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .default_value("warn")
                .help("診断ログレベル (trace, debug, info, warn, error)")
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("TARGET")
                .default_value("console")
                .value_parser(|s: &str| s.parse::<LogOutput>())
                .help("診断ログの出力先 (console, file, both)")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: デバッグ)")
        )
}

fn init_logging_from_args(
    matches: &ArgMatches,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, Box<dyn std::error::Error>> {
    let base_level = matches
        .get_one::<String>("log-level")
        .map(|s| logging::parse_log_level(s))
        .unwrap_or(tracing::Level::WARN);

    let config = LogConfig {
        level: logging::level_from_verbosity(matches.get_count("verbose"), base_level),
        output: matches
            .get_one::<LogOutput>("log-output")
            .copied()
            .unwrap_or(LogOutput::Console),
        ..LogConfig::default()
    };

    logging::init_logging(&config)
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let mut scenario = match matches.get_one::<String>("scenario") {
        Some(path) => {
            let scenario = ScenarioConfig::from_file(path)?;
            info!("シナリオファイル読み込み完了: {}", path);
            scenario
        }
        None => ScenarioConfig::default(),
    };

    apply_overrides(&mut scenario.settings, matches);
    scenario.validate()?;

    if matches.get_flag("info") {
        scenario.print_summary();
        return Ok(());
    }

    let mut pacer: Box<dyn Pacer> = if matches.get_flag("no-pacing") {
        Box::new(NoPacing)
    } else {
        Box::new(RealTimePacer::default())
    };

    let mut engine = SimulationEngine::new(scenario.settings.clone());
    for vehicle in scenario.vehicles {
        engine.add_vehicle(vehicle);
    }

    if matches.get_flag("batch") {
        run_batch(&mut engine, pacer.as_mut())
    } else {
        run_menu(&mut engine, pacer.as_mut())
    }
}

/// コマンドライン引数による設定の上書き
fn apply_overrides(settings: &mut Settings, matches: &ArgMatches) {
    if let Some(v) = matches.get_one::<f64>("time-step") {
        settings.time_step_s = *v;
    }
    if let Some(v) = matches.get_one::<f64>("safety-distance") {
        settings.safety_distance_m = *v;
    }
    if let Some(v) = matches.get_one::<f64>("max-time") {
        settings.max_run_time_s = *v;
    }
    if matches.get_flag("no-log-snapshots") {
        settings.enable_logging = false;
    }
}

/// 1回実行して履歴を表示
fn run_batch(engine: &mut SimulationEngine, pacer: &mut dyn Pacer) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    let mut observer = ConsoleObserver::new(stdout.lock());
    engine.start(&mut observer, pacer)?;
    if let Some(e) = observer.take_error() {
        return Err(e.into());
    }

    let mut out = observer.into_inner();
    writeln!(out)?;
    console::write_history(&mut out, &engine.history())?;
    Ok(())
}

/// 対話メニュー
fn run_menu(engine: &mut SimulationEngine, pacer: &mut dyn Pacer) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    loop {
        writeln!(out, "\n=== 車両シミュレーション メニュー ===")?;
        writeln!(out, "1. 車両を追加")?;
        writeln!(out, "2. 車両一覧")?;
        writeln!(out, "3. シミュレーション開始")?;
        writeln!(out, "4. 実行履歴")?;
        writeln!(out, "5. 実行の再生")?;
        writeln!(out, "6. 車両の速さ・方位を変更")?;
        writeln!(out, "0. 終了")?;

        let Some(choice) = prompt(&mut input, &mut out, "選択: ")? else {
            break;
        };

        match choice.as_str() {
            "1" => {
                if let Some(vehicle) = read_vehicle(&mut input, &mut out, &engine.settings().speed_unit)? {
                    engine.add_vehicle(vehicle);
                    writeln!(out, "車両を追加しました。")?;
                }
            }
            "2" => console::write_vehicles(&mut out, engine.vehicles(), &engine.settings().speed_unit)?,
            "3" => {
                let mut observer = ConsoleObserver::new(io::stdout());
                if let Err(e) = engine.start(&mut observer, pacer) {
                    writeln!(out, "{}", e)?;
                }
                if let Some(e) = observer.take_error() {
                    return Err(e.into());
                }
            }
            "4" => console::write_history(&mut out, &engine.history())?,
            "5" => {
                let Some(line) = prompt(&mut input, &mut out, "Run ID: ")? else {
                    break;
                };
                match line.parse::<u32>() {
                    Ok(run_id) => match engine.replay(run_id) {
                        Ok(logs) => console::write_replay(&mut out, run_id, logs)?,
                        Err(e) => writeln!(out, "{}", e)?,
                    },
                    Err(_) => writeln!(out, "無効なRun IDです: {}", line)?,
                }
            }
            "6" => {
                let Some(id) = prompt_number::<_, _, i32>(&mut input, &mut out, "車両ID: ")? else {
                    break;
                };
                if engine.vehicle_mut(id).is_none() {
                    writeln!(out, "車両ID {} が見つかりません。", id)?;
                    continue;
                }
                let speed_label = format!("速さ ({}): ", engine.settings().speed_unit);
                let Some(speed) = prompt_number::<_, _, f64>(&mut input, &mut out, &speed_label)? else {
                    break;
                };
                let Some(direction) = prompt_number::<_, _, f64>(&mut input, &mut out, "方位 (度): ")? else {
                    break;
                };
                if let Some(vehicle) = engine.vehicle_mut(id) {
                    vehicle.speed = speed;
                    vehicle.direction = direction;
                    writeln!(out, "車両 {} を更新しました。", id)?;
                }
            }
            "0" => break,
            other => writeln!(out, "無効な選択です: {}", other)?,
        }
    }

    writeln!(out, "プログラムを終了します...")?;
    Ok(())
}

/// 1行読み込み。入力終端なら None
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> io::Result<Option<String>> {
    write!(out, "{}", label)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// 数値を1つ読み込む。解析できるまで再入力を求める
fn prompt_number<R: BufRead, W: Write, T: std::str::FromStr>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> io::Result<Option<T>> {
    loop {
        let Some(line) = prompt(input, out, label)? else {
            return Ok(None);
        };
        match line.parse::<T>() {
            Ok(v) => return Ok(Some(v)),
            Err(_) => writeln!(out, "数値を入力してください。")?,
        }
    }
}

fn read_vehicle<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    speed_unit: &str,
) -> io::Result<Option<Vehicle>> {
    let speed_label = format!("速さ ({}): ", speed_unit);

    let Some(id) = prompt_number::<_, _, i32>(input, out, "車両ID: ")? else {
        return Ok(None);
    };
    let Some(x) = prompt_number::<_, _, f64>(input, out, "初期X: ")? else {
        return Ok(None);
    };
    let Some(y) = prompt_number::<_, _, f64>(input, out, "初期Y: ")? else {
        return Ok(None);
    };
    let Some(speed) = prompt_number::<_, _, f64>(input, out, &speed_label)? else {
        return Ok(None);
    };
    let Some(direction) = prompt_number::<_, _, f64>(input, out, "方位 (度): ")? else {
        return Ok(None);
    };
    let Some(length) = prompt_number::<_, _, f64>(input, out, "全長 (m): ")? else {
        return Ok(None);
    };

    Ok(Some(Vehicle::new(id, x, y, speed, direction, length)))
}

//! # counter-sim
//!
//! 场景回放工具：在无界面环境中驱动计数器，打印每一帧写入的文本。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p counter-host -- run counter-host/scenarios/stats.json
//! cargo run -p counter-host -- run counter-host/scenarios/always.json --json
//! cargo run -p counter-host -- run counter-host/scenarios/stats.json --realtime
//! cargo run -p counter-host -- check counter-host/scenarios/learn_more.json
//! cargo run -p counter-host -- --config config.json --log-level debug run ...
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use counter_host::{AppConfig, Player, Scenario, Transcript};
use counter_runtime::{CounterConfig, CounterTarget, DiagnosticResult};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "counter-sim")]
#[command(about = "计数器场景回放工具")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件（默认：config.json）
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// 日志级别（trace/debug/info/warn/error），覆盖配置文件
    #[arg(long, global = true)]
    log_level: Option<tracing::Level>,
}

#[derive(Subcommand)]
enum Commands {
    /// 回放场景
    Run {
        /// 场景文件路径
        scenario: PathBuf,

        /// 按真实时间回放
        #[arg(long)]
        realtime: bool,

        /// 以 JSON 输出回放结果
        #[arg(long)]
        json: bool,
    },

    /// 解析场景选项并列出诊断
    Check {
        /// 场景文件路径
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, invalid) = AppConfig::load_validated(&cli.config);
    init_logging(cli.log_level.unwrap_or_else(|| config.level()));

    if let Some(e) = invalid {
        warn!(path = ?cli.config, error = %e, "配置无效，使用默认配置");
    }

    match cli.command {
        Commands::Run {
            scenario,
            realtime,
            json,
        } => run(config, &scenario, realtime, json),
        Commands::Check { scenario } => check(&config, &scenario),
    }
}

fn init_logging(level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: AppConfig, path: &Path, realtime: bool, json: bool) -> Result<()> {
    let scenario =
        Scenario::load(path).with_context(|| format!("无法加载场景: {}", path.display()))?;
    let realtime = realtime || config.playback.realtime;
    let player = Player::new(config);

    let transcript = if realtime {
        info!(scenario = %scenario.name, "按真实时间回放");
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("无法创建 tokio 运行时")?;
        runtime.block_on(player.play_realtime(&scenario))?
    } else {
        player.play(&scenario)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&transcript)?);
    } else {
        print_transcript(&transcript);
    }
    Ok(())
}

fn print_transcript(transcript: &Transcript) {
    println!("场景: {}", transcript.name);
    for frame in &transcript.frames {
        println!("{:>8}ms  {}", frame.at_ms, frame.text);
    }
    println!("最终文本: {}", transcript.final_text);
    println!("回放时长: {}ms", transcript.elapsed_ms);

    let warnings = transcript.warnings();
    if !warnings.is_empty() {
        println!("警告 ({}):", warnings.len());
        for diagnostic in warnings {
            println!("  {diagnostic}");
        }
    }
}

fn check(config: &AppConfig, path: &Path) -> Result<()> {
    let scenario =
        Scenario::load(path).with_context(|| format!("无法加载场景: {}", path.display()))?;
    let options = config.merge_options(&scenario.options);
    let resolved = CounterConfig::resolve(&options);
    let target = CounterTarget::new(&scenario.element.text, resolved.config.percent);

    println!("场景: {}", scenario.name);
    println!("  percent:  {}", resolved.config.percent);
    println!("  duration: {}ms", resolved.config.duration_ms);
    println!("  delay:    {}ms", resolved.config.delay_ms);
    println!("  repeat:   {}", resolved.config.repeat);
    println!(
        "  数值: {} -> {}（起始文本 \"{}\"）",
        target.start_value,
        target.end_value,
        target.format(target.start_value)
    );
    print_diagnostics(&resolved.diagnostics);
    Ok(())
}

fn print_diagnostics(diagnostics: &DiagnosticResult) {
    if diagnostics.is_empty() {
        println!("无诊断");
        return;
    }
    println!("诊断 ({}):", diagnostics.diagnostics.len());
    for diagnostic in &diagnostics.diagnostics {
        println!("  {diagnostic}");
    }
}

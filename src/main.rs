// ==========================================
// 学院日程同步系统 - 命令行入口
// ==========================================
// 用法:
//   college-schedule-sync [--config <path>] preview <file> [--json]
//   college-schedule-sync [--config <path>] export <file> <out.csv>
//   college-schedule-sync [--config <path>] upload <file> [--calendar <id|url>] [--dry-run]
//   college-schedule-sync [--config <path>] delete <from> <to> [--unit <부서>] [--calendar <id|url>] [--dry-run]
//   college-schedule-sync init-config [path]
// Ctrl-C: 当前调用完成后取消批次,输出已处理部分的计数
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use college_schedule_sync::calendar::InMemoryCalendarClient;
use college_schedule_sync::config::ConfigManager;
use college_schedule_sync::{logging, ScheduleApi};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const USAGE: &str = "\
usage:
  college-schedule-sync [--config <path>] preview <file> [--json]
  college-schedule-sync [--config <path>] export <file> <out.csv>
  college-schedule-sync [--config <path>] upload <file> [--calendar <id|url>] [--dry-run]
  college-schedule-sync [--config <path>] delete <from> <to> [--unit <unit>] [--calendar <id|url>] [--dry-run]
  college-schedule-sync init-config [path]";

/// 带值的选项
const VALUE_FLAGS: &[&str] = &["--config", "--calendar", "--unit"];

/// 命令行参数: 位置参数 + 选项
struct CliArgs {
    positional: Vec<String>,
    options: HashMap<String, Option<String>>,
}

impl CliArgs {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self> {
        let mut positional = Vec::new();
        let mut options = HashMap::new();
        let mut args = args.peekable();

        while let Some(arg) = args.next() {
            if !arg.starts_with("--") {
                positional.push(arg);
                continue;
            }
            if VALUE_FLAGS.contains(&arg.as_str()) {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("选项 {} 缺少参数值", arg))?;
                options.insert(arg, Some(value));
            } else {
                options.insert(arg, None);
            }
        }

        Ok(Self {
            positional,
            options,
        })
    }

    fn value(&self, flag: &str) -> Option<&str> {
        self.options.get(flag).and_then(|v| v.as_deref())
    }

    fn flag(&self, flag: &str) -> bool {
        self.options.contains_key(flag)
    }

    fn arg(&self, index: usize, name: &str) -> Result<&str> {
        self.positional
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("缺少参数 <{}>\n{}", name, USAGE))
    }
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("日期格式应为 YYYY-MM-DD: {}", text))
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = CliArgs::parse(std::env::args().skip(1))?;
    let command = cli.arg(0, "command")?.to_string();

    tracing::info!("{} v{}", college_schedule_sync::APP_NAME, college_schedule_sync::VERSION);

    if command == "init-config" {
        let path = cli
            .positional
            .get(1)
            .map(PathBuf::from)
            .or_else(ConfigManager::default_config_path)
            .ok_or_else(|| anyhow!("无法确定配置文件路径"))?;
        let manager = ConfigManager::from_config(Default::default())?;
        manager.save_to(&path)?;
        println!("{}", path.display());
        return Ok(());
    }

    let manager = ConfigManager::load(cli.value("--config").map(Path::new))?;
    let config = manager.into_config();

    let api = if cli.flag("--dry-run") {
        tracing::warn!("试运行: 不会调用外部日历");
        ScheduleApi::new(config, Arc::new(InMemoryCalendarClient::new()))
    } else {
        ScheduleApi::from_config(config)
    };
    let api = Arc::new(api);

    match command.as_str() {
        "preview" => {
            let preview = api.preview_file(Path::new(cli.arg(1, "file")?)).await?;
            if cli.flag("--json") {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                for event in &preview.outcome.events {
                    println!("{}", event);
                }
                for skipped in &preview.outcome.skipped {
                    println!("SKIP {}: {}", skipped.row_number, skipped.reason);
                }
                println!(
                    "{} events, {} skipped ({} ms)",
                    preview.event_count, preview.skipped_count, preview.elapsed_ms
                );
            }
        }
        "export" => {
            let preview = api.preview_file(Path::new(cli.arg(1, "file")?)).await?;
            let out = cli.arg(2, "out.csv")?;
            let bytes = api.export_csv(&preview.outcome.events)?;
            tokio::fs::write(out, bytes)
                .await
                .with_context(|| format!("写入失败: {}", out))?;
            println!("{} events → {}", preview.event_count, out);
        }
        "upload" => {
            let preview = api.preview_file(Path::new(cli.arg(1, "file")?)).await?;
            spawn_cancel_on_ctrl_c(Arc::clone(&api));
            let response = api.upload(cli.value("--calendar"), &preview.outcome).await?;
            for failure in &response.failures {
                eprintln!("FAIL #{} {}: {}", failure.index, failure.label, failure.reason);
            }
            println!("{}", response.message);
        }
        "delete" => {
            let from = parse_date(cli.arg(1, "from")?)?;
            let to = parse_date(cli.arg(2, "to")?)?;
            spawn_cancel_on_ctrl_c(Arc::clone(&api));
            let response = api
                .delete_range(cli.value("--calendar"), from, to, cli.value("--unit"))
                .await?;
            println!("{}", response.message);
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }

    Ok(())
}

/// Ctrl-C 时请求取消当前批次
fn spawn_cancel_on_ctrl_c(api: Arc<ScheduleApi>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("收到中断信号，当前调用完成后取消批次");
            api.cancel();
        }
    });
}

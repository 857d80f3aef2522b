// ==========================================
// im2txt 图像描述模型 - 配置查看入口
// ==========================================
// 用法:
//   im2txt-config                                  # 输出默认+环境生效配置
//   im2txt-config --mode train model.batch_size=64 # 指定模式并覆写
//   im2txt-config --strict --mode eval             # 校验错误时非零退出
// ==========================================

use std::process;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use im2txt_config::{logging, ConfigManager, LoadOptions, RunMode, ValidationMode, APP_NAME};

const ENV_HELP: &str = "\
ENV:
  IM2TXT_DATA_ROOT          数据根目录（重定位 GloVe 相关路径）
  IM2TXT_CONFIG_PATH        JSON 设置文件
  IM2TXT__MODEL__<FIELD>    键值覆写，例如 IM2TXT__MODEL__BATCH_SIZE=64
  RUST_LOG                  日志级别（默认 info）";

/// 运行模式（命令行取值）
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliMode {
    /// 从检查点继续训练
    Train,
    /// 从头训练（需要 Inception 检查点）
    TrainScratch,
    Eval,
    Inference,
}

impl From<CliMode> for RunMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Train => RunMode::Train { from_scratch: false },
            CliMode::TrainScratch => RunMode::Train { from_scratch: true },
            CliMode::Eval => RunMode::Eval,
            CliMode::Inference => RunMode::Inference,
        }
    }
}

/// 输出 im2txt 模型与训练的生效配置（JSON）
#[derive(Parser, Debug)]
#[command(name = APP_NAME, version, after_help = ENV_HELP)]
struct CliArgs {
    /// 按此运行模式校验配置
    #[arg(long, value_enum, default_value_t = CliMode::Inference)]
    mode: CliMode,

    /// 存在错误级违规时非零退出
    #[arg(long)]
    strict: bool,

    /// 键值覆写，在环境变量覆写之后应用
    #[arg(value_name = "KEY=VALUE", value_parser = parse_override)]
    overrides: Vec<(String, String)>,
}

impl CliArgs {
    fn validation_mode(&self) -> ValidationMode {
        if self.strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        }
    }
}

/// 按第一个 '=' 切分 key=value，取值中可以再含 '='
fn parse_override(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("无法识别的参数: {}（覆写格式为 key=value）", raw))
}

fn run(cli: CliArgs) -> Result<()> {
    let mode = RunMode::from(cli.mode);
    let validation_mode = cli.validation_mode();

    let mut options = LoadOptions::from_env();
    options.overrides.extend(cli.overrides);

    let manager = ConfigManager::load_with(&options).context("配置加载失败")?;

    let report = manager.validate(mode);
    tracing::info!(
        run_mode = %mode,
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        "配置校验结果"
    );
    report
        .into_result(validation_mode)
        .context("配置校验未通过")?;

    println!("{}", manager.snapshot_json()?);
    Ok(())
}

fn main() {
    let cli = CliArgs::parse();
    logging::init();

    if let Err(e) = run(cli) {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(raw: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once(APP_NAME).chain(raw.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_args_defaults() {
        let cli = parse(&[]).unwrap();
        assert_eq!(RunMode::from(cli.mode), RunMode::Inference);
        assert_eq!(cli.validation_mode(), ValidationMode::Lenient);
        assert!(cli.overrides.is_empty());
    }

    #[test]
    fn test_parse_args_full() {
        let cli = parse(&[
            "--mode",
            "train-scratch",
            "--strict",
            "model.batch_size=64",
            "model.input_file_pattern=/data/train-*=x",
        ])
        .unwrap();
        assert_eq!(RunMode::from(cli.mode), RunMode::Train { from_scratch: true });
        assert_eq!(cli.validation_mode(), ValidationMode::Strict);
        assert_eq!(
            cli.overrides,
            vec![
                ("model.batch_size".to_string(), "64".to_string()),
                ("model.input_file_pattern".to_string(), "/data/train-*=x".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse(&["--mode"]).is_err());
        assert_eq!(
            parse(&["--mode", "serve"]).unwrap_err().kind(),
            ErrorKind::InvalidValue
        );
        assert_eq!(
            parse(&["batch_size"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            parse(&["--help"]).unwrap_err().kind(),
            ErrorKind::DisplayHelp
        );
    }
}

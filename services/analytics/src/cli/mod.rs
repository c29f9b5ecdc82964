//! analytics CLI 分发：`run`、`issue-token`、`verify-token`、`version`。

use anyhow::{anyhow, bail};
use serde_json::json;
use xl_shared_protocol::{InternalClaims, InternalTokenAuthority};

use crate::config::Config;

/// CLI 分发结果。
pub(crate) enum CliDispatch {
    /// 继续进入 HTTP 服务主循环。
    Run,
    /// 命令已处理完成，主程序应退出。
    Exit,
}

/// 输出格式。
#[derive(Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

/// 解析并执行 analytics CLI。
pub(crate) fn dispatch(args: &[String]) -> anyhow::Result<CliDispatch> {
    if args.is_empty() {
        return Ok(CliDispatch::Run);
    }

    let cmd = args[0].trim();
    if cmd.is_empty() || cmd == "run" {
        return Ok(CliDispatch::Run);
    }

    if matches!(cmd, "-h" | "--help" | "help") {
        print_root_help();
        return Ok(CliDispatch::Exit);
    }

    match cmd {
        "issue-token" => {
            let format = parse_format(&args[1..])?;
            let authority = load_authority()?;
            let token = authority
                .issue_token()
                .map_err(|err| anyhow!("issue internal token failed: {err}"))?;
            println!("{}", render_issued_token(&token, &authority, format));
            Ok(CliDispatch::Exit)
        }
        "verify-token" => {
            let token = match args.get(1..) {
                Some([token]) => token.trim(),
                _ => bail!("usage: xl-analytics verify-token <token>"),
            };
            let claims = load_authority()?
                .verify_token(token)
                .map_err(|err| anyhow!("{}: {err}", err.code()))?;
            println!("{}", render_claims(&claims));
            Ok(CliDispatch::Exit)
        }
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(CliDispatch::Exit)
        }
        other => Err(anyhow!(
            "unknown command: {other}; run `xl-analytics --help` for usage"
        )),
    }
}

/// 按当前环境配置构建签发器。
fn load_authority() -> anyhow::Result<InternalTokenAuthority> {
    Config::from_env()?.token_authority()
}

/// 解析 `--format` 参数。
fn parse_format(args: &[String]) -> anyhow::Result<OutputFormat> {
    if args.is_empty() {
        return Ok(OutputFormat::Text);
    }
    if args.len() == 2 && args[0] == "--format" {
        return match args[1].as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(anyhow!("unsupported format: {other}")),
        };
    }
    Err(anyhow!("usage: xl-analytics issue-token [--format text|json]"))
}

/// 渲染签发结果；text 仅输出 token，便于脚本直接取用。
fn render_issued_token(
    token: &str,
    authority: &InternalTokenAuthority,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => token.to_string(),
        OutputFormat::Json => {
            let payload = json!({
                "header": "X-Internal-Token",
                "token": token,
                "expiresInSec": authority.lifetime().as_secs(),
            });
            serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

fn render_claims(claims: &InternalClaims) -> String {
    serde_json::to_string_pretty(claims).unwrap_or_else(|_| "{}".to_string())
}

/// 打印 root help。
fn print_root_help() {
    println!("xl-analytics usage:");
    println!("  xl-analytics run");
    println!("  xl-analytics issue-token [--format text|json]");
    println!("  xl-analytics verify-token <token>");
    println!("  xl-analytics version");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::Value;
    use xl_shared_protocol::InternalTokenAuthority;

    use super::{OutputFormat, parse_format, render_claims, render_issued_token};

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn format_defaults_to_text() {
        assert_eq!(parse_format(&[]).unwrap(), OutputFormat::Text);
        assert_eq!(
            parse_format(&args(&["--format", "json"])).unwrap(),
            OutputFormat::Json
        );
        assert!(parse_format(&args(&["--format", "yaml"])).is_err());
        assert!(parse_format(&args(&["json"])).is_err());
    }

    #[test]
    fn json_output_names_header_and_lifetime() {
        let authority =
            InternalTokenAuthority::new("cli-secret", Duration::from_secs(600)).unwrap();
        let token = authority.issue_token().unwrap();

        assert_eq!(
            render_issued_token(&token, &authority, OutputFormat::Text),
            token
        );
        let value: Value =
            serde_json::from_str(&render_issued_token(&token, &authority, OutputFormat::Json))
                .unwrap();
        assert_eq!(value["header"], "X-Internal-Token");
        assert_eq!(value["expiresInSec"], 600);
        assert_eq!(value["token"], token.as_str());
    }

    #[test]
    fn claims_render_with_wire_field_names() {
        let authority =
            InternalTokenAuthority::new("cli-secret", Duration::from_secs(600)).unwrap();
        let claims = authority
            .verify_token(&authority.issue_token().unwrap())
            .unwrap();
        let value: Value = serde_json::from_str(&render_claims(&claims)).unwrap();

        assert_eq!(value["sub"], "internal-service");
        assert_eq!(value["role"], "INTERNAL_SERVICE");
        assert!(value["exp"].as_u64().unwrap() > value["iat"].as_u64().unwrap());
    }
}

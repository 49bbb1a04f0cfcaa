//! Subcommand execution.

use std::time::Duration;

use dart::prompts::PromptKind;
use dart::{CorpCodeResolver, DartConfig, DartTools, PeriodRequest, PeriodResolver, Record};
use serde_json::{Value, json};
use tracing::debug;

use crate::cli::{Cli, Command, LookupArgs};
use crate::error::CliError;

/// What a command produced.
#[derive(Debug)]
pub(crate) enum Output {
    /// A JSON document for stdout.
    Json(Value),
    /// Plain text for stdout.
    Text(String),
}

/// Builds the configuration from the environment, then applies flag overrides.
pub(crate) fn config(cli: &Cli) -> Result<DartConfig, CliError> {
    let mut config = DartConfig::from_env()?;
    if let Some(key) = &cli.api_key {
        config = config.with_api_key(key.clone());
    }
    if let Some(path) = &cli.corp_codes {
        config = config.with_corp_code_path(path.clone());
    }
    if let Some(path) = &cli.corp_listing {
        config = config.with_corp_listing_path(path.clone());
    }
    if let Some(path) = &cli.cache {
        config = config.with_cache_path(path.clone());
    }
    if let Some(seconds) = cli.cache_ttl {
        config = config.with_cache_ttl(Duration::from_secs(seconds));
    }
    Ok(config)
}

pub(crate) async fn run(cli: &Cli) -> Result<Output, CliError> {
    let config = config(cli)?;
    debug!(?config, command = ?cli.command, "Running command");

    match &cli.command {
        Command::Finance(args) => {
            let tools = DartTools::from_config(&config)?;
            let records = tools.find_finance(&args.stock, args.year, args.quarter).await?;
            Ok(records_output(records))
        }
        Command::Dividend(args) => {
            let tools = DartTools::from_config(&config)?;
            let records = tools.find_dividend(&args.stock, args.year, args.quarter).await?;
            Ok(records_output(records))
        }
        Command::Compensation(args) => {
            let tools = DartTools::from_config(&config)?;
            let records = tools
                .find_compensation(&args.stock, args.year, args.quarter)
                .await?;
            Ok(records_output(records))
        }
        Command::CorpCode { identifier } => {
            let registry = config.corp_code_registry();
            registry.ensure_initialized().await?;
            let corp_code = registry.fetch_corp_code(identifier).await?;
            let corp_name = registry.fetch_corp_name(&corp_code).await?;
            Ok(Output::Json(json!({
                "identifier": identifier,
                "corp_code": corp_code,
                "corp_name": corp_name,
            })))
        }
        Command::Prompt { kind, lookup } => {
            Ok(Output::Text(render_prompt(*kind, lookup, PeriodResolver::new())?))
        }
    }
}

/// Renders a prompt for the period a lookup with these arguments starts from.
fn render_prompt(
    kind: PromptKind,
    args: &LookupArgs,
    resolver: PeriodResolver,
) -> Result<String, CliError> {
    let request = PeriodRequest::from_parts(args.year, args.quarter)?;
    let period = request.starting_period(resolver.today());
    Ok(kind.render(&args.stock, period))
}

fn records_output(records: Vec<Record>) -> Output {
    Output::Json(Value::Array(records.into_iter().map(Value::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(year: Option<i32>, quarter: Option<u8>) -> LookupArgs {
        LookupArgs {
            stock: "005930".to_string(),
            year,
            quarter,
        }
    }

    #[test]
    fn test_prompt_for_explicit_period() {
        let text =
            render_prompt(PromptKind::Finance, &args(Some(2024), Some(3)), PeriodResolver::new())
                .unwrap();
        assert_eq!(text, "005930의 2024년 3분기 재무제표를 찾았습니다.");
    }

    #[test]
    fn test_prompt_for_past_year_uses_annual_report() {
        let text = render_prompt(
            PromptKind::Dividend,
            &args(Some(2020), None),
            PeriodResolver::new(),
        )
        .unwrap();
        assert!(text.starts_with("005930의 2020년 4분기"));
    }

    #[test]
    fn test_prompt_rejects_bad_quarter() {
        let err = render_prompt(
            PromptKind::Dividend,
            &args(Some(2024), Some(0)),
            PeriodResolver::new(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 64);
    }

    #[test]
    fn test_records_output_is_array() {
        let output = records_output(vec![Record::new().with_field("se", "주당순이익(원)")]);
        match output {
            Output::Json(Value::Array(rows)) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0]["se"], "주당순이익(원)");
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }
}

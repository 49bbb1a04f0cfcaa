//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dart::prompts::PromptKind;

/// Korean corporate disclosure lookups from DART.
#[derive(Debug, Parser)]
#[command(name = "dart", version, about = "Korean corporate disclosure lookups from DART")]
pub(crate) struct Cli {
    /// OpenDART API key (overrides DART_API_KEY).
    #[arg(long, global = true)]
    pub(crate) api_key: Option<String>,

    /// Persisted corp-code table (overrides DART_CORPCODE_PATH).
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) corp_codes: Option<PathBuf>,

    /// JSON listing the corp-code table is built from (overrides DART_CORP_LISTING).
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) corp_listing: Option<PathBuf>,

    /// SQLite report cache (overrides DART_CACHE_PATH).
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) cache: Option<PathBuf>,

    /// Seconds a cached report is served before it is fetched again (overrides DART_CACHE_TTL).
    #[arg(long, global = true, value_name = "SECONDS")]
    pub(crate) cache_ttl: Option<u64>,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub(crate) pretty: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Financial statements.
    Finance(LookupArgs),
    /// Dividend information.
    Dividend(LookupArgs),
    /// Director and auditor compensation.
    Compensation(LookupArgs),
    /// Resolve a ticker or company name to its corp code.
    CorpCode {
        /// Six-digit stock code or company name.
        identifier: String,
    },
    /// Render the prompt text for a lookup.
    Prompt {
        /// dividend, finance or compensation.
        kind: PromptKind,
        #[command(flatten)]
        lookup: LookupArgs,
    },
}

/// Company and optional period of a lookup.
#[derive(Debug, Clone, Args)]
pub(crate) struct LookupArgs {
    /// Six-digit stock code (optionally .KS/.KQ) or company name.
    pub(crate) stock: String,

    /// Fiscal year. Without --quarter, the latest filed quarter of that year.
    #[arg(long)]
    pub(crate) year: Option<i32>,

    /// Fiscal quarter, 1-4. With --year, exactly that period.
    #[arg(long)]
    pub(crate) quarter: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lookup() {
        let cli = Cli::try_parse_from([
            "dart", "dividend", "005930", "--year", "2024", "--quarter", "4", "--pretty",
        ])
        .unwrap();
        assert!(cli.pretty);
        match cli.command {
            Command::Dividend(args) => {
                assert_eq!(args.stock, "005930");
                assert_eq!(args.year, Some(2024));
                assert_eq!(args.quarter, Some(4));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_prompt() {
        let cli = Cli::try_parse_from(["dart", "prompt", "compensation", "삼성전자"]).unwrap();
        match cli.command {
            Command::Prompt { kind, lookup } => {
                assert_eq!(kind, PromptKind::Compensation);
                assert_eq!(lookup.stock, "삼성전자");
                assert_eq!(lookup.year, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dart",
            "corp-code",
            "005930",
            "--corp-codes",
            "/tmp/corpcode.json",
            "--cache-ttl",
            "3600",
        ])
        .unwrap();
        assert_eq!(cli.corp_codes, Some(PathBuf::from("/tmp/corpcode.json")));
        assert_eq!(cli.cache_ttl, Some(3600));
    }

    #[test]
    fn test_unknown_prompt_is_rejected() {
        assert!(Cli::try_parse_from(["dart", "prompt", "balance", "005930"]).is_err());
    }
}

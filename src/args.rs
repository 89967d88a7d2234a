use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::report::{ReportKind, ReportTarget};

/// Download balances, transactions and portfolio holdings from Monarch
/// Money and export them to CSV files.
#[derive(Parser, Debug)]
pub struct Args {
    /// Monarch account email
    #[arg(long, env = "MONARCH_EMAIL")]
    pub username: String,

    /// Monarch account password
    #[arg(long, env = "MONARCH_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Multi-factor one-time code, for accounts with MFA enabled
    #[arg(long, env = "MONARCH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Where to write the balances report. Omit to skip it
    #[arg(long = "report_balances", value_name = "PATH")]
    pub report_balances: Option<PathBuf>,

    /// Where to write the year-to-date transactions report. Omit to skip it
    #[arg(long = "report_transactions", value_name = "PATH")]
    pub report_transactions: Option<PathBuf>,

    /// Where to write the daily balance history report. Omit to skip it
    #[arg(long = "report_balances_history", value_name = "PATH")]
    pub report_balances_history: Option<PathBuf>,

    /// Where to write the portfolio holdings report. Omit to skip it
    #[arg(long = "report_portfolio", value_name = "PATH")]
    pub report_portfolio: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

impl Args {
    /// The reports this run should produce, in their fixed run order.
    pub fn report_targets(&self) -> Vec<ReportTarget> {
        [
            (ReportKind::Balances, &self.report_balances),
            (ReportKind::Transactions, &self.report_transactions),
            (ReportKind::BalancesHistory, &self.report_balances_history),
            (ReportKind::Portfolio, &self.report_portfolio),
        ]
        .into_iter()
        .filter_map(|(kind, path)| {
            path.as_ref().map(|path| ReportTarget {
                kind,
                path: path.clone(),
            })
        })
        .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

pub fn parse() -> Args {
    Args::parse()
}

use std::fmt;
use std::path::PathBuf;

use crate::monarch_api::{
    BALANCE_COLUMNS, BALANCE_HISTORY_COLUMNS, PORTFOLIO_COLUMNS, TRANSACTION_COLUMNS,
};

/// The four independent export categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Balances,
    Transactions,
    BalancesHistory,
    Portfolio,
}

impl ReportKind {
    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::Balances => "balances",
            ReportKind::Transactions => "transactions",
            ReportKind::BalancesHistory => "balances_history",
            ReportKind::Portfolio => "portfolio",
        }
    }

    /// Columns every file of this kind carries, even when the fetch
    /// returned no rows.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ReportKind::Balances => BALANCE_COLUMNS,
            ReportKind::Transactions => TRANSACTION_COLUMNS,
            ReportKind::BalancesHistory => BALANCE_HISTORY_COLUMNS,
            ReportKind::Portfolio => PORTFOLIO_COLUMNS,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One requested report: what to fetch and where to write it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTarget {
    pub kind: ReportKind,
    pub path: PathBuf,
}

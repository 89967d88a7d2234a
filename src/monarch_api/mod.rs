mod accounts;
mod balance_history;
mod client;
mod holdings;
mod transactions;

#[cfg(test)]
pub(crate) mod mock;

pub use accounts::{fetch_balances, AccountBalance, BALANCE_COLUMNS};
pub use balance_history::{fetch_balance_history, BalancePoint, BALANCE_HISTORY_COLUMNS};
pub use client::{Credentials, Monarch};
pub use holdings::{fetch_portfolio, Holding, PORTFOLIO_COLUMNS};
pub use transactions::{fetch_transactions, Transaction, TRANSACTION_COLUMNS};

pub(crate) use client::{BASE_URL, RETRY_DELAY};

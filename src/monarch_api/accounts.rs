use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::FetchError;
use crate::export::Record;

use super::client::Monarch;

pub const BALANCE_COLUMNS: &[&str] = &["account_id", "name", "type", "balance", "updated_at"];

const ACCOUNTS_QUERY: &str = r#"
query GetAccounts {
  accounts {
    id
    displayName
    currentBalance
    holdingsCount
    updatedAt
    type {
      name
    }
  }
}"#;

/// One account as the service reports it. Shared with the portfolio
/// fetcher, which needs the holdings counts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Account {
    pub id: String,
    pub display_name: String,
    pub current_balance: Option<Decimal>,
    #[serde(default)]
    pub holdings_count: i64,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AccountType {
    pub name: String,
}

#[derive(Deserialize)]
struct AccountsData {
    accounts: Vec<Account>,
}

/// A row of the balances report.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalance {
    pub account_id: String,
    pub name: String,
    pub account_type: Option<String>,
    pub balance: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

impl AccountBalance {
    pub fn record(&self) -> Record {
        Record::new()
            .with("account_id", self.account_id.as_str())
            .with("name", self.name.as_str())
            .with("type", self.account_type.as_deref().unwrap_or(""))
            .with(
                "balance",
                self.balance.map(|balance| balance.to_string()).unwrap_or_default(),
            )
            .with("updated_at", self.updated_at.to_rfc3339())
    }
}

pub(crate) async fn list_accounts(client: &mut Monarch) -> Result<Vec<Account>, FetchError> {
    let data: AccountsData = client
        .graphql("GetAccounts", ACCOUNTS_QUERY, serde_json::json!({}))
        .await?;
    Ok(data.accounts)
}

/// The current balance of every account.
pub async fn fetch_balances(client: &mut Monarch) -> Result<Vec<AccountBalance>, FetchError> {
    log::info!("Requesting accounts...");
    let accounts = list_accounts(client).await?;
    log::info!("Requesting accounts...done");
    Ok(accounts
        .into_iter()
        .map(|account| AccountBalance {
            account_id: account.id,
            name: account.display_name,
            account_type: account.account_type.map(|account_type| account_type.name),
            balance: account.current_balance,
            updated_at: account.updated_at,
        })
        .collect())
}

use std::collections::HashMap;

use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::FetchError;
use crate::export::Record;

use super::client::Monarch;

pub const TRANSACTION_COLUMNS: &[&str] = &[
    "id", "account_id", "account", "date", "merchant", "category", "group", "notes", "amount",
];

/// The service caps result pages. Anything past this many rows in the
/// window is dropped, with a warning.
const TRANSACTION_LIMIT: i64 = 10_000;

const CATEGORIES_QUERY: &str = r#"
query GetCategories {
  categories {
    id
    name
    group {
      id
      name
    }
  }
}"#;

const TRANSACTIONS_QUERY: &str = r#"
query GetTransactionsList($offset: Int, $limit: Int, $filters: TransactionFilterInput) {
  allTransactions(filters: $filters) {
    totalCount
    results(offset: $offset, limit: $limit) {
      id
      amount
      date
      notes
      merchant {
        id
        name
      }
      category {
        id
        name
      }
      account {
        id
        displayName
      }
    }
  }
}"#;

#[derive(Deserialize)]
struct CategoriesData {
    categories: Vec<Category>,
}

#[derive(Deserialize)]
struct Category {
    id: String,
    group: CategoryGroup,
}

#[derive(Deserialize)]
struct CategoryGroup {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionsData {
    all_transactions: TransactionList,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionList {
    total_count: i64,
    results: Vec<TransactionResult>,
}

#[derive(Deserialize)]
struct TransactionResult {
    id: String,
    amount: Decimal,
    date: NaiveDate,
    notes: Option<String>,
    merchant: Merchant,
    category: TransactionCategory,
    account: AccountRef,
}

#[derive(Deserialize)]
struct Merchant {
    name: String,
}

#[derive(Deserialize)]
struct TransactionCategory {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRef {
    id: String,
    display_name: String,
}

/// A row of the transactions report.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub account: String,
    pub date: NaiveDate,
    pub merchant: String,
    pub category: String,
    pub group: String,
    pub notes: Option<String>,
    pub amount: Decimal,
}

impl Transaction {
    pub fn record(&self) -> Record {
        Record::new()
            .with("id", self.id.as_str())
            .with("account_id", self.account_id.as_str())
            .with("account", self.account.as_str())
            .with("date", self.date.to_string())
            .with("merchant", self.merchant.as_str())
            .with("category", self.category.as_str())
            .with("group", self.group.as_str())
            .with("notes", self.notes.as_deref().unwrap_or(""))
            .with("amount", self.amount.to_string())
    }
}

/// Year-to-date transactions, newest first as the service returns them.
/// Category group names come from a separate categories query. A
/// transaction whose category is missing from that list gets an empty
/// group.
pub async fn fetch_transactions(client: &mut Monarch) -> Result<Vec<Transaction>, FetchError> {
    let today = Local::now().date_naive();
    let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap();
    fetch_transactions_between(client, start, today).await
}

pub(crate) async fn fetch_transactions_between(
    client: &mut Monarch,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Transaction>, FetchError> {
    log::info!("Requesting categories...");
    let groups = fetch_category_groups(client).await?;
    log::info!("Requesting categories...done");

    log::info!("Requesting transactions...");
    let data: TransactionsData = client
        .graphql(
            "GetTransactionsList",
            TRANSACTIONS_QUERY,
            serde_json::json!({
                "offset": 0,
                "limit": TRANSACTION_LIMIT,
                "filters": {
                    "search": "",
                    "categories": [],
                    "accounts": [],
                    "tags": [],
                    "startDate": start.to_string(),
                    "endDate": end.to_string(),
                },
            }),
        )
        .await?;
    if data.all_transactions.total_count > TRANSACTION_LIMIT {
        log::warn!(
            "transaction report truncated: {} transactions in the window, limit {TRANSACTION_LIMIT}",
            data.all_transactions.total_count
        );
    }
    log::info!("Requesting transactions...done");

    Ok(data
        .all_transactions
        .results
        .into_iter()
        .map(|transaction| {
            let group = groups
                .get(&transaction.category.id)
                .cloned()
                .unwrap_or_default();
            Transaction {
                id: transaction.id,
                account_id: transaction.account.id,
                account: transaction.account.display_name,
                date: transaction.date,
                merchant: transaction.merchant.name,
                category: transaction.category.name,
                group,
                notes: transaction.notes,
                amount: transaction.amount,
            }
        })
        .collect())
}

async fn fetch_category_groups(client: &mut Monarch) -> Result<HashMap<String, String>, FetchError> {
    let data: CategoriesData = client
        .graphql("GetCategories", CATEGORIES_QUERY, serde_json::json!({}))
        .await?;
    Ok(data
        .categories
        .into_iter()
        .map(|category| (category.id, category.group.name))
        .collect())
}

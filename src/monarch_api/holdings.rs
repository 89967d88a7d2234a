use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::FetchError;
use crate::export::Record;

use super::accounts::{self, Account};
use super::client::Monarch;

pub const PORTFOLIO_COLUMNS: &[&str] = &[
    "account_id", "account", "ticker", "quantity", "price", "value", "cost",
];

const HOLDINGS_QUERY: &str = r#"
query Web_GetHoldings($input: PortfolioInput) {
  portfolio(input: $input) {
    aggregateHoldings {
      edges {
        node {
          id
          quantity
          basis
          totalValue
          security {
            id
            ticker
            currentPrice
          }
        }
      }
    }
  }
}"#;

#[derive(Deserialize)]
struct HoldingsData {
    portfolio: Portfolio,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Portfolio {
    aggregate_holdings: AggregateHoldings,
}

#[derive(Deserialize)]
struct AggregateHoldings {
    edges: Vec<HoldingEdge>,
}

#[derive(Deserialize)]
struct HoldingEdge {
    node: HoldingNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoldingNode {
    quantity: Decimal,
    basis: Option<Decimal>,
    total_value: Option<Decimal>,
    security: Option<Security>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Security {
    ticker: Option<String>,
    current_price: Option<Decimal>,
}

/// A row of the portfolio report.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub account_id: String,
    pub account: String,
    pub ticker: Option<String>,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub value: Option<Decimal>,
    pub cost: Option<Decimal>,
}

impl Holding {
    pub fn record(&self) -> Record {
        fn render(value: &Option<Decimal>) -> String {
            value.map(|value| value.to_string()).unwrap_or_default()
        }
        Record::new()
            .with("account_id", self.account_id.as_str())
            .with("account", self.account.as_str())
            .with("ticker", self.ticker.as_deref().unwrap_or(""))
            .with("quantity", self.quantity.to_string())
            .with("price", render(&self.price))
            .with("value", render(&self.value))
            .with("cost", render(&self.cost))
    }
}

/// Aggregate holdings across all investment accounts. Lists accounts
/// itself, so the portfolio report does not depend on the balances report
/// having run, then queries holdings account by account. The holdings
/// payload carries no account names, those are carried over from the
/// account listing.
pub async fn fetch_portfolio(client: &mut Monarch) -> Result<Vec<Holding>, FetchError> {
    log::info!("Requesting portfolio...");
    let accounts = accounts::list_accounts(client).await?;
    let mut holdings = Vec::new();
    for account in accounts {
        if account.holdings_count <= 0 {
            continue;
        }
        holdings.extend(fetch_account_holdings(client, &account).await?);
    }
    log::info!("Requesting portfolio...done");
    Ok(holdings)
}

async fn fetch_account_holdings(
    client: &mut Monarch,
    account: &Account,
) -> Result<Vec<Holding>, FetchError> {
    let data: HoldingsData = client
        .graphql(
            "Web_GetHoldings",
            HOLDINGS_QUERY,
            serde_json::json!({"input": {"accountIds": [account.id.as_str()]}}),
        )
        .await?;
    Ok(data
        .portfolio
        .aggregate_holdings
        .edges
        .into_iter()
        .map(|edge| {
            let node = edge.node;
            Holding {
                account_id: account.id.clone(),
                account: account.display_name.clone(),
                ticker: node
                    .security
                    .as_ref()
                    .and_then(|security| security.ticker.clone()),
                quantity: node.quantity,
                price: node
                    .security
                    .as_ref()
                    .and_then(|security| security.current_price),
                value: node.total_value,
                cost: node.basis,
            }
        })
        .collect())
}

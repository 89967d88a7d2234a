use chrono::{Duration, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::FetchError;
use crate::export::Record;

use super::client::Monarch;

pub const BALANCE_HISTORY_COLUMNS: &[&str] = &["account_id", "date", "balance"];

/// How far back the daily balance series reaches.
const HISTORY_DAYS: i64 = 31;

const RECENT_BALANCES_QUERY: &str = r#"
query GetAccountRecentBalances($startDate: Date) {
  accounts {
    id
    recentBalances(startDate: $startDate)
  }
}"#;

#[derive(Deserialize)]
struct RecentBalancesData {
    accounts: Vec<AccountRecentBalances>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecentBalances {
    id: String,
    #[serde(default)]
    recent_balances: Vec<Option<Decimal>>,
}

/// One (account, day, balance) point of the history report.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancePoint {
    pub account_id: String,
    pub date: NaiveDate,
    pub balance: Decimal,
}

impl BalancePoint {
    pub fn record(&self) -> Record {
        Record::new()
            .with("account_id", self.account_id.as_str())
            .with("date", self.date.to_string())
            .with("balance", self.balance.to_string())
    }
}

/// Daily balances per account for the trailing window.
pub async fn fetch_balance_history(client: &mut Monarch) -> Result<Vec<BalancePoint>, FetchError> {
    let start = Local::now().date_naive() - Duration::days(HISTORY_DAYS);
    fetch_balance_history_from(client, start).await
}

/// The service sends one value per day starting at the requested date.
/// Days without a recorded balance come back as null and are skipped.
pub(crate) async fn fetch_balance_history_from(
    client: &mut Monarch,
    start: NaiveDate,
) -> Result<Vec<BalancePoint>, FetchError> {
    log::info!("Requesting balance history...");
    let data: RecentBalancesData = client
        .graphql(
            "GetAccountRecentBalances",
            RECENT_BALANCES_QUERY,
            serde_json::json!({"startDate": start.to_string()}),
        )
        .await?;
    log::info!("Requesting balance history...done");

    let mut points = Vec::new();
    for account in data.accounts {
        for (offset, balance) in account.recent_balances.into_iter().enumerate() {
            let Some(balance) = balance else {
                continue;
            };
            points.push(BalancePoint {
                account_id: account.id.clone(),
                date: start + Duration::days(offset as i64),
                balance,
            });
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use serde_json::json;

    use super::*;
    use crate::monarch_api::mock::{MockServer, Response};
    use crate::monarch_api::Credentials;

    fn client_for(server: &MockServer) -> Monarch {
        Monarch::with_base_url(
            Credentials {
                username: "a@b.com".to_string(),
                password: "hunter2".to_string(),
                mfa_token: None,
            },
            server.url(),
            StdDuration::from_secs(5),
            StdDuration::ZERO,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn dates_count_forward_from_the_window_start() {
        let server = MockServer::start(vec![Response::json(
            200,
            json!({"data": {"accounts": [
                {"id": "1001", "recentBalances": [1800.25, null, 1811.71]},
                {"id": "1002", "recentBalances": [44000.1]}
            ]}}),
        )])
        .await;
        let mut client = client_for(&server);
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let points = fetch_balance_history_from(&mut client, start).await.unwrap();

        assert_eq!(3, points.len());
        assert_eq!("1001", points[0].account_id);
        assert_eq!(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), points[0].date);
        // The null day is skipped but still advances the date.
        assert_eq!(NaiveDate::from_ymd_opt(2026, 1, 3).unwrap(), points[1].date);
        assert_eq!("1811.71".parse::<Decimal>().unwrap(), points[1].balance);
        assert_eq!("1002", points[2].account_id);

        let record = points[0].record();
        assert_eq!(Some("2026-01-01"), record.get("date"));
        assert_eq!(Some("1800.25"), record.get("balance"));
    }

    #[tokio::test]
    async fn accounts_without_history_produce_no_points() {
        let server = MockServer::start(vec![Response::json(
            200,
            json!({"data": {"accounts": [
                {"id": "1001", "recentBalances": []}
            ]}}),
        )])
        .await;
        let mut client = client_for(&server);
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let points = fetch_balance_history_from(&mut client, start).await.unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn record_columns_match_the_report_baseline() {
        let point = BalancePoint {
            account_id: "1001".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            balance: "1800.25".parse().unwrap(),
        };
        assert_eq!(
            BALANCE_HISTORY_COLUMNS.to_vec(),
            point.record().columns().collect::<Vec<_>>()
        );
    }
}

use std::path::PathBuf;
use std::time::Duration;

use console::{style, StyledObject};

use crate::args::Args;
use crate::error::{AuthError, ConfigError, FetchError, ReportError, RunError};
use crate::export::{self, Record};
use crate::monarch_api::{self, Credentials, Monarch};
use crate::report::{ReportKind, ReportTarget};
use crate::terminal::{self, BulletPointPrinter, LineWriter};

pub const EXIT_AUTH_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_REPORT_FAILURE: u8 = 2;

/// Outcome of one requested report: rows written, or why it failed.
pub struct ReportOutcome {
    pub kind: ReportKind,
    pub path: PathBuf,
    pub result: Result<usize, ReportError>,
}

/// Per-report outcomes of a whole run, in run order.
pub struct RunSummary {
    outcomes: Vec<ReportOutcome>,
}

impl RunSummary {
    pub fn outcomes(&self) -> &[ReportOutcome] {
        &self.outcomes
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }
}

pub async fn run(args: Args) -> Result<RunSummary, RunError> {
    run_against(args, monarch_api::BASE_URL, monarch_api::RETRY_DELAY).await
}

async fn run_against(
    args: Args,
    base_url: &str,
    retry_delay: Duration,
) -> Result<RunSummary, RunError> {
    let targets = args.report_targets();
    if targets.is_empty() {
        log::warn!("no report paths given, nothing to do");
        return Ok(RunSummary {
            outcomes: Vec::new(),
        });
    }
    let credentials = credentials(&args)?;
    let mut session = Monarch::with_base_url(
        credentials,
        base_url,
        args.request_timeout(),
        retry_delay,
    )?;
    authenticate(&mut session).await?;

    // A failed report never takes its siblings down with it.
    let mut outcomes = Vec::new();
    for target in targets {
        let result = run_report(&mut session, &target).await;
        if let Err(err) = &result {
            log::error!("{} report failed: {err}", target.kind);
        }
        outcomes.push(ReportOutcome {
            kind: target.kind,
            path: target.path,
            result,
        });
    }
    let summary = RunSummary { outcomes };
    print_summary(&summary);
    Ok(summary)
}

fn credentials(args: &Args) -> Result<Credentials, ConfigError> {
    if args.username.trim().is_empty() {
        return Err(ConfigError::EmptyArgument { flag: "--username" });
    }
    if args.password.is_empty() {
        return Err(ConfigError::EmptyArgument { flag: "--password" });
    }
    Ok(Credentials {
        username: args.username.clone(),
        password: args.password.clone(),
        mfa_token: args.token.clone().filter(|token| !token.is_empty()),
    })
}

/// Log in once. When the service demands a multi-factor code, none was
/// given on the command line and someone is at the terminal, ask for the
/// code and try again.
async fn authenticate(session: &mut Monarch) -> Result<(), RunError> {
    match session.login().await {
        Ok(()) => Ok(()),
        Err(AuthError::MfaRequired) if console::user_attended() => {
            let code = terminal::prompt("Multi-factor code")
                .map_err(|source| RunError::Auth(AuthError::Prompt(source)))?;
            session.set_mfa_token(code);
            session.login().await.map_err(RunError::Auth)
        }
        Err(err) => Err(RunError::Auth(err)),
    }
}

async fn run_report(session: &mut Monarch, target: &ReportTarget) -> Result<usize, ReportError> {
    let records = fetch_records(session, target.kind).await?;
    export::write_records(&target.path, target.kind.columns(), &records).map_err(|source| {
        ReportError::Write {
            path: target.path.clone(),
            source,
        }
    })?;
    Ok(records.len())
}

async fn fetch_records(session: &mut Monarch, kind: ReportKind) -> Result<Vec<Record>, FetchError> {
    let records = match kind {
        ReportKind::Balances => monarch_api::fetch_balances(session)
            .await?
            .iter()
            .map(|row| row.record())
            .collect(),
        ReportKind::Transactions => monarch_api::fetch_transactions(session)
            .await?
            .iter()
            .map(|row| row.record())
            .collect(),
        ReportKind::BalancesHistory => monarch_api::fetch_balance_history(session)
            .await?
            .iter()
            .map(|row| row.record())
            .collect(),
        ReportKind::Portfolio => monarch_api::fetch_portfolio(session)
            .await?
            .iter()
            .map(|row| row.record())
            .collect(),
    };
    Ok(records)
}

fn print_summary(summary: &RunSummary) {
    println!("{}", style_header("Reports:"));
    let printer = BulletPointPrinter::new_stdout();
    for outcome in summary.outcomes() {
        print_outcome(&printer, outcome);
    }
}

fn print_outcome<W: LineWriter + Clone>(printer: &BulletPointPrinter<W>, outcome: &ReportOutcome) {
    match &outcome.result {
        Ok(rows) => printer.print_item(format!(
            "{}: {} {} ({rows} rows)",
            style_kind(outcome.kind),
            style("written to").green(),
            outcome.path.display(),
        )),
        Err(err) => {
            printer.print_item(format!(
                "{}: {}",
                style_kind(outcome.kind),
                style("failed").red().bold(),
            ));
            printer.indent().print_item(err);
        }
    }
}

/// Map the run result to the documented process exit code.
pub fn exit_code(result: &Result<RunSummary, RunError>) -> u8 {
    match result {
        Ok(summary) if summary.all_succeeded() => 0,
        Ok(_) => EXIT_REPORT_FAILURE,
        Err(RunError::Config(_)) => EXIT_CONFIG_ERROR,
        Err(RunError::Auth(_)) => EXIT_AUTH_FAILURE,
    }
}

fn style_header(header: &str) -> StyledObject<&str> {
    style(header).bold().underlined()
}

fn style_kind(kind: ReportKind) -> StyledObject<&'static str> {
    style(kind.name()).cyan()
}

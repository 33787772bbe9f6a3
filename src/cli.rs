//! CLI definition and dispatch.

use chrono::{Local, NaiveTime};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    validate_data_config, validate_formula_config, validate_limit_config, DataSettings,
    DEFAULT_MAX_MOVE,
};
use crate::domain::error::FormulaError;
use crate::domain::formula::Expr;
use crate::domain::formula_eval::{evaluate, EvalContext, Value};
use crate::domain::formula_parser;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::operator::limit_price::{limit_down, limit_up};
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "samformula", about = "Market-data formula evaluator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a formula over bars loaded from CSV
    Eval {
        #[arg(short, long)]
        config: PathBuf,
        /// Formula text; defaults to [formula] expr
        #[arg(short, long)]
        formula: Option<String>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        exchange: Option<String>,
        /// Session time for FROMOPEN (HH:MM); defaults to the local clock
        #[arg(long, value_parser = parse_session_time)]
        at: Option<NaiveTime>,
    },
    /// Parse a formula and print its operator tree
    Validate {
        #[arg(short, long)]
        formula: String,
    },
    /// Print limit-up and limit-down prices for a close
    Limit {
        #[arg(long)]
        close: f64,
        #[arg(long)]
        max_move: Option<f64>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn parse_session_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{}', expected HH:MM", s))
}

/// Installs the stderr subscriber; `RUST_LOG` overrides the `info` default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing();
    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Parse errors were already shown with their caret context.
            if !matches!(err, FormulaError::Parse(_)) {
                eprintln!("error: {err}");
            }
            (&err).into()
        }
    }
}

pub fn execute(command: Command) -> Result<(), FormulaError> {
    match command {
        Command::Eval {
            config,
            formula,
            code,
            exchange,
            at,
        } => run_eval(
            &config,
            formula.as_deref(),
            code.as_deref(),
            exchange.as_deref(),
            at,
        ),
        Command::Validate { formula } => run_validate(&formula),
        Command::Limit {
            close,
            max_move,
            config,
        } => run_limit(close, max_move, config.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, FormulaError> {
    debug!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Parse, printing the input with a caret under the error on failure.
pub fn parse_formula(formula: &str) -> Result<Expr, FormulaError> {
    formula_parser::parse(formula).map_err(|e| {
        eprintln!("error: {}", e.display_with_context(formula));
        FormulaError::Parse(e)
    })
}

pub fn evaluate_formula(
    formula: &str,
    bars: &[OhlcvBar],
    at: Option<NaiveTime>,
) -> Result<Value, FormulaError> {
    let expr = parse_formula(formula)?;
    let mut ctx = EvalContext::new(bars);
    if let Some(time) = at {
        ctx = ctx.with_session_time(time);
    }
    evaluate(&expr, &ctx)
}

/// `date,value` rows, aligned so the last value lands on the last bar.
/// Returns the number of rows written.
pub fn write_series<W: Write>(
    out: W,
    bars: &[OhlcvBar],
    value: &Value,
) -> Result<usize, FormulaError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["date", "value"]).map_err(io::Error::other)?;

    let numbers = value.numbers();
    let rows = numbers.len().min(bars.len());
    let dated = &bars[bars.len() - rows..];
    let values = &numbers[numbers.len() - rows..];

    for (bar, v) in dated.iter().zip(values) {
        writer
            .write_record([bar.date.format("%Y-%m-%d").to_string(), v.to_string()])
            .map_err(io::Error::other)?;
    }
    writer.flush()?;
    Ok(rows)
}

/// Load, evaluate and write: everything after config resolution.
pub fn run_eval_pipeline(
    data: &dyn DataPort,
    settings: &DataSettings,
    formula: &str,
    at: Option<NaiveTime>,
    out: &mut dyn Write,
) -> Result<usize, FormulaError> {
    let bars = data.fetch_ohlcv(
        &settings.code,
        &settings.exchange,
        settings.start_date,
        settings.end_date,
    )?;
    if bars.is_empty() {
        return Err(FormulaError::Data {
            reason: format!(
                "no bars for {}.{} in the configured range",
                settings.code, settings.exchange
            ),
        });
    }
    info!(
        code = %settings.code,
        exchange = %settings.exchange,
        bars = bars.len(),
        formula,
        "evaluating"
    );

    let value = evaluate_formula(formula, &bars, at)?;
    let rows = write_series(out, &bars, &value)?;
    info!(rows, "done");
    Ok(rows)
}

fn run_eval(
    config_path: &Path,
    formula_override: Option<&str>,
    code_override: Option<&str>,
    exchange_override: Option<&str>,
    at: Option<NaiveTime>,
) -> Result<(), FormulaError> {
    let config = load_config(config_path)?;
    let settings = validate_data_config(&config, code_override, exchange_override)?;
    let formula = validate_formula_config(&config, formula_override)?;
    let at = at.unwrap_or_else(|| Local::now().time());

    let adapter = CsvAdapter::new(settings.path.clone());
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    run_eval_pipeline(&adapter, &settings, &formula, Some(at), &mut handle)?;
    Ok(())
}

fn run_validate(formula: &str) -> Result<(), FormulaError> {
    let expr = parse_formula(formula)?;
    println!("{}", expr);
    print!("{}", expr.tree());
    eprintln!("\nFormula is valid.");
    Ok(())
}

/// CLI value, then `[limit] max_move`, then the default.
pub fn resolve_max_move(
    cli_value: Option<f64>,
    config_path: Option<&Path>,
) -> Result<f64, FormulaError> {
    match (cli_value, config_path) {
        (Some(v), _) => Ok(v),
        (None, Some(path)) => validate_limit_config(&load_config(path)?),
        (None, None) => Ok(DEFAULT_MAX_MOVE),
    }
}

fn run_limit(close: f64, max_move: Option<f64>, config_path: Option<&Path>) -> Result<(), FormulaError> {
    let max_move = resolve_max_move(max_move, config_path)?;
    let up = limit_up(close, max_move)?;
    let down = limit_down(close, max_move)?;
    println!("limit_up,{:.2}", up);
    println!("limit_down,{:.2}", down);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_time_formats() {
        assert_eq!(
            parse_session_time("10:15").unwrap(),
            NaiveTime::from_hms_opt(10, 15, 0).unwrap()
        );
        assert_eq!(
            parse_session_time("13:05:30").unwrap(),
            NaiveTime::from_hms_opt(13, 5, 30).unwrap()
        );
        assert!(parse_session_time("late").is_err());
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::parse_from([
            "samformula",
            "eval",
            "-c",
            "cfg.ini",
            "--formula",
            "C > O",
            "--at",
            "09:45",
        ]);
        match cli.command {
            Command::Eval {
                config, formula, at, code, ..
            } => {
                assert_eq!(config, PathBuf::from("cfg.ini"));
                assert_eq!(formula.as_deref(), Some("C > O"));
                assert_eq!(at, NaiveTime::from_hms_opt(9, 45, 0));
                assert_eq!(code, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::parse_from(["samformula", "limit", "--close", "9.99", "--max-move", "0.2"]);
        assert!(matches!(
            cli.command,
            Command::Limit { close, max_move: Some(m), config: None } if close == 9.99 && m == 0.2
        ));
    }

    #[test]
    fn max_move_resolution_order() {
        assert_eq!(resolve_max_move(Some(0.05), None).unwrap(), 0.05);
        assert_eq!(resolve_max_move(None, None).unwrap(), DEFAULT_MAX_MOVE);
        assert!(matches!(
            resolve_max_move(None, Some(Path::new("/nonexistent/limit.ini"))),
            Err(FormulaError::ConfigParse { .. })
        ));
    }
}

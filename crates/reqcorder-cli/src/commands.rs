use std::fs;
use std::io::{self, IsTerminal, Write};

use anyhow::Context;
use colored::Colorize;
use reqcorder_diff::{diff_artifacts, DiffMode};
use reqcorder_exec::{resolve, ExecError, Execution, HttpExecutor, RequestExecutor};
use reqcorder_history::{status_glyph, History, ResponseFilter};
use reqcorder_store::{RecordReceipt, RecordStore};
use reqcorder_types::codec::canonicalize_template;
use reqcorder_types::Response;
use tracing::{debug, error};

use crate::cli::*;
use crate::config::{self, Config};
use crate::exit::UsageError;
use crate::logging;
use crate::render::{
    format_duration, format_timestamp, preview, pretty_body, table, IMPORTANT_HEADERS,
};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let home = config::resolve_home(std::env::var(config::HOME_ENV).ok())?;
    let config = Config::load(&home)?;
    let paths = config.paths(&home);
    let level = logging::resolve_log_level(config.logging.level.as_deref())?;
    logging::init(level, &paths.log_file, cli.verbose)?;
    debug!(home = %paths.home.display(), store = %paths.store_dir.display(), "starting reqcorder");

    let store = RecordStore::open(&paths.store_dir);
    store.init()?;

    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut out = stdout.lock();
    match cli.command {
        Command::Exec(args) => cmd_exec(&mut out, &store, &HttpExecutor::new(), &args).await,
        Command::Show(args) => cmd_show(&mut out, &store, &args),
        Command::List(args) => cmd_list(&mut out, &store, &args, config.list.default_limit),
        Command::Diff(args) => cmd_diff(&mut out, &store, &args, color),
        Command::Version => {
            writeln!(out, "ReqCorder version {}", env!("CARGO_PKG_VERSION"))?;
            Ok(())
        }
    }
}

fn row(property: &str, value: impl Into<String>) -> Vec<String> {
    vec![property.to_string(), value.into()]
}

fn write_receipt<W: Write>(out: &mut W, lead: &str, receipt: &RecordReceipt) -> io::Result<()> {
    writeln!(
        out,
        "{lead}Response ID - {}\nRequest hash - {}\nTemplate hash - {}\n",
        receipt.response_id, receipt.request_hash, receipt.template_hash
    )
}

fn response_rows(response: &Response) -> Vec<Vec<String>> {
    let timing = &response.timing;
    let mut rows = vec![
        row(
            "HTTP Status Code",
            format!("{} {}", response.status_code, status_glyph(response.status_code)),
        ),
        row("Body preview", preview(&response.body)),
        row("Size (Bytes)", response.size_bytes.to_string()),
        row("DNS lookup time", format_duration(timing.dns_lookup)),
        row("TCP connection time", format_duration(timing.tcp_connect)),
        row("TLS handshake time", format_duration(timing.tls_handshake)),
        row("Time to first byte", format_duration(timing.time_to_first_byte)),
        row("Total time taken ⏳", format_duration(timing.total_duration)),
    ];
    for name in IMPORTANT_HEADERS {
        if let Some(value) = response.headers.get(*name).filter(|v| !v.is_empty()) {
            rows.push(row(&format!("{name} header"), value.clone()));
        }
    }
    rows
}

pub async fn cmd_exec<W: Write>(
    out: &mut W,
    store: &RecordStore,
    executor: &dyn RequestExecutor,
    args: &ExecArgs,
) -> anyhow::Result<()> {
    let path = &args.template;
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read template {}", path.display()))?;
    let (template, _) = canonicalize_template(&raw)?;
    let request = resolve(&template)?;
    let full = !args.quiet && !args.min;

    if full {
        writeln!(out, "Request Table:")?;
        table(
            out,
            &["Property", "Value"],
            &[
                row("URL", request.url.as_str()),
                row("Method", request.method.as_str()),
                row("Body preview", preview(&request.body)),
                row("Authorization header", request.auth.as_str()),
                row("Timeout", format_duration(request.timeout_duration())),
            ],
        )?;
        write!(out, "Performing request... ")?;
        out.flush()?;
    }

    let response = match executor.execute(&request).await? {
        Execution::Completed(response) => response,
        Execution::Failed { response, error } => {
            match store.record(&template, &request, &response) {
                Ok(receipt) if !args.quiet => write_receipt(out, "\n", &receipt)?,
                Ok(_) => {}
                Err(e) => error!(error = %e, "failed request could not be recorded"),
            }
            return Err(ExecError::RequestFailed(error).into());
        }
    };

    if full {
        writeln!(
            out,
            "Request complete (Time taken {})\n",
            format_duration(response.timing.total_duration)
        )?;
        writeln!(out, "Response Table:")?;
        table(out, &["Property", "Value"], &response_rows(&response))?;
        writeln!(out, "Response Body:")?;
    }
    if !args.quiet {
        writeln!(out, "{}\n", pretty_body(&response.body))?;
    }
    if full {
        write!(out, "Recording to store... ")?;
    }

    let receipt = store.record(&template, &request, &response)?;
    if !args.quiet {
        write_receipt(out, "Done \n", &receipt)?;
    }
    debug!(response_id = %receipt.response_id, "exec completed");
    Ok(())
}

pub fn cmd_show<W: Write>(out: &mut W, store: &RecordStore, args: &ShowArgs) -> anyhow::Result<()> {
    let history = History::new(store);
    let text = match (&args.template, &args.request, &args.response) {
        (Some(hash), _, _) => history.show_template(hash)?,
        (_, Some(hash), _) => history.show_request(hash)?,
        (_, _, Some(id)) => history.show_response(id)?,
        _ => return Err(UsageError("invalid show type".into()).into()),
    };
    write!(out, "{text}")?;
    Ok(())
}

pub fn cmd_list<W: Write>(
    out: &mut W,
    store: &RecordStore,
    args: &ListArgs,
    default_limit: usize,
) -> anyhow::Result<()> {
    let limit = args.limit.unwrap_or(default_limit);
    let history = History::new(store);

    match args.kind {
        KindArg::Responses => {
            let filter = match (&args.request, &args.template) {
                (Some(hash), _) => ResponseFilter::Request(hash.clone()),
                (None, Some(hash)) => ResponseFilter::Template(hash.clone()),
                (None, None) => ResponseFilter::All,
            };
            let rows: Vec<Vec<String>> = history
                .responses(&filter, limit)?
                .into_iter()
                .map(|r| {
                    vec![
                        r.response_id.clone(),
                        format!("{} {}", r.status_code, r.glyph()),
                        format_duration(r.total_duration),
                        format_timestamp(r.timestamp),
                    ]
                })
                .collect();
            writeln!(out, "{}", format!("Response History ({} responses)", rows.len()).bold())?;
            table(out, &["Response ID", "Status Code", "Total Time", "Timestamp"], &rows)?;
        }
        KindArg::Requests => {
            if args.request.is_some() {
                return Err(UsageError("requests can only be filtered by template".into()).into());
            }
            let rows: Vec<Vec<String>> = history
                .requests(args.template.as_deref(), limit)?
                .into_iter()
                .map(|r| vec![r.request_hash, r.template_hash, format_timestamp(r.modified)])
                .collect();
            writeln!(out, "{}", format!("Request History ({} requests)", rows.len()).bold())?;
            table(out, &["Request Hash", "Template Hash", "Last Modified"], &rows)?;
        }
        KindArg::Templates => {
            if args.request.is_some() || args.template.is_some() {
                return Err(UsageError("templates cannot be filtered".into()).into());
            }
            let rows: Vec<Vec<String>> = history
                .templates(limit)?
                .into_iter()
                .map(|t| vec![t.template_hash, format_timestamp(t.modified)])
                .collect();
            writeln!(out, "{}", format!("Template History ({} templates)", rows.len()).bold())?;
            table(out, &["Template Hash", "Last Modified"], &rows)?;
        }
    }
    Ok(())
}

pub fn cmd_diff<W: Write>(
    out: &mut W,
    store: &RecordStore,
    args: &DiffArgs,
    color: bool,
) -> anyhow::Result<()> {
    let mode = if args.inline { DiffMode::Inline } else { DiffMode::Line };
    diff_artifacts(out, store, args.kind.into(), &args.source, &args.target, mode, color)?;
    Ok(())
}

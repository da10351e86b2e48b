//! Line-delimited JSON front end for the products service.
//!
//! Each stdin line is `{"cmd": <pattern>, "data": <payload>}`; each reply is
//! one stdout line, `{"ok": true, "data": ...}` or `{"ok": false, "error": ...}`.

use clap::Parser;
use log::info;
use products_core::db::open_db;
use products_core::{
    dispatch, init_logging, ProductStore, RpcError, ServiceConfig, SqliteProductRepository,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "products", version, about = "Serve product store messages over stdin/stdout")]
struct Cli {
    /// TOML configuration file, layered under `PRODUCTS_*` environment variables.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured database path.
    #[arg(long)]
    database: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Request {
    cmd: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Serialize)]
struct Reply {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

impl From<Result<Value, RpcError>> for Reply {
    fn from(value: Result<Value, RpcError>) -> Self {
        match value {
            Ok(data) => Self {
                ok: true,
                data: Some(data),
                error: None,
            },
            Err(error) => Self {
                ok: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("products: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mut config = ServiceConfig::load(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        config.database_path = database.clone();
    }

    init_logging(&config.log_level, config.log_target())?;
    let conn = open_db(&config.database_path)?;
    let store = ProductStore::new(SqliteProductRepository::try_new(&conn)?);
    info!(
        "event=service_ready module=cli status=ok database={}",
        config.database_path.display()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(&store, stdin.lock(), stdout.lock())?;

    info!("event=service_stop module=cli status=ok");
    Ok(())
}

fn serve(
    store: &ProductStore<'_>,
    mut input: impl BufRead,
    mut output: impl Write,
) -> io::Result<()> {
    let mut line = Vec::new();
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }
        if line.trim_ascii().is_empty() {
            continue;
        }

        let reply = Reply::from(handle_line(store, &line));
        serde_json::to_writer(&mut output, &reply)?;
        output.write_all(b"\n")?;
        output.flush()?;
    }
}

fn handle_line(store: &ProductStore<'_>, line: &[u8]) -> Result<Value, RpcError> {
    let line = std::str::from_utf8(line)
        .map_err(|err| RpcError::bad_request(format!("request line is not UTF-8: {err}")))?;
    let request: Request = serde_json::from_str(line)
        .map_err(|err| RpcError::bad_request(format!("invalid request line: {err}")))?;
    dispatch(store, &request.cmd, request.data)
}

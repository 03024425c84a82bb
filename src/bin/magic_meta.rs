//! Generates the spell action parameter catalog.
//!
//! Interrogates the built-in base layers and every action in the requested
//! namespace, then writes the catalog JSON to OUTPUT (or stdout for `-`).
//! `MAGIC_META_ACTIONS` / `--actions` restrict the scan to specific action
//! keys; `MAGIC_META_LOG` sets the log filter.

use anyhow::{Context, Result, anyhow, bail};
use magic_meta::{builtin, generate_catalog, parse_action_selection};
use std::collections::BTreeSet;
use std::env;
use std::io::Write;
use std::path::{self, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "MAGIC_META_LOG";
const ACTIONS_ENV: &str = "MAGIC_META_ACTIONS";
const DEFAULT_LOG_FILTER: &str = "magic_meta=info";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse()?;
    setup_tracing();

    let only = cli.actions.or_else(|| {
        env::var(ACTIONS_ENV)
            .ok()
            .and_then(|raw| parse_action_selection(&raw))
    });
    let registry = builtin::registry();
    let plan = builtin::plan(cli.namespace, only);
    let (catalog, report) = generate_catalog(&registry, plan)?;

    info!("{}", report.summary());
    for failure in &report.failed {
        warn!(class = failure.class(), phase = %failure.phase(), "action left out of the catalog");
    }

    match cli.output {
        Output::Stdout => {
            let rendered = catalog.to_pretty_json()?;
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("writing catalog to stdout")?;
            stdout.flush().context("flushing stdout")?;
        }
        Output::File(target) => {
            let display = path::absolute(&target).unwrap_or_else(|_| target.clone());
            println!("Writing metadata to {}", display.display());
            catalog.write_to_path(&target)?;
            println!("Done.");
        }
    }
    Ok(())
}

fn setup_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

enum Output {
    Stdout,
    File(PathBuf),
}

struct Cli {
    output: Output,
    namespace: String,
    actions: Option<BTreeSet<String>>,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args_os();
        let _program = args.next();
        let mut output = None;
        let mut namespace = builtin::NAMESPACE.to_string();
        let mut actions = None;

        while let Some(arg) = args.next() {
            let arg_str = arg
                .to_str()
                .ok_or_else(|| anyhow!("invalid UTF-8 in argument"))?;
            match arg_str {
                "--namespace" => {
                    namespace = normalize_token(next_value("--namespace", &mut args)?, "--namespace")?
                }
                "--actions" => {
                    let raw = next_value("--actions", &mut args)?;
                    actions = Some(
                        parse_action_selection(&raw)
                            .ok_or_else(|| anyhow!("--actions value must not be empty"))?,
                    );
                }
                "--help" | "-h" => usage(0),
                "-" if output.is_none() => output = Some(Output::Stdout),
                other if other.starts_with("--") => bail!("unknown argument: {other}"),
                other if output.is_none() => output = Some(Output::File(PathBuf::from(other))),
                other => bail!("unexpected extra argument: {other}"),
            }
        }

        let Some(output) = output else {
            usage(0);
        };
        Ok(Self {
            output,
            namespace,
            actions,
        })
    }
}

fn next_value(flag: &str, args: &mut env::ArgsOs) -> Result<String> {
    let value = args
        .next()
        .ok_or_else(|| anyhow!("{flag} requires a value"))?;
    value
        .into_string()
        .map_err(|_| anyhow!("{flag} value must be valid UTF-8"))
}

fn normalize_token(raw: String, flag: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("{flag} value must not be empty");
    }
    Ok(trimmed.to_string())
}

fn usage(code: i32) -> ! {
    println!(
        "Usage: magic-meta <OUTPUT> [options]\n\nWrites the spell action parameter catalog to OUTPUT ('-' for stdout).\n\nOptions:\n      --namespace <ns>  Action namespace to interrogate (default: builtin).\n      --actions <list>  Only interrogate these action keys (comma or space separated).\n      --help            Show this help text.\n\nEnvironment:\n  MAGIC_META_ACTIONS    Same as --actions when the flag is not given.\n  MAGIC_META_LOG        Log filter (default: magic_meta=info).\n"
    );
    std::process::exit(code);
}

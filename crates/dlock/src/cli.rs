//! `dlock` command line
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dlock exec --key orders --key 42 -- ./ship.sh` | Run a command while holding `dl:orders:42` |
//! | `dlock acquire --key orders --key 42` | Take the lock, print `<key> <token>` |
//! | `dlock release dl:orders:42 --token <token>` | Release a lock taken with `acquire` |
//! | `dlock providers` | List registered lock stores |
//!
//! Lock options default to the `[lock]` section of the configuration; the
//! flags below override them per invocation.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dlock_application::ports::registry::list_lock_store_providers;
use dlock_application::use_cases::LockOptions;
use dlock_domain::error::Error;
use dlock_domain::ports::ReleaseOutcome;
use dlock_domain::value_objects::{
    CallArgs, KeyPart, LockHandle, LockKey, OwnershipToken, SpinWaitStrategy, TimeUnit,
};
use dlock_infrastructure::config::{AppConfig, ConfigLoader};
use dlock_infrastructure::di::LockContext;
use serde_json::Value;
use tracing::debug;

/// Exit code when the lock could not be acquired (`EX_TEMPFAIL`)
pub const EXIT_NOT_ACQUIRED: u8 = 75;

/// Exit code when `release` found the lock held by someone else, or gone
pub const EXIT_NOT_OWNER: u8 = 1;

/// Command-line interface for dlock
#[derive(Parser, Debug)]
#[command(name = "dlock")]
#[command(version)]
#[command(about = "Distributed locks over a shared key-value store")]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options available to all commands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Lock store provider (overrides `store.provider`)
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Lock store URI (overrides `store.uri`)
    #[arg(long, global = true)]
    pub uri: Option<String>,
}

impl GlobalOptions {
    /// Load the configuration and apply the store overrides
    pub fn load_config(&self) -> dlock_domain::Result<AppConfig> {
        let mut loader = ConfigLoader::new();
        if let Some(path) = &self.config {
            loader = loader.with_config_path(path);
        }
        let mut config = loader.load()?;

        if let Some(store) = &self.store {
            config.store.provider.clone_from(store);
        }
        if let Some(uri) = &self.uri {
            config.store.uri = Some(uri.clone());
        }
        Ok(config)
    }
}

/// dlock commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a command while holding a lock.
    ///
    /// The lock is released when the command exits, whatever its status.
    /// Exits with the command's status, or 75 if the lock was not acquired.
    Exec(ExecArgs),

    /// Acquire a lock and print its key and ownership token.
    ///
    /// The lock stays held until `release` or lease expiry.
    Acquire(LockArgs),

    /// Release a lock taken with `acquire`.
    Release(ReleaseArgs),

    /// List registered lock store providers.
    Providers,
}

/// Key and timing options shared by `exec` and `acquire`
#[derive(Args, Debug, Clone, Default)]
pub struct LockArgs {
    /// Key part; repeat to build `<prefix>:<part>:<part>`.
    #[arg(short, long = "key", required = true)]
    pub keys: Vec<String>,

    /// Key prefix; an empty prefix is omitted from the key.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Lease, in --unit.
    #[arg(long)]
    pub expire: Option<u64>,

    /// Wait budget, in --unit (0 = single attempt).
    #[arg(long)]
    pub wait: Option<u64>,

    /// Unit of --expire and --wait (ms, s, min, ...).
    #[arg(long)]
    pub unit: Option<TimeUnit>,

    /// Spin-wait base interval in milliseconds.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Spin-wait strategy: fixed, linear or exponential.
    #[arg(long)]
    pub strategy: Option<SpinWaitStrategy>,

    /// Maximum store round trips while waiting (0 = deadline only).
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

impl LockArgs {
    /// `defaults` with these overrides and one tagged key part per `--key`
    pub fn options(&self, defaults: LockOptions) -> LockOptions {
        let mut options = defaults;
        options.key.parts = (0..self.keys.len())
            .map(|i| KeyPart::argument(key_arg_name(i)))
            .collect();

        if let Some(prefix) = &self.prefix {
            options.key.prefix.clone_from(prefix);
        }
        if let Some(expire) = self.expire {
            options.expire_time = expire;
        }
        if let Some(wait) = self.wait {
            options.wait_time = wait;
        }
        if let Some(unit) = self.unit {
            options.time_unit = unit;
        }
        if let Some(interval) = self.interval {
            options.spin.interval = interval;
            options.spin.time_unit = TimeUnit::Milliseconds;
        }
        if let Some(strategy) = self.strategy {
            options.spin.strategy = strategy;
        }
        if let Some(max_attempts) = self.max_attempts {
            options.spin.max_attempts = max_attempts;
        }
        options
    }

    /// The `--key` values as call arguments, in order
    pub fn call_args(&self) -> CallArgs {
        self.keys
            .iter()
            .enumerate()
            .fold(CallArgs::new(), |args, (i, part)| {
                args.with_value(key_arg_name(i), Value::String(part.clone()))
            })
    }
}

fn key_arg_name(index: usize) -> String {
    format!("key{index}")
}

#[derive(Args, Debug, Clone)]
pub struct ExecArgs {
    #[command(flatten)]
    pub lock: LockArgs,

    /// Command to run, after `--`.
    #[arg(last = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ReleaseArgs {
    /// Full lock key, as printed by `acquire`.
    pub key: String,

    /// Ownership token, as printed by `acquire`.
    #[arg(long)]
    pub token: String,
}

impl Command {
    /// Run the command against `context`, writing results to `out`
    ///
    /// # Returns
    /// The process exit code.
    pub async fn execute<W: Write>(&self, context: &LockContext, out: &mut W) -> Result<u8> {
        match self {
            Self::Exec(args) => exec(context, args).await,
            Self::Acquire(args) => acquire(context, args, out).await,
            Self::Release(args) => release(context, args, out).await,
            Self::Providers => providers(out),
        }
    }
}

async fn exec(context: &LockContext, args: &ExecArgs) -> Result<u8> {
    let (program, rest) = args
        .command
        .split_first()
        .context("no command given after --")?;
    let options = args.lock.options(context.options());
    let call_args = args.lock.call_args();

    let outcome = context
        .interceptor()
        .run_locked(&options, &call_args, move || async move {
            tokio::process::Command::new(program)
                .args(rest)
                .status()
                .await
        })
        .await;

    let status = match outcome {
        Ok(status) => status.with_context(|| format!("failed to run '{program}'"))?,
        Err(e @ Error::LockNotAcquired { .. }) => {
            eprintln!("dlock: {e}");
            return Ok(EXIT_NOT_ACQUIRED);
        }
        Err(e) => return Err(e.into()),
    };

    debug!(program = %program, status = %status, "command finished");
    // Killed by a signal when there is no code
    Ok(status
        .code()
        .map_or(1, |code| u8::try_from(code).unwrap_or(1)))
}

async fn acquire<W: Write>(context: &LockContext, args: &LockArgs, out: &mut W) -> Result<u8> {
    let options = args.options(context.options());
    let key = context
        .interceptor()
        .resolver()
        .resolve(&options.key, &args.call_args());

    match context.coordinator().try_lock_with(&key, &options).await? {
        Some(handle) => {
            writeln!(out, "{} {}", handle.key(), handle.token())?;
            Ok(0)
        }
        None => {
            eprintln!("dlock: {}", Error::lock_not_acquired(key.as_str()));
            Ok(EXIT_NOT_ACQUIRED)
        }
    }
}

async fn release<W: Write>(context: &LockContext, args: &ReleaseArgs, out: &mut W) -> Result<u8> {
    let handle = LockHandle::from_parts(
        LockKey::new(args.key.as_str()),
        OwnershipToken::new(args.token.as_str()),
    );

    match context.coordinator().unlock(&handle).await? {
        ReleaseOutcome::Released => {
            writeln!(out, "released {}", handle.key())?;
            Ok(0)
        }
        ReleaseOutcome::NotOwner => {
            writeln!(out, "not owner {}", handle.key())?;
            Ok(EXIT_NOT_OWNER)
        }
    }
}

fn providers<W: Write>(out: &mut W) -> Result<u8> {
    for (name, description) in list_lock_store_providers() {
        writeln!(out, "{name:<10} {description}")?;
    }
    Ok(0)
}

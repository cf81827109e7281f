//! setmig - settings migration and validation tool
//!
//! Migrates a device's legacy settings across a firmware reflash and verifies
//! the result. One run is a strictly sequential pipeline:
//!
//! 1. Read the legacy settings export, one snapshot per scope
//! 2. Seed the legacy provider authority over adb
//! 3. Reflash the device (bootloader, flash boot+system, reboot, wait)
//! 4. Query the migrated provider authority
//! 5. Positional diff per scope, report, exit code

mod config;

use anyhow::{Context, Result};
use config::ToolConfig;
use setmig_device::{Adb, CancelToken, Fastboot, ProviderStore, SystemRunner, UpdateDriver};
use setmig_settings::{Credential, GuardedStore, Scope, SettingsStore, import_set, read_scope};
use setmig_validate::{ValidationReport, validate};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{info, warn};

const ARGUMENT_SETTINGS: &str = "--settings";
const ARGUMENT_BOOT_IMG: &str = "--bootimg";
const ARGUMENT_SYSTEM_IMG: &str = "--systemimg";
const ARGUMENT_CONFIG: &str = "--config";
const ARGUMENT_PREFIX: &str = "--";

static CANCEL: OnceLock<CancelToken> = OnceLock::new();

fn main() {
    setup_logging();
    std::process::exit(run());
}

fn run() -> i32 {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match Args::parse(&argv) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            return -1;
        }
    };

    // Initialize the shared token before handlers can fire.
    let cancel = cancel_token();
    if let Err(e) = setup_signal_handlers() {
        warn!("Failed to install signal handlers: {}", e);
    }

    match migrate(&args, cancel) {
        Ok(true) => 0,
        Ok(false) => -1,
        Err(e) => {
            eprintln!("{e:#}");
            -1
        }
    }
}

/// Parsed command line.
#[derive(Debug, PartialEq, Eq)]
struct Args {
    settings: PathBuf,
    boot_image: PathBuf,
    system_image: PathBuf,
    config: Option<PathBuf>,
}

impl Args {
    fn parse(argv: &[String]) -> Result<Self, String> {
        if argv.is_empty() {
            return Err("Missing required arguments".to_string());
        }

        let mut settings = None;
        let mut boot_image = None;
        let mut system_image = None;
        let mut config = None;

        let mut iter = argv.iter();
        while let Some(argument) = iter.next() {
            match argument.as_str() {
                ARGUMENT_SETTINGS => settings = Some(value_required(argument, &mut iter)?),
                ARGUMENT_BOOT_IMG => boot_image = Some(value_required(argument, &mut iter)?),
                ARGUMENT_SYSTEM_IMG => system_image = Some(value_required(argument, &mut iter)?),
                ARGUMENT_CONFIG => config = Some(value_required(argument, &mut iter)?),
                other => return Err(format!("Unknown argument: {other}")),
            }
        }

        Ok(Self {
            settings: required(settings, ARGUMENT_SETTINGS)?.into(),
            boot_image: required(boot_image, ARGUMENT_BOOT_IMG)?.into(),
            system_image: required(system_image, ARGUMENT_SYSTEM_IMG)?.into(),
            config: config.map(PathBuf::from),
        })
    }
}

fn value_required(argument: &str, iter: &mut std::slice::Iter<'_, String>) -> Result<String, String> {
    match iter.next() {
        Some(value) if !value.is_empty() && !value.starts_with(ARGUMENT_PREFIX) => {
            Ok(value.clone())
        }
        _ => Err(format!("No value for argument: {argument}")),
    }
}

fn required(value: Option<String>, argument: &str) -> Result<String, String> {
    value.ok_or_else(|| format!("Missing required argument: {argument}"))
}

fn print_usage() {
    eprintln!(
        "Usage: setmig {ARGUMENT_SETTINGS} <export file> {ARGUMENT_BOOT_IMG} <image> \
         {ARGUMENT_SYSTEM_IMG} <image> [{ARGUMENT_CONFIG} <file>]"
    );
}

fn migrate(args: &Args, cancel: CancelToken) -> Result<bool> {
    let config = ToolConfig::load_or_default(args.config.as_deref())?;

    if !args.settings.exists() {
        anyhow::bail!("Invalid settings file provided: {}", args.settings.display());
    }

    // Legacy snapshots, one per scope.
    let mut legacy = Vec::with_capacity(Scope::ALL.len());
    for scope in Scope::ALL {
        let set = read_scope(&args.settings, scope)
            .with_context(|| format!("Failed to read legacy {scope} settings"))?;
        info!("Read {} legacy {} rows", set.len(), scope);
        legacy.push(set);
    }

    let runner = build_runner(&config);
    let adb = build_adb(&runner, &config);

    // Seed the legacy authority so the on-device migration has rows to move.
    let mut seed_store = GuardedStore::new(
        ProviderStore::new(adb.clone(), config.legacy_authority.clone()),
        Credential::read_write(),
    );
    for set in &legacy {
        let summary = import_set(&mut seed_store, set);
        if summary.failed() > 0 {
            warn!(
                "{} of {} {} rows failed to seed",
                summary.failed(),
                summary.total(),
                set.scope()
            );
        }
    }

    // Reflash and wait for the device to come back.
    let mut fastboot = Fastboot::new(runner.clone());
    if let Some(serial) = &config.serial {
        fastboot = fastboot.with_serial(serial.as_str());
    }
    let driver = UpdateDriver::new(adb.clone(), fastboot)
        .with_timeout(config.boot_timeout(), config.poll_interval())
        .with_cancel_token(cancel);
    driver
        .run(&args.boot_image, &args.system_image)
        .context("Device update failed")?;

    // Requery the migrated authority and validate each scope.
    let migrated_store = GuardedStore::new(
        ProviderStore::new(adb, config.migrated_authority.clone()),
        Credential::read_only(),
    );

    let mut all_passed = true;
    for set in legacy {
        let scope = set.scope();
        println!("\n\nValidating {scope}...");
        let actual = migrated_store
            .query(scope)
            .with_context(|| format!("Failed to query migrated {scope} settings"))?;
        let report = validate(set, actual);
        render_report(&report);
        if !report.passed() {
            all_passed = false;
        }
    }

    Ok(all_passed)
}

fn build_runner(config: &ToolConfig) -> SystemRunner {
    let mut runner = SystemRunner::new();
    if let Some(path) = &config.adb_path {
        runner = runner.with_override("adb", path);
    }
    if let Some(path) = &config.fastboot_path {
        runner = runner.with_override("fastboot", path);
    }
    runner
}

fn build_adb(runner: &SystemRunner, config: &ToolConfig) -> Adb<SystemRunner> {
    let mut adb = Adb::new(runner.clone());
    if let Some(serial) = &config.serial {
        adb = adb.with_serial(serial.as_str());
    }
    adb
}

/// Per-row trace on stdout; mismatch detail and size warnings on stderr.
fn render_report(report: &ValidationReport) {
    if let Some(warning) = &report.size_warning {
        eprintln!(
            "Warning: Size mismatch: legacy {} migrated {}",
            warning.expected, warning.actual
        );
    }

    for row in &report.rows {
        println!(
            "Comparing: legacy {} and migrated {}",
            row.expected_key, row.actual_key
        );
        if row.passed() {
            println!("...OK");
        } else {
            for mismatch in &row.mismatches {
                eprintln!("    {}", mismatch.describe());
            }
        }
    }
}

fn cancel_token() -> CancelToken {
    CANCEL.get_or_init(CancelToken::new).clone()
}

/// Setup logging to the console
fn setup_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

/// Setup signal handlers so a blocked device wait can be interrupted
fn setup_signal_handlers() -> Result<()> {
    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

    let action = SigAction::new(
        SigHandler::Handler(handle_signal),
        SaFlags::empty(),
        SigSet::empty(),
    );

    unsafe {
        sigaction(Signal::SIGINT, &action)?;
        sigaction(Signal::SIGTERM, &action)?;
    }

    Ok(())
}

/// Signal handler: flip the cancel flag, let the pipeline unwind.
extern "C" fn handle_signal(sig: i32) {
    match sig {
        libc::SIGINT | libc::SIGTERM => {
            if let Some(token) = CANCEL.get() {
                token.cancel();
            }
        }
        _ => {}
    }
}

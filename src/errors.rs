use std::panic;

use color_eyre::{
    Section, SectionExt,
    config::HookBuilder,
    eyre::{Report, Result},
};
use pda_bank::domain::error::Error;

use crate::logging::log_panic;

/// Install panic and error hooks.
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .panic_section(format!(
            "This is a bug. Consider reporting it at {}",
            env!("CARGO_PKG_REPOSITORY")
        ))
        .capture_span_trace_by_default(false)
        .display_location_section(true)
        .display_env_section(false)
        .into_hooks();

    // Log the panic before color-eyre renders it
    let panic_hook = panic_hook.into_panic_hook();
    panic::set_hook(Box::new(move |panic_info| {
        log_panic(panic_info);
        panic_hook(panic_info);
    }));

    eyre_hook.install()?;

    Ok(())
}

/// Turn a domain error into a report, with a hint on what the user can do.
pub fn into_report(err: Error) -> Report {
    let hint = match &err {
        Error::AlreadyExists(_) => Some("Each wallet owns one bank; use `address` to find it"),
        Error::InsufficientFunds { .. } => {
            Some("Only lamports above the reserve floor can be withdrawn; deposit first")
        }
        Error::NotOwner { .. } => Some("Only the wallet that created a bank can withdraw from it"),
        Error::WalletNotConnected | Error::Wallet(_) => {
            Some("Pass --keypair or set keypair_path in the config file")
        }
        Error::NetworkUnavailable(_) | Error::Timeout { .. } => {
            Some("The ledger did not respond in time; check --rpc-url and try again")
        }
        Error::SimulationFailed { .. } => {
            Some("The ledger rejected the transaction; see the program logs")
        }
        _ => None,
    };

    let logs = match &err {
        Error::SimulationFailed { logs, .. } => logs.join("\n"),
        _ => String::new(),
    };

    let mut report = Report::new(err);
    if !logs.is_empty() {
        report = report.section(logs.header("Program logs:"));
    }
    match hint {
        Some(hint) => report.suggestion(hint),
        None => report,
    }
}

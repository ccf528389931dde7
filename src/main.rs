//=========================================================================
// Space Trucker: Desktop Entry Point
//
// Installs the console logger, opens the platform once and runs
// application instances on it until the window is closed. Exiting from
// the main menu reloads a fresh application.
//
// Logging defaults to `info`; override with `RUST_LOG`.
//
//=========================================================================

use log::info;

use space_trucker::platform::{Platform, PlatformError};
use space_trucker::{ApplicationBuilder, RunOutcome};

fn main() -> Result<(), PlatformError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut platform = Platform::new()?;

    loop {
        let mut app = ApplicationBuilder::new().build(platform.host());
        match app.run(&mut platform)? {
            RunOutcome::Reload => info!("Reloading application"),
            RunOutcome::Closed => break,
        }
    }

    info!("Shutdown complete");
    Ok(())
}

//! Shared dimensional types, table-size constants, and process bootstrap used
//! across every `rbp-*` crate.

/// Chip amounts. Wide enough that no realistic buy-in/pot overflows it.
pub type Chips = i64;

/// 0-indexed seat position at a table.
pub type Position = usize;

/// Monotonically increasing hand counter within a single game.
pub type HandNo = u64;

/// Minimum number of seated players required to start a hand.
pub const MIN_SEATED: usize = 2;

/// Maximum seats at a single table.
pub const MAX_SEATS: usize = 9;

/// Default pause between streets, in milliseconds, giving subscribers time
/// to render the previous street before the next one lands.
pub const STREET_PAUSE_MS: u64 = 1_500;

/// Default pause after `hand_over` before a new hand begins.
pub const HAND_OVER_PAUSE_MS: u64 = 3_000;

/// Default pause before the first hand of a game starts.
pub const GAME_START_PAUSE_MS: u64 = 1_000;

/// Lightweight trait for generating fixture values in tests, mirroring the
/// teacher's `Arbitrary` (unrelated to the `proptest` crate of the same
/// name).
pub trait Arbitrary {
    fn random() -> Self;
}

/// Initializes combined terminal + file logging and installs a Ctrl-C
/// handler that force-exits the process.
pub fn init() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("forcing exit");
            std::process::exit(0);
        }
    });
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chips_wide_enough_for_deep_stacks() {
        let stack: Chips = 1_000_000_000;
        assert!(stack.checked_mul(100).is_some());
    }
}

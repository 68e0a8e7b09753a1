/*!
Role-gated patient records kept in flat, human-readable files.

The pieces, leaves first: `codec` turns a `Patient` into one line of text
and back; `store::Store` keeps those lines in the patient file;
`store::RightsStore` keeps each role's permission flags; `gate::Gate`
checks them; and `inter::App` runs the console session on top.
*/
pub mod codec;
pub mod config;
pub mod error;
pub mod gate;
pub mod inter;
pub mod patient;
pub mod role;
pub mod store;

pub use error::{Error, Result};

pub fn parse_log_level(s: &str) -> Option<simplelog::LevelFilter> {
    use simplelog::LevelFilter;

    let mut level_string = s.trim().to_owned();
    level_string.make_ascii_lowercase();
    match level_string.as_str() {
        "max" => Some(LevelFilter::max()),
        "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" => Some(LevelFilter::Off),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_level_from_env() -> simplelog::LevelFilter {
        match std::env::var("LOG_LEVEL") {
            Ok(s) => parse_log_level(&s).unwrap_or(simplelog::LevelFilter::Warn),
            Err(_) => simplelog::LevelFilter::Warn,
        }
    }

    pub fn ensure_logging() {
        use simplelog::{TermLogger, TerminalMode, ColorChoice};
        let log_cfg = simplelog::ConfigBuilder::new()
            .add_filter_allow_str("hospital")
            .build();
        let res = TermLogger::init(
            log_level_from_env(),
            log_cfg,
            TerminalMode::Stdout,
            ColorChoice::Auto
        );

        match res {
            Ok(_) => { log::info!("Test logging started."); },
            Err(_) => { log::info!("Test logging already started."); },
        }
    }

    #[test]
    fn log_levels() {
        use simplelog::LevelFilter;

        assert_eq!(parse_log_level("TRACE"), Some(LevelFilter::Trace));
        assert_eq!(parse_log_level(" warn "), Some(LevelFilter::Warn));
        assert_eq!(parse_log_level("max"), Some(LevelFilter::max()));
        assert_eq!(parse_log_level("chatty"), None);
    }
}

/*!
Here we go!
*/
use simplelog::{ColorChoice, TerminalMode, TermLogger};

use hospital::config::{self, Cfg};
use hospital::inter::{App, StdConsole};

fn main() {
    let cfg = match Cfg::load_or_default(config::DEFAULT_CONFIG_FILE) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", &e);
            std::process::exit(2);
        },
    };

    // stdout belongs to the menus.
    let log_cfg = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("hospital")
        .build();
    if let Err(e) = TermLogger::init(
        cfg.log_level,
        log_cfg,
        TerminalMode::Stderr,
        ColorChoice::Auto
    ) {
        eprintln!("Unable to start logging: {}", &e);
    }
    log::info!("Logging started.");
    log::info!(
        "Patient file: {}; access rights file: {}",
        cfg.patient_file.display(), cfg.rights_file.display()
    );

    let mut app = App::new(cfg, StdConsole::new());
    if let Err(e) = app.init() {
        log::error!("{}", &e);
        eprintln!("{}", &e);
        std::process::exit(1);
    }

    if let Err(e) = app.run() {
        log::error!("{}", &e);
        eprintln!("{}", &e);
        std::process::exit(1);
    }
}

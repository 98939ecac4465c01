mod app;
mod logging;
mod pointer;

use std::env;

use pixmorph_config::AppConfig;

use crate::app::App;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = AppConfig::load()?;
    logging::init(&config.log_level)?;

    let args: Vec<String> = env::args().skip(1).collect();
    let app = App::new(config, args);

    let terminal = ratatui::init();
    let result = app.run(terminal);
    ratatui::restore();
    result
}

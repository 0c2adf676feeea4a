use std::io;
use std::sync::{Arc, Mutex};

use flatval::EnvConfig;
use flatval_repl::app::App;
use flatval_repl::evaluator::HttpEvaluator;
use flatval_repl::runtime::RuntimeController;
use flatval_repl::terminal;
use tracing::info;

fn main() -> io::Result<()> {
    let config = EnvConfig::from_env();
    flatval::logging::init(&config)?;

    let evaluator = HttpEvaluator::from_env_config(&config).map_err(io::Error::other)?;
    info!(endpoint = evaluator.endpoint(), "starting flatval");

    let app = Arc::new(Mutex::new(App::new()));
    let host = RuntimeController::new(Arc::clone(&app), Arc::new(evaluator));

    terminal::run(app, host)
}

/// Patchgrid entry point for native builds
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::PathBuf;

    use patchgrid::config::AppConfig;

    let mut args = std::env::args().skip(1);
    let mut positional = Vec::new();
    let mut config_path: Option<PathBuf> = None;
    while let Some(arg) = args.next() {
        if arg == "--config" {
            config_path = args.next().map(PathBuf::from);
        } else {
            positional.push(arg);
        }
    }

    let (datasets_dir, dataset) = match positional.as_slice() {
        [dir, name] => (PathBuf::from(dir), name.clone()),
        _ => {
            eprintln!("Usage: patchgrid-native <datasets_dir> <dataset> [--config <path>]");
            std::process::exit(2);
        }
    };

    let config = match &config_path {
        Some(path) => match AppConfig::load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => AppConfig::load_from_default_path().unwrap_or_default(),
    };

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    if let Err(e) = native::run(&datasets_dir, &dataset, &config) {
        log::error!("{}", e);
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io::{BufRead, Write};
    use std::path::Path;

    use patchgrid::config::AppConfig;
    use patchgrid::handlers::{handle_message, status_line, Reply};
    use patchgrid::message::Message;
    use patchgrid::provider::{DirectoryProvider, FileSink};
    use patchgrid::{AnnotationError, SessionLoader};

    /// Load the dataset and process stdin commands until the operator leaves.
    pub fn run(datasets_dir: &Path, dataset: &str, config: &AppConfig) -> Result<(), AnnotationError> {
        let provider = DirectoryProvider::new(datasets_dir);
        let mut session = SessionLoader::new(dataset)
            .with_limits(config.grid.into())
            .load(&provider)?;
        let mut sink = FileSink::new(&config.preferences.output_dir);

        println!("{}", status_line(&session));
        println!("Classes: {}", session.config().assignable_classes().join(", "));
        println!("Type 'help' for commands.");

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        for line in stdin.lock().lines() {
            let line = line.map_err(|e| AnnotationError::fetch_failed(format!("stdin: {}", e)))?;
            if line.trim().is_empty() {
                continue;
            }

            let msg = match line.parse::<Message>() {
                Ok(msg) => msg,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };

            match handle_message(msg, &mut session, &mut sink) {
                Reply::Continue(text) => println!("{}", text),
                Reply::Exit(text) => {
                    println!("{}", text);
                    return Ok(());
                }
            }
            let _ = stdout.flush();
        }

        if session.has_unsaved_work() {
            log::warn!("Input ended with unsaved annotations for '{}'", dataset);
        }
        Ok(())
    }
}

// WASM builds use the library directly
#[cfg(target_arch = "wasm32")]
fn main() {}

mod app;
mod ui;
mod viewport;

// Re-export so that `crate::state` resolves to the lib crate types in the binary.
pub use pattern_gui_lib::state;

use app::PatternApp;
use shared::AssemblyDefinition;
use state::{AppSettings, GeometryLoader};

/// Command line options
#[derive(Debug, Default)]
struct Args {
    assembly: Option<String>,
    server: Option<String>,
    session: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pattern_gui=info".into()),
        )
        .init();

    let settings = AppSettings::load();
    let loader = initial_loader(parse_args(), &settings);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Pattern Studio 3D Preview")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "pattern-gui",
        native_options,
        Box::new(move |cc| Ok(Box::new(PatternApp::new(cc, settings, loader)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--assembly" => args.assembly = iter.next(),
            "--server" => args.server = iter.next(),
            "--session" => args.session = iter.next(),
            other => tracing::warn!("ignoring unknown argument {other}"),
        }
    }
    args
}

/// Remote session if one was named, else a definition file, else the catalog pouch
fn initial_loader(args: Args, settings: &AppSettings) -> GeometryLoader {
    if let Some(session) = &args.session {
        let server = args
            .server
            .as_deref()
            .or(settings.server_url.as_deref())
            .unwrap_or("http://localhost:3001");
        match GeometryLoader::remote(server, session) {
            Ok(loader) => {
                tracing::info!("Previewing session {session} from {server}");
                return loader;
            }
            Err(e) => tracing::error!("Failed to start remote session: {e}"),
        }
    }

    if let Some(path) = &args.assembly {
        match load_definition(path) {
            Ok(definition) => {
                tracing::info!("Loaded assembly '{}' from {path}", definition.key);
                return GeometryLoader::local(definition);
            }
            Err(e) => tracing::error!("Failed to load assembly from {path}: {e}"),
        }
    }

    GeometryLoader::local(shared::catalog::zipper_pouch())
}

pub(crate) fn load_definition(path: &str) -> Result<AssemblyDefinition, String> {
    let json = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let definition = AssemblyDefinition::from_json(&json).map_err(|e| e.to_string())?;
    for issue in definition.validate() {
        tracing::warn!("{path}: {issue}");
    }
    Ok(definition)
}

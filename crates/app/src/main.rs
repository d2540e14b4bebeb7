//! Entry point for dropview.
//! Logging + CLI flags, then hands the dropped paths to the platform layer.

use std::path::PathBuf;

use anyhow::Result;
use asset::RenderHints;
use corelib::IntakeError;
use platform::ViewRequest;

fn parse_flag(name: &str) -> bool {
    // --name or --name=on|off
    let prefix = format!("--{name}=");
    for arg in std::env::args().skip(1) {
        if arg == format!("--{name}") {
            return true;
        }
        if let Some(val) = arg.strip_prefix(&prefix) {
            return matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        }
    }
    false
}

fn parse_hints_args() -> RenderHints {
    let mut hints = RenderHints::default();
    for arg in std::env::args().skip(1) {
        if let Some(v) = arg.strip_prefix("--path-prefix=") {
            hints.path_prefix = v.to_owned();
        } else if let Some(v) = arg.strip_prefix("--precision=") {
            match v.parse::<u8>() {
                Ok(p) => hints.precision = p,
                Err(_) => log::warn!("Invalid precision '{}', keeping {}.", v, hints.precision),
            }
        }
    }
    hints.shadows = !parse_flag("no-shadows");
    hints.instance = parse_flag("instance");
    hints.instance_all = parse_flag("instanceall");
    hints.keep_names = parse_flag("keepnames");
    hints.keep_groups = parse_flag("keepgroups");
    hints.verbose = parse_flag("verbose");
    hints
}

fn parse_request_args() -> ViewRequest {
    if parse_flag("sample") {
        return ViewRequest::Sample;
    }
    let paths: Vec<PathBuf> = std::env::args()
        .skip(1)
        .filter(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
        .collect();
    ViewRequest::Drop(paths)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let hints = parse_hints_args();
    let request = parse_request_args();
    if matches!(&request, ViewRequest::Drop(paths) if paths.is_empty()) {
        eprintln!("usage: dropview [--sample] [--path-prefix=DIR] [--precision=N] [--no-shadows] <files or dirs...>");
        std::process::exit(2);
    }
    log::info!("Starting dropview. Request: {:?}, hints: {:?}", request, hints);

    let session = match platform::run_viewer(request, hints) {
        Ok(session) => session,
        Err(err) => {
            if let Some(intake_err) = err.downcast_ref::<IntakeError>() {
                eprintln!("{}", intake_err.kind().user_message());
            }
            return Err(err);
        }
    };

    if let Some(scene) = session.scene() {
        log::info!(
            "Scene {:?}: {} node(s), {} mesh(es), {} primitive(s), {} material(s), {} texture(s), animations={}",
            scene.name.as_deref().unwrap_or("<unnamed>"),
            scene.nodes,
            scene.meshes,
            scene.primitives,
            scene.materials,
            scene.textures,
            scene.has_animations()
        );
        if let Some(bounds) = scene.bounds {
            log::info!("Bounds: center {:?}, size {:?}", bounds.center(), bounds.size());
        }
    }

    log::info!("Done. Bye!");
    Ok(())
}

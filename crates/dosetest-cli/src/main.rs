//! `dose-test`: writes the fixed-angle pattern layout and the bend-radius
//! layout, each as GDS-II plus an SVG preview.
//!
//! Parameters come from `dosetest.json` in the working directory when it
//! exists; verbosity follows `RUST_LOG` (default `info`).

use std::error::Error;
use std::path::Path;

use dosetest_core::Library;
use dosetest_io::{compare_libraries, read_gds_file, write_gds_file, RunConfig, CONFIG_FILE_NAME};
use dosetest_patterns::{bend_library, pattern_library};
use dosetest_preview::{render_svg, PreviewError, PreviewStyle};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = RunConfig::load_or_default(CONFIG_FILE_NAME)?;
    if !cfg.output_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&cfg.output_dir)?;
    }

    let patterns = pattern_library(&cfg.patterns.layout)?;
    emit(&cfg, &patterns, &cfg.patterns.output.gds, &cfg.patterns.output.preview)?;

    let bends = bend_library(&cfg.bends.layout);
    emit(&cfg, &bends, &cfg.bends.output.gds, &cfg.bends.output.preview)?;

    Ok(())
}

/// Write one library, optionally check it and render its preview.
fn emit(cfg: &RunConfig, lib: &Library, gds: &Path, preview: &Path) -> Result<(), Box<dyn Error>> {
    let gds_path = cfg.resolve(gds);
    write_gds_file(&gds_path, lib, &cfg.gds)?;
    log::info!(
        "Wrote {} ({} cells, top {})",
        gds_path.display(),
        lib.cell_count(),
        lib.top().map(|c| c.name.as_str()).unwrap_or("-")
    );

    if cfg.verify {
        let back = read_gds_file(&gds_path)?;
        let mismatches = compare_libraries(lib, &back, cfg.gds.db_unit_in_um);
        if mismatches.is_empty() {
            log::info!("Verified {}", gds_path.display());
        }
        for m in &mismatches {
            log::warn!("{}: {:?}", gds_path.display(), m);
        }
    }

    if cfg.preview {
        let preview_path = cfg.resolve(preview);
        match render_svg(lib, &preview_path, &PreviewStyle::default()) {
            Ok(()) => {}
            Err(PreviewError::Unavailable) => {
                log::warn!("Preview unavailable; rebuild with the `preview` feature to enable it")
            }
            Err(e) => log::warn!("Skipping preview {}: {}", preview_path.display(), e),
        }
    }

    Ok(())
}

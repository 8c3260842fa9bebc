//! JSON output for the extracted catalog.

use std::path::Path;

use tracing::{info, instrument};

use worldcruise_shared::{CruiseCatalog, Result, WorldCruiseError};

/// Write the catalog as pretty JSON.
///
/// The file is written next to its target and renamed into place, so a
/// failed write never leaves a truncated catalog behind.
#[instrument(skip_all, fields(path = %path.display(), records = catalog.len()))]
pub fn write_catalog(catalog: &CruiseCatalog, path: &Path) -> Result<()> {
    let json = catalog.to_json_pretty()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| WorldCruiseError::io(parent, e))?;
    }

    let temp = path.with_extension("json.tmp");
    std::fs::write(&temp, json).map_err(|e| WorldCruiseError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(WorldCruiseError::io(path, e));
    }

    info!("catalog written");
    Ok(())
}

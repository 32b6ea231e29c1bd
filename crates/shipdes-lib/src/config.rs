use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::request::DesignRequest;

/// Environment variable naming a request file to use as the base case.
pub const PARAMS_ENV: &str = "SHIPDES_PARAMS";

/// Default filename for the user's base request.
const PARAMS_FILENAME: &str = "request.json";

/// Resolve the default parameter file location using platform-specific
/// project directories.
pub fn default_params_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "shipdes", "shipdes").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.config_dir().join(PARAMS_FILENAME))
}

/// Parse a request from a JSON file. Missing fields take their defaults.
pub fn load_request(path: &Path) -> Result<DesignRequest> {
    let text = fs::read_to_string(path)?;
    let request = serde_json::from_str(&text).map_err(|err| Error::ConfigParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    debug!(path = %path.display(), "loaded design request");
    Ok(request)
}

/// Write a request as pretty JSON, creating parent directories as needed.
pub fn save_request(path: &Path, request: &DesignRequest) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(request)?)?;
    info!(path = %path.display(), "saved design request");
    Ok(())
}

/// Locate and load the base request.
///
/// The resolution order is:
/// 1. Explicit `path` argument when provided.
/// 2. `SHIPDES_PARAMS` environment variable.
/// 3. `request.json` in the platform config directory, if it exists.
/// 4. The built-in default request.
pub fn resolve_request(path: Option<&Path>) -> Result<DesignRequest> {
    if let Some(explicit) = path {
        return load_request(explicit);
    }

    if let Some(env_path) = env::var_os(PARAMS_ENV) {
        return load_request(Path::new(&env_path));
    }

    match default_params_path() {
        Ok(default) if default.is_file() => load_request(&default),
        _ => Ok(DesignRequest::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::DesignMode;

    #[test]
    fn saved_request_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("case.json");
        let request = DesignRequest {
            design_mode: DesignMode::Teu,
            ship_type: "Container ship".to_string(),
            ..DesignRequest::default()
        };
        save_request(&path, &request).unwrap();
        assert_eq!(load_request(&path).unwrap(), request);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ \"speed_kn\": ").unwrap();
        match load_request(&path) {
            Err(Error::ConfigParse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.json");
        fs::write(&path, r#"{"speed_kn": 14.5}"#).unwrap();
        assert_eq!(resolve_request(Some(&path)).unwrap().speed_kn, 14.5);
    }
}

use crate::infrastructure::error::InfrastructureError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Serializes `value` as pretty JSON and writes it through a temporary file in the
/// target directory, so readers never observe a half-written report.
pub fn write_json_atomic<P: AsRef<Path>, T: Serialize>(
    path: P,
    value: &T,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut payload = serde_json::to_vec_pretty(value)?;
    payload.push(b'\n');

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(&payload)?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

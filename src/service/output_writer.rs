use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Writes the aggregate results as a 4-space indented JSON array, replacing
/// any existing file.
pub fn write_results(path: &Path, results: &[Value]) -> io::Result<()> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    results.serialize(&mut serializer).map_err(io::Error::other)?;
    buffer.push(b'\n');
    fs::write(path, buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn writes_pretty_utf8_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "stale content that is longer than the new one").unwrap();

        let results = vec![json!({"event_name": "Café Tech Meetup"}), json!({"batch": 2, "raw_response": "Timed out"})];
        write_results(&path, &results).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("Café"));
        assert!(written.starts_with("[\n    {\n        \"event_name\""));
        let parsed: Vec<Value> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, results);
    }

    #[test]
    fn empty_results_still_produce_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        write_results(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");
    }
}

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a `what` request (scenario, MACC, analysis...) from a JSON file.
pub fn read_request<T: DeserializeOwned>(
    path: &str,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    let file = request_path(path)?;
    let contents = fs::read_to_string(&file)
        .map_err(|e| format!("Cannot read {what} request '{}': {e}", file.display()))?;
    parse_request(&contents, &file.display().to_string(), what)
}

/// Deserialise request JSON. A leading byte-order mark, as left by
/// spreadsheet exports, is ignored.
pub fn parse_request<T: DeserializeOwned>(
    contents: &str,
    source: &str,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    let json = contents.trim_start_matches('\u{feff}');
    serde_json::from_str(json)
        .map_err(|e| format!("Invalid {what} request in {source}: {e}").into())
}

fn request_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let file = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !file.is_file() {
        return Err(format!("No request file at {}", file.display()).into());
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbon_pathways_core::trajectory::BauInput;

    #[test]
    fn test_parse_request_skips_byte_order_mark() {
        let json = "\u{feff}{\"baseline_by_scope\": {\"scope1\": 10, \"scope2\": 5}, \"base_year\": 2024}";
        let input: BauInput = parse_request(json, "bau.json", "BAU").unwrap();
        assert_eq!(input.base_year, 2024);
    }

    #[test]
    fn test_parse_request_names_the_request() {
        let err = parse_request::<BauInput>("{\"base_year\": 2024}", "stdin", "BAU")
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("Invalid BAU request in stdin"));
    }

    #[test]
    fn test_missing_request_file() {
        let err = read_request::<BauInput>("no/such/request.json", "BAU").unwrap_err();
        assert!(err.to_string().starts_with("No request file at"));
    }
}

pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a typed request from `--input` or, failing that, piped stdin.
/// `what` names the request in error messages.
pub fn load<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        file::read_request(path, what)
    } else if let Some(request) = stdin::read_request(what)? {
        Ok(request)
    } else {
        Err(format!("--input <file.json> or stdin required for {what}").into())
    }
}

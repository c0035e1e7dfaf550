use serde::de::DeserializeOwned;
use std::io::{self, Read};

use super::file::parse_request;

/// A `what` request piped on stdin, or `None` when stdin is a terminal or
/// carries nothing.
pub fn read_request<T: DeserializeOwned>(what: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut piped = String::new();
    io::stdin().read_to_string(&mut piped)?;
    if piped.trim().is_empty() {
        return Ok(None);
    }

    parse_request(&piped, "stdin", what).map(Some)
}

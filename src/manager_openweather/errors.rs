use thiserror::Error;

/// Per-location fetch failure. Recovered by the caller, the remaining
/// locations are still fetched.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http request error for {location}: {reason}")]
    Http { location: String, reason: String },
    #[error("forecast document error for {location}: {reason}")]
    Document { location: String, reason: String },
    #[error("empty forecast list for {location}")]
    Empty { location: String },
}

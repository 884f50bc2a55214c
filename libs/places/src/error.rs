use failure::Fail;

/// Everything that can go wrong while talking to the search backend
/// or while reading its answer.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "search backend unreachable: {}", _0)]
    Transport(#[cause] reqwest::Error),

    #[fail(display = "search backend answered with invalid json: {}", _0)]
    Parse(#[cause] serde_json::Error),

    #[fail(display = "unexpected search response: {}", _0)]
    Shape(String),

    #[fail(display = "invalid parameter `{}`: {}", name, reason)]
    InvalidParam { name: String, reason: String },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err)
    }
}

use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct MirrorError {
    details: String,
}

impl MirrorError {
    pub fn new(msg: &str) -> MirrorError {
        MirrorError {
            details: msg.to_string(),
        }
    }
}

impl fmt::Display for MirrorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for MirrorError {}

impl From<std::io::Error> for MirrorError {
    fn from(err: std::io::Error) -> MirrorError {
        MirrorError::new(&err.to_string())
    }
}

impl From<serde_json::Error> for MirrorError {
    fn from(err: serde_json::Error) -> MirrorError {
        MirrorError::new(&err.to_string())
    }
}

impl From<serde_yaml::Error> for MirrorError {
    fn from(err: serde_yaml::Error) -> MirrorError {
        MirrorError::new(&err.to_string())
    }
}

// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::string::FromUtf8Error;

/// Broad category of a failure, used to decide how it is presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    General,
    /// Something the operator has to fix in the environment or config file.
    Config,
    /// Input or upstream data that could not be understood.
    Data,
}

#[derive(Debug, PartialEq)]
pub struct ErrorReport {
    kind: ErrorKind,
    message: String,
}

impl ErrorReport {
    pub fn new(msg: impl Into<String>) -> Self {
        ErrorReport {
            kind: ErrorKind::General,
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ErrorReport {
            kind: ErrorKind::Config,
            message: msg.into(),
        }
    }

    pub fn data(msg: impl Into<String>) -> Self {
        ErrorReport {
            kind: ErrorKind::Data,
            message: msg.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for ErrorReport {
    fn from(value: std::io::Error) -> Self {
        ErrorReport::new(format!("I/O error: {value:#?}"))
    }
}

impl From<FromUtf8Error> for ErrorReport {
    fn from(value: FromUtf8Error) -> Self {
        ErrorReport::data(format!("UTF-8 conversion error: {value:#?}"))
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(value: serde_json::Error) -> Self {
        ErrorReport::data(format!("JSON error: {value}"))
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.kind {
            ErrorKind::General => write!(f, "error: {}", self.message),
            ErrorKind::Config => write!(f, "configuration error: {}", self.message),
            ErrorKind::Data => write!(f, "data error: {}", self.message),
        }
    }
}

impl Error for ErrorReport {}

pub type Fallible<T> = Result<T, ErrorReport>;

pub fn fail<T>(msg: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport::new(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        assert_eq!(ErrorReport::new("boom").to_string(), "error: boom");
        assert_eq!(
            ErrorReport::config("GEMINI_API_KEY is not set.").to_string(),
            "configuration error: GEMINI_API_KEY is not set."
        );
        assert_eq!(ErrorReport::data("bad").kind(), ErrorKind::Data);
    }

    #[test]
    fn test_fail() {
        let result: Fallible<()> = fail("nope");
        assert_eq!(result, Err(ErrorReport::new("nope")));
    }
}

// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::source::SourceError;
use wunsch_model::loading::ConfigurationError;

/// Everything a service operation can fail with. Failures happen before any
/// allocation work starts; a run never returns a partial result.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The snapshot source failed.
    Source(SourceError),
    /// The merged configuration or snapshot was rejected by the loader.
    Configuration(ConfigurationError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Source(e) => write!(f, "{}", e),
            ServiceError::Configuration(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Source(e) => Some(e),
            ServiceError::Configuration(e) => Some(e),
        }
    }
}

impl From<SourceError> for ServiceError {
    fn from(value: SourceError) -> Self {
        ServiceError::Source(value)
    }
}

impl From<ConfigurationError> for ServiceError {
    fn from(value: ConfigurationError) -> Self {
        ServiceError::Configuration(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_wraps_inner_error() {
        let err = ServiceError::from(SourceError::Unavailable("backend down".to_string()));
        assert!(err.to_string().contains("backend down"));

        let err = ServiceError::from(ConfigurationError::NoWorkshops);
        assert!(err.to_string().contains("workshop"));
    }
}

//! Progress wrapper for asynchronous reads.

/// State of an asynchronous fetch or read as observed by a consumer.
///
/// Producers emit a sequence of these; consumers reduce the sequence with
/// "latest state wins".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource<T> {
    /// Work has started and no result is available yet.
    Loading,
    /// A usable payload.
    Success(T),
    /// The operation failed; the message is meant for display.
    Error(String),
}

impl<T> Resource<T> {
    /// Returns `true` for [`Resource::Loading`].
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns `true` for [`Resource::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for [`Resource::Error`].
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Borrow the payload of a successful state.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Loading | Self::Error(_) => None,
        }
    }

    /// Take the payload of a successful state.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Loading | Self::Error(_) => None,
        }
    }

    /// Borrow the error message of a failed state.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            Self::Loading | Self::Success(_) => None,
        }
    }

    /// Transform the payload, keeping loading and error states as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U> {
        match self {
            Self::Loading => Resource::Loading,
            Self::Success(data) => Resource::Success(f(data)),
            Self::Error(message) => Resource::Error(message),
        }
    }
}

impl<T, E: core::fmt::Display> From<Result<T, E>> for Resource<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let loading: Resource<u32> = Resource::Loading;
        assert!(loading.is_loading());
        assert_eq!(loading.data(), None);

        let success = Resource::Success(3);
        assert!(success.is_success());
        assert_eq!(success.data(), Some(&3));

        let error: Resource<u32> = Resource::Error("HTTP 500".to_string());
        assert!(error.is_error());
        assert_eq!(error.error(), Some("HTTP 500"));
    }

    #[test]
    fn test_map_keeps_state() {
        assert_eq!(Resource::Success(2).map(|n| n * 10), Resource::Success(20));
        assert_eq!(
            Resource::<u32>::Error("boom".to_string()).map(|n| n * 10),
            Resource::Error("boom".to_string())
        );
        assert_eq!(Resource::<u32>::Loading.map(|n| n * 10), Resource::Loading);
    }

    #[test]
    fn test_from_result() {
        let ok: Resource<u8> = Ok::<u8, String>(1).into();
        assert_eq!(ok, Resource::Success(1));

        let err: Resource<u8> = Err::<u8, String>("offline".to_string()).into();
        assert_eq!(err, Resource::Error("offline".to_string()));
    }
}

//! Mapping structural errors back onto the object's own status values.
//!
//! Scripts written against the raw object expect `0`/`-1` status codes and
//! empty strings instead of errors. These adapters give that shape back,
//! logging whatever was swallowed.

use tracing::warn;

use crate::Result;

pub trait Convention<T> {
    /// The value, or `sentinel` if the call failed structurally.
    fn or_sentinel(self, sentinel: T) -> T;

    /// The value, or `T::default()` (`0`, empty text) on failure.
    fn or_empty(self) -> T
    where
        T: Default;
}

impl<T> Convention<T> for Result<T> {
    fn or_sentinel(self, sentinel: T) -> T {
        self.unwrap_or_else(|err| {
            warn!(error = %err, "call failed, using sentinel");
            sentinel
        })
    }

    fn or_empty(self) -> T
    where
        T: Default,
    {
        self.unwrap_or_else(|err| {
            warn!(error = %err, "call failed, using default");
            T::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_sentinel_on_error() {
        let failed: Result<i32> = Err(Error::MethodNotFound {
            name: "Nope".to_string(),
        });
        assert_eq!(failed.or_sentinel(-1), -1);
        assert_eq!(Ok::<_, Error>(7).or_sentinel(-1), 7);
    }

    #[test]
    fn test_empty_text_on_error() {
        let failed: Result<String> = Err(Error::MethodNotFound {
            name: "Ver".to_string(),
        });
        assert_eq!(failed.or_empty(), "");
    }
}

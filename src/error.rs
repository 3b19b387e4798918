use std::fmt;

use thiserror::Error;

/// Returned by [`ThreadedMap::erase`](crate::ThreadedMap::erase) when the key is not in the map
///
/// The map is left unchanged. The missing key is carried by the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("key not found in map: {key:?}")]
pub struct KeyNotFound<K: fmt::Debug> {
    pub key: K,
}

impl<K: fmt::Debug> KeyNotFound<K> {
    pub fn into_key(self) -> K {
        self.key
    }
}

/// Returned when reading through a cursor that is positioned at the end of the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("attempted to dereference the end cursor of a map")]
pub struct EndDereference;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = KeyNotFound {key: "abc"};
        assert_eq!(err.to_string(), "key not found in map: \"abc\"");
        assert_eq!(err.into_key(), "abc");

        assert_eq!(EndDereference.to_string(), "attempted to dereference the end cursor of a map");
    }
}

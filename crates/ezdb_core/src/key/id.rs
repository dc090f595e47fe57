//! Key identifiers and their allocation.

use crate::error::{CoreError, CoreResult};
use rand::Rng;
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

/// Identifier of a persisted key.
///
/// The identifier is the stem of the key's record file. It is:
/// - Unique within a database
/// - Assigned on the key's first save
/// - Immutable once assigned
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId(String);

impl KeyId {
    /// Creates an identifier from a string.
    ///
    /// Returns `None` if the string cannot be used as a file stem.
    #[must_use]
    pub fn parse(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        ezdb_codec::is_valid_file_stem(&value).then_some(Self(value))
    }

    /// Wraps a stem the manifest decoder has already validated.
    pub(crate) fn from_manifest(value: String) -> Self {
        Self(value)
    }

    /// Creates a random identifier of `length` lowercase ASCII letters.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(rng: &mut R, length: usize) -> Self {
        Self(
            (0..length)
                .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
                .collect(),
        )
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", self.0)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KeyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for KeyId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<KeyId> for String {
    fn from(id: KeyId) -> Self {
        id.0
    }
}

/// Generates collision-free identifiers for unsaved keys.
///
/// Candidates are drawn uniformly from the lowercase ASCII alphabet and
/// retried until one is not in the caller's set of taken identifiers.
#[derive(Debug, Clone, Copy)]
pub struct IdAllocator {
    length: usize,
}

impl IdAllocator {
    /// Creates an allocator producing identifiers of `length` letters.
    #[must_use]
    pub const fn new(length: usize) -> Self {
        Self { length }
    }

    /// Returns the identifier length.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Returns how many distinct identifiers exist, or `None` if that
    /// number does not fit in a `usize`.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        u32::try_from(self.length)
            .ok()
            .and_then(|length| 26usize.checked_pow(length))
    }

    /// Allocates an identifier not contained in `taken`, using the thread RNG.
    ///
    /// # Errors
    ///
    /// Returns `IdSpaceExhausted` if every identifier of this length is taken.
    pub fn allocate(&self, taken: &HashSet<&str>) -> CoreResult<KeyId> {
        self.allocate_with(&mut rand::thread_rng(), taken)
    }

    /// Allocates an identifier not contained in `taken`, using `rng`.
    ///
    /// # Errors
    ///
    /// Returns `IdSpaceExhausted` if every identifier of this length is taken.
    pub fn allocate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        taken: &HashSet<&str>,
    ) -> CoreResult<KeyId> {
        if let Some(capacity) = self.capacity() {
            let competing = taken
                .iter()
                .filter(|id| id.len() == self.length && id.bytes().all(|b| b.is_ascii_lowercase()))
                .count();
            if competing >= capacity {
                return Err(CoreError::IdSpaceExhausted {
                    length: self.length(),
                });
            }
        }

        loop {
            let candidate = KeyId::random(rng, self.length);
            if !taken.contains(candidate.as_str()) {
                return Ok(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_ids_are_lowercase_letters() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let id = KeyId::random(&mut rng, 8);
            assert_eq!(id.as_str().len(), 8);
            assert!(id.as_str().bytes().all(|b| b.is_ascii_lowercase()));
        }
    }

    #[test]
    fn parse_rejects_paths() {
        assert!(KeyId::parse("abcdefgh").is_some());
        assert!(KeyId::parse("").is_none());
        assert!(KeyId::parse("../x").is_none());
    }

    #[test]
    fn allocation_skips_taken_ids() {
        let allocator = IdAllocator::new(1);
        assert_eq!(allocator.length(), 1);
        let letters: Vec<String> = (b'a'..=b'y').map(|b| char::from(b).to_string()).collect();
        let taken: HashSet<&str> = letters.iter().map(String::as_str).collect();

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let id = allocator.allocate_with(&mut rng, &taken).unwrap();
            assert_eq!(id.as_str(), "z");
        }
    }

    #[test]
    fn exhausted_space_is_an_error() {
        let allocator = IdAllocator::new(1);
        let letters: Vec<String> = (b'a'..=b'z').map(|b| char::from(b).to_string()).collect();
        let taken: HashSet<&str> = letters.iter().map(String::as_str).collect();

        let result = allocator.allocate(&taken);
        assert!(matches!(result, Err(CoreError::IdSpaceExhausted { length: 1 })));
    }

    #[test]
    fn foreign_ids_do_not_count_towards_capacity() {
        let allocator = IdAllocator::new(1);
        let taken: HashSet<&str> = ["legacy-1", "Q", "zz"].into_iter().collect();
        assert!(allocator.allocate(&taken).is_ok());
    }

    #[test]
    fn capacity() {
        assert_eq!(IdAllocator::new(2).capacity(), Some(676));
        assert_eq!(IdAllocator::new(64).capacity(), None);
    }

    #[test]
    fn display_and_debug() {
        let id = KeyId::parse("qwertyui").unwrap();
        assert_eq!(id.to_string(), "qwertyui");
        assert_eq!(format!("{id:?}"), "KeyId(qwertyui)");
    }
}

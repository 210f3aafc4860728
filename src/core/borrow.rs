//! Module for hiding the difference between owned and borrowed data.

use core::{
    borrow::Borrow,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
};

/// `OwnableRef` is a type that represents either a
/// [borrowed](OwnableRef::Borrowed) or [owned](OwnableRef::Owned) value of
/// which a shared reference can be taken.
///
/// Stored graphs lend their edges while delegate-backed graphs compute them
/// on demand. Both are handed out as `OwnableRef` so that the traversal
/// engine works with either without forcing a clone on the stored ones.
#[derive(Clone)]
pub enum OwnableRef<'a, T> {
    Borrowed(&'a T),
    Owned(T),
}

impl<T: Clone> OwnableRef<'_, T> {
    /// Extracts the owned data or clones it in case of a borrow.
    pub fn into_owned(self) -> T {
        match self {
            OwnableRef::Borrowed(value) => value.clone(),
            OwnableRef::Owned(value) => value,
        }
    }
}

impl<T> Deref for OwnableRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        match self {
            OwnableRef::Borrowed(value) => value,
            OwnableRef::Owned(value) => value,
        }
    }
}

impl<T> AsRef<T> for OwnableRef<'_, T> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T> Borrow<T> for OwnableRef<'_, T> {
    fn borrow(&self) -> &T {
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for OwnableRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T> PartialEq for OwnableRef<'_, T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        PartialEq::eq(&**self, &**other)
    }
}

impl<T> Eq for OwnableRef<'_, T> where T: Eq {}

impl<T> Hash for OwnableRef<'_, T>
where
    T: Hash,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        (**self).hash(state);
    }
}

impl<T> PartialOrd for OwnableRef<'_, T>
where
    T: PartialOrd,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        PartialOrd::partial_cmp(&**self, &**other)
    }
}

impl<T> Ord for OwnableRef<'_, T>
where
    T: Ord,
{
    fn cmp(&self, other: &Self) -> Ordering {
        Ord::cmp(&**self, &**other)
    }
}

impl<'a, T> From<&'a T> for OwnableRef<'a, T> {
    fn from(value: &'a T) -> Self {
        OwnableRef::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_and_owned_compare_by_value() {
        let value = 42;
        let borrowed = OwnableRef::Borrowed(&value);
        let owned = OwnableRef::Owned(42);

        assert_eq!(borrowed, owned);
        assert_eq!(borrowed.into_owned(), 42);
        assert_eq!(*owned, 42);
    }
}

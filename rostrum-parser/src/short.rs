use core::str::Chars;

/// A cluster of short flags, like the `abc` in `-abc`. Statically guaranteed
/// to contain at least one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ShortCluster<'a>(&'a str);

impl<'a> ShortCluster<'a> {
    #[inline]
    pub fn new(cluster: &'a str) -> Option<Self> {
        match cluster.is_empty() {
            true => None,
            false => Some(Self(cluster)),
        }
    }

    #[inline]
    pub fn chars(&self) -> Chars<'a> {
        self.0.chars()
    }

    #[inline(always)]
    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

use smallvec::SmallVec;
use std::fmt;

/// Inline storage for a normalized method name, avoiding a heap
/// allocation for the common case (`GET`, `POST`, ... all fit in 16
/// bytes uppercased).
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct CompactMethod(SmallVec<[u8; 16]>);

impl CompactMethod {
    fn new(raw: &str) -> Self {
        let mut bytes = SmallVec::with_capacity(raw.len());
        bytes.extend(raw.bytes().map(|b| b.to_ascii_uppercase()));
        Self(bytes)
    }

    pub fn as_str(&self) -> &str {
        // Construction only ever pushes ASCII-uppercased bytes.
        std::str::from_utf8(&self.0).unwrap_or("")
    }
}

impl fmt::Debug for CompactMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CompactMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The key under which a node stores a [`MethodBuckets`](crate::payload::MethodBuckets).
///
/// `Middleware` and `All` are the two reserved tokens from the dispatch
/// algorithm; `Named` carries any other method string, normalized to
/// uppercase so `"get"` and `"GET"` resolve to the same bucket.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum MethodKey {
    Named(CompactMethod),
    /// Path middleware: runs for every request that reaches the node,
    /// never terminates a match by itself.
    Middleware,
    /// Wildcard method bucket: participates like a method handler, but
    /// with lower priority than the request's actual method.
    All,
}

impl MethodKey {
    pub fn named(method: &str) -> Self {
        Self::Named(CompactMethod::new(method))
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKey::Named(m) => write!(f, "{m}"),
            MethodKey::Middleware => f.write_str("MIDDLEWARE"),
            MethodKey::All => f.write_str("ALL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_keys_normalize_case() {
        assert_eq!(MethodKey::named("get"), MethodKey::named("GET"));
        assert_eq!(MethodKey::named("Get"), MethodKey::named("GET"));
    }

    #[test]
    fn reserved_tokens_never_collide_with_named() {
        assert_ne!(MethodKey::Middleware, MethodKey::named("MIDDLEWARE"));
        assert_ne!(MethodKey::All, MethodKey::named("ALL"));
    }
}

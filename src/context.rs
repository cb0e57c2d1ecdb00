use hashbrown::HashMap;
use std::any::{Any, TypeId};

/// Opaque per-request state threaded through a dispatch.
///
/// Carries the `params` mapping plus a type-keyed extension slot for
/// whatever external collaborators want to stash.
#[derive(Default)]
pub struct Context {
    pub params: HashMap<String, String>,
    extensions: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            params: HashMap::new(),
            extensions: HashMap::new(),
        }
    }

    pub fn insert_extension<T: Send + 'static>(&mut self, value: T) -> Option<T> {
        self.extensions
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|prev| prev.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    pub fn extension<T: Send + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    pub fn extension_mut<T: Send + 'static>(&mut self) -> Option<&mut T> {
        self.extensions
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Binds `name` to `value`, returning whatever value was previously
    /// bound so the caller can restore it later.
    pub(crate) fn set_param(&mut self, name: &str, value: String) -> Option<String> {
        self.params.insert(name.to_string(), value)
    }

    pub(crate) fn restore_param(&mut self, name: &str, prior: Option<String>) {
        match prior {
            Some(value) => {
                self.params.insert(name.to_string(), value);
            }
            None => {
                self.params.remove(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_round_trip_by_type() {
        let mut ctx = Context::new();
        ctx.insert_extension(42u32);
        ctx.insert_extension("hello".to_string());

        assert_eq!(ctx.extension::<u32>(), Some(&42));
        assert_eq!(ctx.extension::<String>().map(String::as_str), Some("hello"));
    }

    #[test]
    fn param_restore_removes_key_absent_before() {
        let mut ctx = Context::new();
        let prior = ctx.set_param("id", "1".to_string());
        assert_eq!(prior, None);
        ctx.restore_param("id", prior);
        assert!(!ctx.params.contains_key("id"));
    }
}

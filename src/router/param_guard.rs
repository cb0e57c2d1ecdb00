use crate::context::Context;

#[must_use = "a ParamGuard must be `restore`d after its scoped dispatch returns"]
pub(crate) struct ParamGuard {
    name: String,
    prior: Option<String>,
}

impl ParamGuard {
    /// Binds `ctx.params[name] = value`, remembering whatever was there
    /// before so it can be restored once the guard is resolved.
    pub(crate) fn bind(ctx: &mut Context, name: &str, value: String) -> Self {
        let prior = ctx.set_param(name, value);
        Self {
            name: name.to_string(),
            prior,
        }
    }

    /// Restores the value that was present before [`Self::bind`].
    pub(crate) fn restore(self, ctx: &mut Context) {
        ctx.restore_param(&self.name, self.prior);
    }
}

use crate::core::{Collect, EnvPtr, EvalError, MutationContext, Realm, Value};
use crate::{raise_eval_error, raise_range_error};

/// One entry of the execution context stack.
#[derive(Clone, Collect)]
#[collect(no_drop)]
pub struct ExecutionContext<'gc> {
    pub lexical_environment: EnvPtr<'gc>,
    pub variable_environment: EnvPtr<'gc>,
    pub this_binding: Value<'gc>,
    pub strict: bool,
    pub function_name: Option<String>,
}

/// Pops the context pushed by [`Realm::enter_context`] when dropped, on both
/// normal and error exits.
pub struct ContextGuard<'a, 'gc> {
    mc: &'a MutationContext<'gc>,
    realm: Realm<'gc>,
    depth: usize,
}

impl Drop for ContextGuard<'_, '_> {
    fn drop(&mut self) {
        let mut stack = self.realm.contexts.borrow_mut(self.mc);
        let popped = stack.pop();
        debug_assert_eq!(stack.len(), self.depth, "execution context stack out of balance");
        log::trace!(
            "leave context depth={} function={:?}",
            self.depth,
            popped.and_then(|ctx| ctx.function_name)
        );
    }
}

/// Restores the running context's lexical environment when dropped.
pub struct LexicalScopeGuard<'a, 'gc> {
    mc: &'a MutationContext<'gc>,
    realm: Realm<'gc>,
    previous: EnvPtr<'gc>,
}

impl Drop for LexicalScopeGuard<'_, '_> {
    fn drop(&mut self) {
        if let Some(top) = self.realm.contexts.borrow_mut(self.mc).last_mut() {
            top.lexical_environment = self.previous;
        }
    }
}

impl<'gc> Realm<'gc> {
    pub fn enter_context<'a>(self, mc: &'a MutationContext<'gc>, context: ExecutionContext<'gc>) -> Result<ContextGuard<'a, 'gc>, EvalError<'gc>> {
        let mut stack = self.contexts.borrow_mut(mc);
        let depth = stack.len();
        if depth >= self.config.max_call_depth {
            log::debug!("call depth limit {} reached", self.config.max_call_depth);
            return Err(raise_range_error!("Maximum call stack size exceeded").into());
        }
        log::trace!("enter context depth={} function={:?} strict={}", depth, context.function_name, context.strict);
        stack.push(context);
        Ok(ContextGuard { mc, realm: self, depth })
    }

    /// Replaces the running context's lexical environment until the guard drops.
    pub fn enter_lexical_scope<'a>(self, mc: &'a MutationContext<'gc>, env: EnvPtr<'gc>) -> Result<LexicalScopeGuard<'a, 'gc>, EvalError<'gc>> {
        let mut stack = self.contexts.borrow_mut(mc);
        let Some(top) = stack.last_mut() else {
            return Err(raise_eval_error!("no running execution context").into());
        };
        let previous = std::mem::replace(&mut top.lexical_environment, env);
        Ok(LexicalScopeGuard { mc, realm: self, previous })
    }

    pub fn current_context(self) -> Option<ExecutionContext<'gc>> {
        self.contexts.borrow().last().cloned()
    }

    pub(crate) fn running_context(self) -> Result<ExecutionContext<'gc>, EvalError<'gc>> {
        self.current_context()
            .ok_or_else(|| raise_eval_error!("no running execution context").into())
    }

    pub fn context_depth(self) -> usize {
        self.contexts.borrow().len()
    }

    pub fn lexical_environment(self) -> EnvPtr<'gc> {
        self.contexts
            .borrow()
            .last()
            .map(|ctx| ctx.lexical_environment)
            .unwrap_or(self.global_env)
    }

    pub fn variable_environment(self) -> EnvPtr<'gc> {
        self.contexts
            .borrow()
            .last()
            .map(|ctx| ctx.variable_environment)
            .unwrap_or(self.global_env)
    }

    pub fn this_binding(self) -> Value<'gc> {
        self.contexts
            .borrow()
            .last()
            .map(|ctx| ctx.this_binding.clone())
            .unwrap_or(Value::Object(self.global_object))
    }

    pub fn is_strict(self) -> bool {
        self.contexts.borrow().last().map(|ctx| ctx.strict).unwrap_or(self.config.strict_global)
    }
}

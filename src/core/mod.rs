use crate::error::JSError;
pub use gc_arena::Mutation as MutationContext;
pub(crate) use gc_arena::collect::Trace as GcTrace;
pub(crate) use gc_arena::lock::RefLock as GcCell;
pub use gc_arena::{Collect, Gc};
pub type GcPtr<'gc, T> = Gc<'gc, GcCell<T>>;

#[inline]
pub fn new_gc_cell_ptr<'gc, T: 'gc + Collect<'gc>>(mc: &MutationContext<'gc>, value: T) -> GcPtr<'gc, T> {
    Gc::new(mc, GcCell::new(value))
}

mod value;
pub use value::*;

mod number;
pub use number::*;

mod descriptor;
pub use descriptor::*;

mod object;
pub use object::*;

mod environment;
pub use environment::*;

mod reference;
pub use reference::*;

mod context;
pub use context::*;

mod realm;
pub use realm::*;

mod arguments;
pub use arguments::*;

mod binding;
pub use binding::*;

mod statement;
pub use statement::*;

mod eval;
pub use eval::*;

pub mod js_error;
pub use js_error::*;

#[derive(Collect)]
#[collect(no_drop)]
pub struct JsRoot<'gc> {
    pub realm: Realm<'gc>,
}

pub type JsArena = gc_arena::Arena<gc_arena::Rootable!['gc => JsRoot<'gc>]>;

/// Owns the garbage-collected heap together with one realm.
///
/// All language values live inside the arena; host code reaches them through
/// [`Runtime::with`], and results cross back out as plain Rust data.
pub struct Runtime {
    arena: JsArena,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        log::debug!("creating runtime with {:?}", config);
        let arena = JsArena::new(|mc| JsRoot {
            realm: Realm::new(mc, config),
        });
        Runtime { arena }
    }

    /// Evaluates `program` as global code and renders its completion value.
    pub fn run(&self, program: &Program) -> Result<String, JSError> {
        self.arena.mutate(|mc, root| {
            let realm = root.realm;
            let result = evaluate_program(mc, realm, program).and_then(|v| display_value(mc, realm, &v));
            result.map_err(|e| thrown_to_js_error(mc, realm, e))
        })
    }

    /// Evaluates `program` as indirect eval code, i.e. against the global environment.
    pub fn run_eval(&self, program: &Program) -> Result<String, JSError> {
        self.arena.mutate(|mc, root| {
            let realm = root.realm;
            let result = evaluate_eval_code(mc, realm, program, false).and_then(|v| display_value(mc, realm, &v));
            result.map_err(|e| thrown_to_js_error(mc, realm, e))
        })
    }

    pub fn with<F, R>(&self, f: F) -> R
    where
        F: for<'gc> FnOnce(&'gc MutationContext<'gc>, Realm<'gc>) -> R,
    {
        self.arena.mutate(|mc, root| f(mc, root.realm))
    }

    pub fn collect_garbage(&mut self) {
        self.arena.finish_cycle();
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new(RuntimeConfig::default())
    }
}

fn display_value<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, value: &Value<'gc>) -> Result<String, EvalError<'gc>> {
    Ok(crate::unicode::utf16_to_utf8(&to_js_string(mc, realm, value)?))
}

use crate::core::{
    Collect, EnvPtr, ErrorKind, ExecutionContext, Gc, GcPtr, JSObjectDataPtr, MutationContext, ObjectKind, Value, define_frozen_property,
    initialize_error_constructors, new_gc_cell_ptr, new_object_environment, new_object_with_prototype,
};
use crate::js_array::initialize_array;
use crate::js_boolean::initialize_boolean;
use crate::js_function::{FunctionData, NativeFunction, create_throw_type_error, function_prototype_call, initialize_function};
use crate::js_generator::initialize_generator;
use crate::js_number::initialize_number;
use crate::js_object::initialize_object;
use crate::js_string::initialize_string;

/// Host-tunable knobs of a runtime.
#[derive(Clone, Copy, Debug, Collect)]
#[collect(require_static)]
pub struct RuntimeConfig {
    /// Treat global code as strict even without a directive.
    pub strict_global: bool,
    /// Nesting limit of the execution context stack.
    pub max_call_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            strict_global: false,
            max_call_depth: 512,
        }
    }
}

#[derive(Clone, Copy, Collect)]
#[collect(no_drop)]
pub struct Intrinsics<'gc> {
    pub object_prototype: JSObjectDataPtr<'gc>,
    pub function_prototype: JSObjectDataPtr<'gc>,
    pub array_prototype: JSObjectDataPtr<'gc>,
    pub boolean_prototype: JSObjectDataPtr<'gc>,
    pub number_prototype: JSObjectDataPtr<'gc>,
    pub string_prototype: JSObjectDataPtr<'gc>,
    pub error_prototype: JSObjectDataPtr<'gc>,
    pub eval_error_prototype: JSObjectDataPtr<'gc>,
    pub range_error_prototype: JSObjectDataPtr<'gc>,
    pub reference_error_prototype: JSObjectDataPtr<'gc>,
    pub syntax_error_prototype: JSObjectDataPtr<'gc>,
    pub type_error_prototype: JSObjectDataPtr<'gc>,
    pub uri_error_prototype: JSObjectDataPtr<'gc>,
    pub generator_prototype: JSObjectDataPtr<'gc>,
    /// %ThrowTypeError%, installed as the poison accessor pair on strict functions.
    pub throw_type_error: JSObjectDataPtr<'gc>,
}

impl<'gc> Intrinsics<'gc> {
    pub fn error_prototype_for(&self, kind: ErrorKind) -> JSObjectDataPtr<'gc> {
        match kind {
            ErrorKind::Error => self.error_prototype,
            ErrorKind::EvalError => self.eval_error_prototype,
            ErrorKind::RangeError => self.range_error_prototype,
            ErrorKind::ReferenceError => self.reference_error_prototype,
            ErrorKind::SyntaxError => self.syntax_error_prototype,
            ErrorKind::TypeError => self.type_error_prototype,
            ErrorKind::UriError => self.uri_error_prototype,
        }
    }
}

#[derive(Collect)]
#[collect(no_drop)]
pub struct RealmData<'gc> {
    pub global_object: JSObjectDataPtr<'gc>,
    pub global_env: EnvPtr<'gc>,
    pub intrinsics: Intrinsics<'gc>,
    pub contexts: GcPtr<'gc, Vec<ExecutionContext<'gc>>>,
    pub config: RuntimeConfig,
}

/// Handle to the global object, global environment, intrinsics and context stack.
#[derive(Clone, Copy, Collect)]
#[collect(no_drop)]
pub struct Realm<'gc>(Gc<'gc, RealmData<'gc>>);

impl<'gc> std::ops::Deref for Realm<'gc> {
    type Target = RealmData<'gc>;

    fn deref(&self) -> &RealmData<'gc> {
        &self.0
    }
}

fn create_intrinsics<'gc>(mc: &MutationContext<'gc>) -> Intrinsics<'gc> {
    let object_prototype = new_object_with_prototype(mc, None, "Object", ObjectKind::Ordinary);
    // Function.prototype is itself a function that accepts anything and returns undefined
    let function_prototype = new_object_with_prototype(
        mc,
        Some(object_prototype),
        "Function",
        ObjectKind::Function(FunctionData::Native(NativeFunction {
            name: "",
            call: function_prototype_call,
            constructor: false,
        })),
    );
    define_frozen_property(mc, &function_prototype, "length", &Value::Number(0.0));

    let array_prototype = new_object_with_prototype(mc, Some(object_prototype), "Array", ObjectKind::Array);
    let boolean_prototype = new_object_with_prototype(mc, Some(object_prototype), "Boolean", ObjectKind::Boolean(false));
    let number_prototype = new_object_with_prototype(mc, Some(object_prototype), "Number", ObjectKind::Number(0.0));
    let string_prototype = new_object_with_prototype(mc, Some(object_prototype), "String", ObjectKind::String(Vec::new()));
    let error_prototype = new_object_with_prototype(mc, Some(object_prototype), "Error", ObjectKind::Ordinary);
    let native_error = || new_object_with_prototype(mc, Some(error_prototype), "Error", ObjectKind::Ordinary);
    let generator_prototype = new_object_with_prototype(mc, Some(object_prototype), "Object", ObjectKind::Ordinary);

    Intrinsics {
        object_prototype,
        function_prototype,
        array_prototype,
        boolean_prototype,
        number_prototype,
        string_prototype,
        error_prototype,
        eval_error_prototype: native_error(),
        range_error_prototype: native_error(),
        reference_error_prototype: native_error(),
        syntax_error_prototype: native_error(),
        type_error_prototype: native_error(),
        uri_error_prototype: native_error(),
        generator_prototype,
        throw_type_error: create_throw_type_error(mc, function_prototype),
    }
}

impl<'gc> Realm<'gc> {
    pub fn new(mc: &MutationContext<'gc>, config: RuntimeConfig) -> Self {
        let intrinsics = create_intrinsics(mc);
        let global_object = new_object_with_prototype(mc, Some(intrinsics.object_prototype), "global", ObjectKind::Ordinary);

        define_frozen_property(mc, &global_object, "NaN", &Value::Number(f64::NAN));
        define_frozen_property(mc, &global_object, "Infinity", &Value::Number(f64::INFINITY));
        define_frozen_property(mc, &global_object, "undefined", &Value::Undefined);

        initialize_object(mc, &intrinsics, &global_object);
        initialize_function(mc, &intrinsics);
        initialize_array(mc, &intrinsics);
        initialize_boolean(mc, &intrinsics);
        initialize_number(mc, &intrinsics);
        initialize_string(mc, &intrinsics);
        initialize_error_constructors(mc, &intrinsics, &global_object);
        initialize_generator(mc, &intrinsics);

        let global_env = new_object_environment(mc, global_object, false, None);
        log::debug!("realm initialized (strict_global={})", config.strict_global);
        Realm(Gc::new(
            mc,
            RealmData {
                global_object,
                global_env,
                intrinsics,
                contexts: new_gc_cell_ptr(mc, Vec::new()),
                config,
            },
        ))
    }

    /// Ordinary object inheriting from Object.prototype.
    pub fn new_object(self, mc: &MutationContext<'gc>) -> JSObjectDataPtr<'gc> {
        new_object_with_prototype(mc, Some(self.intrinsics.object_prototype), "Object", ObjectKind::Ordinary)
    }

    pub fn is_global_environment(self, env: &EnvPtr<'gc>) -> bool {
        Gc::ptr_eq(*env, self.global_env)
    }
}

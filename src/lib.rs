pub mod core;
pub mod error;
pub(crate) mod js_array;
pub(crate) mod js_boolean;
pub mod js_function;
pub(crate) mod js_generator;
pub(crate) mod js_number;
pub(crate) mod js_object;
pub(crate) mod js_string;
pub mod unicode;

pub use core::{
    BinaryOp, CatchClause, ControlFlow, Expr, ForInTarget, ForInit, FunctionCode, LogicalOp, Program, PropertyDefinition, Realm, Runtime,
    RuntimeConfig, Statement, StatementKind, UnaryOp, UpdateOp, Value,
};
pub use error::JSError;

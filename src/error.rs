#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum JSError {
    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("ReferenceError: {message}")]
    ReferenceError { message: String },

    #[error("RangeError: {message}")]
    RangeError { message: String },

    #[error("SyntaxError: {message}")]
    SyntaxError { message: String },

    #[error("Evaluation failed at {method} {file}:{line}: {message}")]
    EvaluationError {
        message: String,
        file: String,
        line: usize,
        method: String,
    },

    #[error("Uncaught {message}")]
    Throw { message: String },
}

impl JSError {
    pub fn message(&self) -> &str {
        match self {
            JSError::TypeError { message }
            | JSError::ReferenceError { message }
            | JSError::RangeError { message }
            | JSError::SyntaxError { message }
            | JSError::EvaluationError { message, .. }
            | JSError::Throw { message } => message,
        }
    }
}

#[macro_export]
macro_rules! raise_type_error {
    ($msg:expr) => {
        $crate::JSError::TypeError { message: $msg.to_string() }
    };
}

#[macro_export]
macro_rules! raise_reference_error {
    ($msg:expr) => {
        $crate::JSError::ReferenceError { message: $msg.to_string() }
    };
}

#[macro_export]
macro_rules! raise_range_error {
    ($msg:expr) => {
        $crate::JSError::RangeError { message: $msg.to_string() }
    };
}

#[macro_export]
macro_rules! raise_syntax_error {
    ($msg:expr) => {
        $crate::JSError::SyntaxError { message: $msg.to_string() }
    };
}

// Internal faults carry the call site. A macro keeps `file!()` and `line!()`
// pointing at the invocation rather than at a helper function.
#[macro_export]
macro_rules! raise_eval_error {
    ($msg:expr) => {
        $crate::JSError::EvaluationError {
            message: $msg.to_string(),
            file: file!().to_string(),
            line: line!() as usize,
            method: $crate::function_name!().to_string(),
        }
    };
}

#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        // remove the trailing "::f"
        &name[..name.len() - 3]
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_kind_prefix() {
        let err = raise_type_error!("x is not a function");
        assert_eq!(err.to_string(), "TypeError: x is not a function");
        assert_eq!(err.message(), "x is not a function");
    }

    #[test]
    fn eval_error_records_location() {
        let err = raise_eval_error!(format!("bad state {}", 1));
        match err {
            JSError::EvaluationError { message, file, line, method } => {
                assert_eq!(message, "bad state 1");
                assert!(file.ends_with("error.rs"));
                assert!(line > 0);
                assert!(method.contains("eval_error_records_location"));
            }
            other => panic!("Expected EvaluationError, got {:?}", other),
        }
    }
}

use crate::unicode::utf8_to_utf16;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    BitAnd,
    BitOr,
    BitXor,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    InstanceOf,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    TypeOf,
    Void,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone)]
pub enum PropertyDefinition {
    Value(String, Expr),               // key: value
    Getter(String, Rc<FunctionCode>),  // get key() { .. }
    Setter(String, Rc<FunctionCode>),  // set key(v) { .. }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64),
    StringLit(Vec<u16>),
    Boolean(bool),
    Null,
    Var(String),
    This,
    Property(Box<Expr>, String),                      // obj.name
    Index(Box<Expr>, Box<Expr>),                      // obj[expr]
    Call(Box<Expr>, Vec<Expr>),                       // callee, arguments
    New(Box<Expr>, Vec<Expr>),                        // new Constructor(args)
    Function(Rc<FunctionCode>),                       // function expression
    Object(Vec<PropertyDefinition>),                  // object literal
    Array(Vec<Option<Expr>>),                         // array literal, `None` marks a hole
    Unary(UnaryOp, Box<Expr>),
    Update(UpdateOp, bool, Box<Expr>),                // operator, is_prefix, target
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Logical(Box<Expr>, LogicalOp, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),     // test ? consequent : alternate
    Assign(Box<Expr>, Box<Expr>),                     // target, value
    CompoundAssign(Box<Expr>, BinaryOp, Box<Expr>),   // target op= value
    Comma(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn num(n: f64) -> Self {
        Expr::Number(n)
    }

    pub fn str(s: &str) -> Self {
        Expr::StringLit(utf8_to_utf16(s))
    }

    pub fn boolean(b: bool) -> Self {
        Expr::Boolean(b)
    }

    pub fn null() -> Self {
        Expr::Null
    }

    pub fn this() -> Self {
        Expr::This
    }

    pub fn ident(name: &str) -> Self {
        Expr::Var(name.to_string())
    }

    pub fn member(object: Expr, name: &str) -> Self {
        Expr::Property(Box::new(object), name.to_string())
    }

    pub fn index(object: Expr, key: Expr) -> Self {
        Expr::Index(Box::new(object), Box::new(key))
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call(Box::new(callee), args)
    }

    pub fn construct(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::New(Box::new(callee), args)
    }

    pub fn function(code: FunctionCode) -> Self {
        Expr::Function(Rc::new(code))
    }

    pub fn object(properties: Vec<PropertyDefinition>) -> Self {
        Expr::Object(properties)
    }

    pub fn array(elements: Vec<Expr>) -> Self {
        Expr::Array(elements.into_iter().map(Some).collect())
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary(op, Box::new(operand))
    }

    pub fn typeof_(operand: Expr) -> Self {
        Expr::Unary(UnaryOp::TypeOf, Box::new(operand))
    }

    pub fn delete(operand: Expr) -> Self {
        Expr::Unary(UnaryOp::Delete, Box::new(operand))
    }

    pub fn prefix(op: UpdateOp, target: Expr) -> Self {
        Expr::Update(op, true, Box::new(target))
    }

    pub fn postfix(op: UpdateOp, target: Expr) -> Self {
        Expr::Update(op, false, Box::new(target))
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary(Box::new(left), op, Box::new(right))
    }

    pub fn logical(left: Expr, op: LogicalOp, right: Expr) -> Self {
        Expr::Logical(Box::new(left), op, Box::new(right))
    }

    pub fn conditional(test: Expr, consequent: Expr, alternate: Expr) -> Self {
        Expr::Conditional(Box::new(test), Box::new(consequent), Box::new(alternate))
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign(Box::new(target), Box::new(value))
    }

    pub fn compound_assign(target: Expr, op: BinaryOp, value: Expr) -> Self {
        Expr::CompoundAssign(Box::new(target), op, Box::new(value))
    }

    pub fn comma(left: Expr, right: Expr) -> Self {
        Expr::Comma(Box::new(left), Box::new(right))
    }
}

#[derive(Debug, Clone)]
pub enum ForInit {
    Var(Vec<(String, Option<Expr>)>),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub enum ForInTarget {
    Var(String),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub param: String,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub line: usize,
    pub column: usize,
}

impl From<StatementKind> for Statement {
    fn from(kind: StatementKind) -> Self {
        Statement { kind, line: 0, column: 0 }
    }
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    Empty,
    Expr(Expr),
    Var(Vec<(String, Option<Expr>)>),
    FunctionDeclaration(Rc<FunctionCode>),
    Return(Option<Expr>),
    If(Expr, Vec<Statement>, Option<Vec<Statement>>),         // condition, then_body, else_body
    Block(Vec<Statement>),
    While(Expr, Vec<Statement>),                              // condition, body
    DoWhile(Vec<Statement>, Expr),                            // body, condition
    For(Option<ForInit>, Option<Expr>, Option<Expr>, Vec<Statement>), // init, condition, update, body
    ForIn(ForInTarget, Expr, Vec<Statement>),                 // target, object, body
    Break(Option<String>),
    Continue(Option<String>),
    Label(String, Box<Statement>),
    Throw(Expr),
    Try(Vec<Statement>, Option<CatchClause>, Option<Vec<Statement>>), // try_body, catch, finally_body
    With(Expr, Vec<Statement>),
    /// Suspends the running generator; only valid as a top-level step of a generator body.
    Yield(Option<Expr>),
}

impl Statement {
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn empty() -> Self {
        StatementKind::Empty.into()
    }

    pub fn expr(expr: Expr) -> Self {
        StatementKind::Expr(expr).into()
    }

    pub fn var(name: &str, init: Option<Expr>) -> Self {
        StatementKind::Var(vec![(name.to_string(), init)]).into()
    }

    pub fn function(code: FunctionCode) -> Self {
        StatementKind::FunctionDeclaration(Rc::new(code)).into()
    }

    pub fn ret(expr: Option<Expr>) -> Self {
        StatementKind::Return(expr).into()
    }

    pub fn if_then(condition: Expr, then_body: Vec<Statement>, else_body: Option<Vec<Statement>>) -> Self {
        StatementKind::If(condition, then_body, else_body).into()
    }

    pub fn block(body: Vec<Statement>) -> Self {
        StatementKind::Block(body).into()
    }

    pub fn while_loop(condition: Expr, body: Vec<Statement>) -> Self {
        StatementKind::While(condition, body).into()
    }

    pub fn throw(expr: Expr) -> Self {
        StatementKind::Throw(expr).into()
    }

    pub fn try_catch(body: Vec<Statement>, param: &str, handler: Vec<Statement>) -> Self {
        let catch = CatchClause {
            param: param.to_string(),
            body: handler,
        };
        StatementKind::Try(body, Some(catch), None).into()
    }

    pub fn yield_(expr: Option<Expr>) -> Self {
        StatementKind::Yield(expr).into()
    }
}

/// A compiled function body together with its formal parameters.
#[derive(Debug, Clone, Default)]
pub struct FunctionCode {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<Statement>,
    pub strict: bool,
    pub generator: bool,
}

impl FunctionCode {
    pub fn new(name: Option<&str>, params: &[&str], body: Vec<Statement>) -> Self {
        FunctionCode {
            name: name.map(str::to_string),
            params: params.iter().map(|p| p.to_string()).collect(),
            body,
            strict: false,
            generator: false,
        }
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn generator(mut self) -> Self {
        self.generator = true;
        self
    }
}

/// Global or eval code.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub body: Vec<Statement>,
    pub strict: bool,
}

impl Program {
    pub fn new(body: Vec<Statement>) -> Self {
        Program { body, strict: false }
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

fn push_unique(name: &str, out: &mut Vec<String>) {
    if !out.iter().any(|n| n == name) {
        out.push(name.to_string());
    }
}

fn collect_var_names(stmts: &[Statement], out: &mut Vec<String>) {
    for stmt in stmts {
        match &stmt.kind {
            StatementKind::Var(decls) | StatementKind::For(Some(ForInit::Var(decls)), _, _, _) => {
                for (name, _) in decls {
                    push_unique(name, out);
                }
                if let StatementKind::For(_, _, _, body) = &stmt.kind {
                    collect_var_names(body, out);
                }
            }
            StatementKind::ForIn(target, _, body) => {
                if let ForInTarget::Var(name) = target {
                    push_unique(name, out);
                }
                collect_var_names(body, out);
            }
            StatementKind::If(_, then_body, else_body) => {
                collect_var_names(then_body, out);
                if let Some(else_body) = else_body {
                    collect_var_names(else_body, out);
                }
            }
            StatementKind::Block(body)
            | StatementKind::While(_, body)
            | StatementKind::DoWhile(body, _)
            | StatementKind::For(_, _, _, body)
            | StatementKind::With(_, body) => collect_var_names(body, out),
            StatementKind::Label(_, inner) => collect_var_names(std::slice::from_ref(inner.as_ref()), out),
            StatementKind::Try(body, catch, finally) => {
                collect_var_names(body, out);
                if let Some(catch) = catch {
                    collect_var_names(&catch.body, out);
                }
                if let Some(finally) = finally {
                    collect_var_names(finally, out);
                }
            }
            _ => {}
        }
    }
}

/// VarDeclaredNames of a code body in source order, without duplicates.
/// Nested function bodies are not entered.
pub fn var_declared_names(stmts: &[Statement]) -> Vec<String> {
    let mut names = Vec::new();
    collect_var_names(stmts, &mut names);
    names
}

fn collect_function_declarations(stmts: &[Statement], out: &mut Vec<Rc<FunctionCode>>) {
    for stmt in stmts {
        match &stmt.kind {
            StatementKind::FunctionDeclaration(code) => out.push(code.clone()),
            StatementKind::If(_, then_body, else_body) => {
                collect_function_declarations(then_body, out);
                if let Some(else_body) = else_body {
                    collect_function_declarations(else_body, out);
                }
            }
            StatementKind::Block(body)
            | StatementKind::While(_, body)
            | StatementKind::DoWhile(body, _)
            | StatementKind::For(_, _, _, body)
            | StatementKind::ForIn(_, _, body)
            | StatementKind::With(_, body) => collect_function_declarations(body, out),
            StatementKind::Label(_, inner) => collect_function_declarations(std::slice::from_ref(inner.as_ref()), out),
            StatementKind::Try(body, catch, finally) => {
                collect_function_declarations(body, out);
                if let Some(catch) = catch {
                    collect_function_declarations(&catch.body, out);
                }
                if let Some(finally) = finally {
                    collect_function_declarations(finally, out);
                }
            }
            _ => {}
        }
    }
}

/// Function declarations hoisted into the enclosing variable environment, in source order.
pub fn function_declarations(stmts: &[Statement]) -> Vec<Rc<FunctionCode>> {
    let mut decls = Vec::new();
    collect_function_declarations(stmts, &mut decls);
    decls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_names_are_collected_through_nested_statements() {
        let body = vec![
            Statement::var("a", None),
            Statement::if_then(Expr::boolean(true), vec![Statement::var("b", None)], Some(vec![Statement::var("a", None)])),
            StatementKind::For(Some(ForInit::Var(vec![("i".to_string(), None)])), None, None, vec![Statement::var("c", None)]).into(),
            StatementKind::ForIn(ForInTarget::Var("k".to_string()), Expr::Null, vec![]).into(),
            Statement::function(FunctionCode::new(Some("inner"), &[], vec![Statement::var("hidden", None)])),
        ];
        assert_eq!(var_declared_names(&body), vec!["a", "b", "i", "c", "k"]);
    }

    #[test]
    fn function_declarations_skip_nested_bodies() {
        let nested = FunctionCode::new(Some("nested"), &[], vec![]);
        let outer = FunctionCode::new(Some("outer"), &[], vec![Statement::function(nested)]);
        let body = vec![
            Statement::function(outer),
            Statement::block(vec![Statement::function(FunctionCode::new(Some("blocky"), &[], vec![]))]),
        ];
        let names: Vec<_> = function_declarations(&body).iter().map(|f| f.name.clone().unwrap_or_default()).collect();
        assert_eq!(names, vec!["outer", "blocky"]);
    }
}

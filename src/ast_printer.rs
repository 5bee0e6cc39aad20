//! Debug printers for the AST.
//!
//! * [`AstPrinter::print_expr`] renders an expression as an s‑expression,
//!   e.g. `(+ 1.0 (* 2.0 3.0))`.
//! * [`AstPrinter::print_program`] renders statements back to canonical Lox
//!   source.  Parsing that text again yields the same tree, `for` loops
//!   included since they are already desugared.

use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};
use crate::token::format_number_literal;

const INDENT: &str = "    ";

#[derive(Debug, Default, Clone, Copy)]
pub struct AstPrinter;

impl AstPrinter {
    pub fn print_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, self.print_expr(value))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                self.print_expr(left),
                self.print_expr(right)
            ),

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut out: String = format!("(call {}", self.print_expr(callee));
                for argument in arguments {
                    out.push(' ');
                    out.push_str(&self.print_expr(argument));
                }
                out.push(')');
                out
            }

            Expr::Get { object, name } => {
                format!("(get {} {})", self.print_expr(object), name.lexeme)
            }

            Expr::Grouping(inner) => format!("(group {})", self.print_expr(inner)),

            Expr::Literal(literal) => match literal {
                LiteralValue::Number(n) => format_number_literal(*n),
                LiteralValue::Str(s) => s.clone(),
                LiteralValue::True => "true".to_string(),
                LiteralValue::False => "false".to_string(),
                LiteralValue::Nil => "nil".to_string(),
            },

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(set {} {} {})",
                self.print_expr(object),
                name.lexeme,
                self.print_expr(value)
            ),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),

            Expr::This { .. } => "this".to_string(),

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, self.print_expr(right))
            }

            Expr::Variable { name, .. } => name.lexeme.clone(),
        }
    }

    pub fn print_program(&self, statements: &[Stmt]) -> String {
        let mut out: String = String::new();

        for stmt in statements {
            out.push_str(&self.stmt(stmt, 0));
            out.push('\n');
        }

        out
    }

    /// Source text of `stmt`.  The first line carries no indentation; later
    /// lines are indented for `depth`.
    fn stmt(&self, stmt: &Stmt, depth: usize) -> String {
        match stmt {
            Stmt::Block(statements) => self.block(statements, depth),

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                let mut out: String = format!("class {}", name.lexeme);

                if let Some(superclass) = superclass {
                    out.push_str(" < ");
                    out.push_str(&self.source(superclass));
                }

                out.push_str(" {\n");

                for method in methods {
                    out.push_str(&INDENT.repeat(depth + 1));
                    out.push_str(&self.function(method, depth + 1));
                    out.push('\n');
                }

                out.push_str(&INDENT.repeat(depth));
                out.push('}');
                out
            }

            Stmt::Expression(expr) => format!("{};", self.source(expr)),

            Stmt::Function(declaration) => {
                format!("fun {}", self.function(declaration, depth))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut out: String = format!(
                    "if ({}) {}",
                    self.source(condition),
                    self.stmt(then_branch, depth)
                );

                if let Some(else_branch) = else_branch {
                    out.push_str(" else ");
                    out.push_str(&self.stmt(else_branch, depth));
                }

                out
            }

            Stmt::Print(expr) => format!("print {};", self.source(expr)),

            Stmt::Return { value, .. } => match value {
                Some(value) => format!("return {};", self.source(value)),
                None => "return;".to_string(),
            },

            Stmt::Var { name, initializer } => match initializer {
                Some(initializer) => {
                    format!("var {} = {};", name.lexeme, self.source(initializer))
                }
                None => format!("var {};", name.lexeme),
            },

            Stmt::While { condition, body } => format!(
                "while ({}) {}",
                self.source(condition),
                self.stmt(body, depth)
            ),
        }
    }

    fn block(&self, statements: &[Stmt], depth: usize) -> String {
        let mut out: String = String::from("{\n");

        for stmt in statements {
            out.push_str(&INDENT.repeat(depth + 1));
            out.push_str(&self.stmt(stmt, depth + 1));
            out.push('\n');
        }

        out.push_str(&INDENT.repeat(depth));
        out.push('}');
        out
    }

    /// `name(params) { body }`, without the `fun` keyword.
    fn function(&self, declaration: &FunctionDecl, depth: usize) -> String {
        let params: Vec<&str> = declaration
            .params
            .iter()
            .map(|p| p.lexeme.as_str())
            .collect();

        format!(
            "{}({}) {}",
            declaration.name.lexeme,
            params.join(", "),
            self.block(&declaration.body, depth)
        )
    }

    /// Expression as Lox source.  No parentheses are invented: every
    /// grouping the parser saw is an explicit `Grouping` node.
    fn source(&self, expr: &Expr) -> String {
        match expr {
            Expr::Assign { name, value, .. } => {
                format!("{} = {}", name.lexeme, self.source(value))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "{} {} {}",
                self.source(left),
                operator.lexeme,
                self.source(right)
            ),

            Expr::Call {
                callee, arguments, ..
            } => {
                let arguments: Vec<String> = arguments.iter().map(|a| self.source(a)).collect();
                format!("{}({})", self.source(callee), arguments.join(", "))
            }

            Expr::Get { object, name } => format!("{}.{}", self.source(object), name.lexeme),

            Expr::Grouping(inner) => format!("({})", self.source(inner)),

            Expr::Literal(literal) => match literal {
                LiteralValue::Number(n) => n.to_string(),
                LiteralValue::Str(s) => format!("\"{}\"", s),
                LiteralValue::True => "true".to_string(),
                LiteralValue::False => "false".to_string(),
                LiteralValue::Nil => "nil".to_string(),
            },

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "{}.{} = {}",
                self.source(object),
                name.lexeme,
                self.source(value)
            ),

            Expr::Super { method, .. } => format!("super.{}", method.lexeme),

            Expr::This { .. } => "this".to_string(),

            Expr::Unary { operator, right } => {
                format!("{}{}", operator.lexeme, self.source(right))
            }

            Expr::Variable { name, .. } => name.lexeme.clone(),
        }
    }
}

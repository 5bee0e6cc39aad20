//! Front door: runs source text through every stage against one long‑lived
//! interpreter, so globals survive from one interactive line to the next.

use std::rc::Rc;

use log::info;

use crate::ast::Stmt;
use crate::interpreter::Interpreter;
use crate::output::{Output, Stdio};
use crate::parser;
use crate::reporter::Reporter;
use crate::resolver;
use crate::scanner;
use crate::token::Token;

pub struct Lox {
    interpreter: Interpreter,
    reporter: Reporter,
}

impl Lox {
    pub fn new(output: Rc<dyn Output>) -> Self {
        Self {
            interpreter: Interpreter::new(Rc::clone(&output)),
            reporter: Reporter::new(output),
        }
    }

    pub fn with_stdio() -> Self {
        Self::new(Rc::new(Stdio))
    }

    /// Scan, parse, resolve and execute `source`.  A static error anywhere
    /// stops the pipeline before anything runs.
    pub fn run(&mut self, source: &str) {
        let tokens: Vec<Token> = scanner::scan(source, &mut self.reporter);

        let statements: Vec<Stmt> = parser::parse(&tokens, &mut self.reporter);
        if self.reporter.had_error() {
            info!("Static errors after parsing; skipping execution");
            return;
        }

        resolver::resolve(&mut self.interpreter, &statements, &mut self.reporter);
        if self.reporter.had_error() {
            info!("Static errors after resolving; skipping execution");
            return;
        }

        self.interpreter.interpret(&statements, &mut self.reporter);
    }

    pub fn had_error(&self) -> bool {
        self.reporter.had_error()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.reporter.had_runtime_error()
    }

    /// Forget static errors so the next interactive line runs.
    pub fn reset_error(&mut self) {
        self.reporter.reset();
    }
}

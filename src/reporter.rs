//! Error reporting collaborator shared by every pipeline stage.
//!
//! Each report writes one line through the [`Output`] sink and raises one of
//! two sticky flags that the front end polls to pick an exit status.

use std::rc::Rc;

use log::debug;

use crate::error::{LoxError, RuntimeError};
use crate::output::Output;
use crate::token::Token;

pub struct Reporter {
    output: Rc<dyn Output>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Reporter {
    pub fn new(output: Rc<dyn Output>) -> Self {
        Self {
            output,
            had_error: false,
            had_runtime_error: false,
        }
    }

    /// Report a static error at a bare line (scanner).
    pub fn error_at_line(&mut self, line: usize, message: &str) {
        self.report(&LoxError::lex(line, message));
    }

    /// Report a static error at a token (parser, resolver).
    pub fn error_at_token(&mut self, token: &Token, message: &str) {
        self.report(&LoxError::parse(token, message));
    }

    /// Report a runtime failure.
    pub fn runtime_error(&mut self, error: &RuntimeError) {
        debug!("Reporting runtime error: {:?}", error);

        self.output.error_line(&error.to_string());
        self.had_runtime_error = true;
    }

    /// Report any crate error, routing runtime failures to
    /// [`Reporter::runtime_error`].
    pub fn report(&mut self, error: &LoxError) {
        if let LoxError::Runtime(e) = error {
            self.runtime_error(e);
            return;
        }

        debug!("Reporting static error: {}", error);

        self.output.error_line(&error.to_string());
        self.had_error = true;
    }

    pub fn report_all<'e>(&mut self, errors: impl IntoIterator<Item = &'e LoxError>) {
        for e in errors {
            self.report(e);
        }
    }

    /// A lexical, syntax or static error was reported.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Clear the static‑error flag, e.g. between interactive lines.
    pub fn reset(&mut self) {
        self.had_error = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Capture;
    use crate::token::TokenType;

    #[test]
    fn static_and_runtime_flags_are_separate() {
        let capture: Capture = Capture::new();
        let mut reporter: Reporter = Reporter::new(Rc::new(capture.clone()));

        reporter.error_at_line(3, "Unexpected character: @");
        reporter.error_at_token(&Token::new(TokenType::EOF, "", None, 4), "Expect expression.");

        assert!(reporter.had_error());
        assert!(!reporter.had_runtime_error());

        let name: Token = Token::new(TokenType::IDENTIFIER, "x", None, 5);
        reporter.runtime_error(&RuntimeError::undefined_variable(&name));

        assert!(reporter.had_runtime_error());

        reporter.reset();
        assert!(!reporter.had_error());
        assert!(reporter.had_runtime_error());

        assert_eq!(
            capture.stderr(),
            vec![
                "[line 3] Error: Unexpected character: @".to_string(),
                "[line 4] Error at end: Expect expression.".to_string(),
                "Undefined variable 'x'.\n[line 5]".to_string(),
            ]
        );
    }
}

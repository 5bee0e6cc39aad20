#[cfg(test)]
mod resolver_tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use rox::lox::Lox;
    use rox::output::Capture;

    /// Run `source` and return what was printed to stderr.  Static errors
    /// must stop the program before it prints anything.
    fn static_errors(source: &str) -> Vec<String> {
        let capture: Capture = Capture::new();
        let mut lox: Lox = Lox::new(Rc::new(capture.clone()));

        lox.run(source);

        assert!(lox.had_error(), "expected a static error in {source:?}");
        assert!(!lox.had_runtime_error());
        assert_eq!(capture.stdout(), Vec::<String>::new());

        capture.stderr()
    }

    #[test]
    fn test_read_in_own_initializer() {
        assert_eq!(
            static_errors("print 1;\n{ var a = a; }"),
            vec!["[line 2] Error at 'a': Can't read local variable used in its own initializer."]
        );
    }

    #[test]
    fn test_global_self_reference_is_allowed() {
        let capture: Capture = Capture::new();
        let mut lox: Lox = Lox::new(Rc::new(capture.clone()));

        // Runs, but fails at runtime because `a` is not yet defined.
        lox.run("var a = a;");

        assert!(!lox.had_error());
        assert!(lox.had_runtime_error());
        assert_eq!(capture.stderr(), vec!["Undefined variable 'a'.\n[line 1]"]);
    }

    #[test]
    fn test_redeclaration_in_local_scope() {
        assert_eq!(
            static_errors("fun f() { var a = 1; var a = 2; }"),
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );

        assert_eq!(
            static_errors("fun f(a, a) {}"),
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );
    }

    #[test]
    fn test_global_redeclaration_is_allowed() {
        let capture: Capture = Capture::new();
        let mut lox: Lox = Lox::new(Rc::new(capture.clone()));

        lox.run("var a = 1; var a = 2; print a;");

        assert!(!lox.had_error());
        assert_eq!(capture.stdout(), vec!["2"]);
    }

    #[test]
    fn test_top_level_return() {
        assert_eq!(
            static_errors("return 1;"),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
    }

    #[test]
    fn test_return_value_from_initializer() {
        assert_eq!(
            static_errors("class A { init() { return 1; } }"),
            vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
        );
    }

    #[test]
    fn test_this_and_super_outside_class() {
        assert_eq!(
            static_errors("print this;"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );

        assert_eq!(
            static_errors("fun f() { super.m(); }"),
            vec!["[line 1] Error at 'super': Can't use 'super' outside of a class."]
        );

        assert_eq!(
            static_errors("class A { m() { super.m(); } }"),
            vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
        );
    }

    #[test]
    fn test_class_inheriting_from_itself() {
        assert_eq!(
            static_errors("class A < A {}"),
            vec!["[line 1] Error at 'A': A class can't inherit from itself."]
        );
    }

    #[test]
    fn test_all_errors_are_reported_in_one_pass() {
        assert_eq!(
            static_errors("return;\nprint this;\n{ var b = b; }"),
            vec![
                "[line 1] Error at 'return': Can't return from top-level code.",
                "[line 2] Error at 'this': Can't use 'this' outside of a class.",
                "[line 3] Error at 'b': Can't read local variable used in its own initializer.",
            ]
        );
    }
}

#[cfg(test)]
mod parser_tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use rox::ast::{Expr, Stmt};
    use rox::ast_printer::AstPrinter;
    use rox::output::Capture;
    use rox::parser::{self, Parser};
    use rox::reporter::Reporter;
    use rox::scanner;
    use rox::token::Token;

    fn tokens(source: &str) -> Vec<Token> {
        let mut reporter: Reporter = Reporter::new(Rc::new(Capture::new()));
        let tokens: Vec<Token> = scanner::scan(source, &mut reporter);
        assert!(!reporter.had_error(), "unexpected lexical error in {source:?}");
        tokens
    }

    fn sexpr(source: &str) -> String {
        let tokens: Vec<Token> = tokens(source);
        let mut parser: Parser<'_> = Parser::new(&tokens);

        match parser.parse_expression() {
            Ok(expr) => AstPrinter.print_expr(&expr),
            Err(e) => panic!("failed to parse {source:?}: {e}"),
        }
    }

    /// Parse a program, returning the statements and every reported line.
    fn program(source: &str) -> (Vec<Stmt>, Vec<String>) {
        let capture: Capture = Capture::new();
        let mut reporter: Reporter = Reporter::new(Rc::new(capture.clone()));

        let tokens: Vec<Token> = scanner::scan(source, &mut reporter);
        let statements: Vec<Stmt> = parser::parse(&tokens, &mut reporter);

        (statements, capture.stderr())
    }

    fn canonical(source: &str) -> String {
        let (statements, errors) = program(source);
        assert_eq!(errors, Vec::<String>::new());
        AstPrinter.print_program(&statements)
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(sexpr("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(sexpr("1 - 2 - 3"), "(- (- 1.0 2.0) 3.0)");
        assert_eq!(sexpr("(1 + 2) * 3"), "(* (group (+ 1.0 2.0)) 3.0)");
        assert_eq!(sexpr("-!x"), "(- (! x))");
        assert_eq!(sexpr("1 < 2 == true"), "(== (< 1.0 2.0) true)");
        assert_eq!(sexpr("a or b and c"), "(or a (and b c))");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(sexpr("a = b = 1"), "(= a (= b 1.0))");
        assert_eq!(sexpr("a.b.c = 2"), "(set (get a b) c 2.0)");
    }

    #[test]
    fn test_calls_and_properties() {
        assert_eq!(sexpr("f(1, \"two\")(3)"), "(call (call f 1.0 two) 3.0)");
        assert_eq!(sexpr("obj.method()"), "(call (get obj method))");
    }

    #[test]
    fn test_parse_expression_rejects_trailing_tokens() {
        let tokens: Vec<Token> = tokens("1 2");
        let result = Parser::new(&tokens).parse_expression();

        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("[line 1] Error at '2': Expect end of expression.".to_string())
        );
    }

    #[test]
    fn test_for_is_desugared_into_while() {
        assert_eq!(
            canonical("for (var i = 0; i < 3; i = i + 1) print i;"),
            "{\n    var i = 0;\n    while (i < 3) {\n        print i;\n        i = i + 1;\n    }\n}\n"
        );

        assert_eq!(canonical("for (;;) print 1;"), "while (true) print 1;\n");
    }

    #[test]
    fn test_class_and_function_forms() {
        let source = "class B < A {\n    init(x) {\n        this.x = x;\n    }\n    get() {\n        return super.get();\n    }\n}\nfun f() {\n    return;\n}\n";

        assert_eq!(canonical(source), source);
    }

    #[test]
    fn test_canonical_output_reparses_identically() {
        let source = r#"
            var a = "text"; var b;
            fun add(x, y) { return x + y * (2 - 1); }
            if (a != nil and !false) print add(1, 2); else { b = -3; }
            while (b < 10) b = b + 1;
            for (var i = 0; i < 2; i = i + 1) { print i / 2.5; }
        "#;

        let first: String = canonical(source);
        let second: String = canonical(&first);

        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_semicolon_and_recovery() {
        let (statements, errors) = program("print 1\nprint 2;\nvar = 3;\nprint 4;");

        assert_eq!(
            errors,
            vec![
                "[line 2] Error at 'print': Expect ';' after value.".to_string(),
                "[line 3] Error at '=': Expect variable name.".to_string(),
            ]
        );

        // Only the final statement survives; the first error swallowed `print 2;`.
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_error_at_end() {
        let (_, errors) = program("print (1 + 2;");

        assert_eq!(
            errors,
            vec!["[line 1] Error at ';': Expect ')' after expression.".to_string()]
        );

        let (_, errors) = program("{ print 1;");

        assert_eq!(
            errors,
            vec!["[line 1] Error at end: Expect '}' after block.".to_string()]
        );
    }

    #[test]
    fn test_invalid_assignment_target_does_not_abort() {
        let (statements, errors) = program("a + b = c;\nprint 1;");

        assert_eq!(
            errors,
            vec!["[line 1] Error at '=': Invalid assignment target.".to_string()]
        );
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_too_many_arguments() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let (_, errors) = program(&format!("f({});", args.join(", ")));

        assert_eq!(
            errors,
            vec!["[line 1] Error at '255': Can't have more than 255 arguments.".to_string()]
        );
    }

    #[test]
    fn test_too_many_parameters_keeps_parsing() {
        let params: Vec<String> = (0..256).map(|i| format!("p{i}")).collect();
        let (statements, errors) = program(&format!("fun f({}) {{}}\nprint 1;", params.join(", ")));

        assert_eq!(
            errors,
            vec!["[line 1] Error at 'p255': Can't have more than 255 parameters.".to_string()]
        );
        assert_eq!(statements.len(), 2);
        assert!(matches!(&statements[0], Stmt::Function(decl) if decl.params.len() == 256));
    }

    #[test]
    fn test_resolvable_nodes_get_distinct_ids() {
        let (statements, _) = program("a; a;");

        let ids: Vec<_> = statements
            .iter()
            .filter_map(|s| match s {
                Stmt::Expression(Expr::Variable { id, .. }) => Some(*id),
                _ => None,
            })
            .collect();

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_ids_stay_distinct_across_parses() {
        let first_id = |source: &str| match program(source).0.first() {
            Some(Stmt::Expression(Expr::Variable { id, .. })) => *id,
            other => panic!("expected a variable statement, got {other:?}"),
        };

        let first = first_id("a;");
        let second = first_id("a;");

        assert_ne!(first, second);
    }
}

#[cfg(test)]
mod interpreter_tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use rox::lox::Lox;
    use rox::output::{Capture, Line};

    struct Run {
        stdout: Vec<String>,
        stderr: Vec<String>,
        had_error: bool,
        had_runtime_error: bool,
    }

    fn run(source: &str) -> Run {
        let capture: Capture = Capture::new();
        let mut lox: Lox = Lox::new(Rc::new(capture.clone()));

        lox.run(source);

        Run {
            stdout: capture.stdout(),
            stderr: capture.stderr(),
            had_error: lox.had_error(),
            had_runtime_error: lox.had_runtime_error(),
        }
    }

    /// Run a program that must succeed and return its printed lines.
    fn output(source: &str) -> Vec<String> {
        let result: Run = run(source);

        assert_eq!(result.stderr, Vec::<String>::new());
        assert!(!result.had_error && !result.had_runtime_error);

        result.stdout
    }

    /// Run a program that must fail at runtime and return the error text.
    fn runtime_error(source: &str) -> String {
        let result: Run = run(source);

        assert!(!result.had_error);
        assert!(result.had_runtime_error, "expected a runtime error");
        assert_eq!(result.stderr.len(), 1);

        result.stderr[0].clone()
    }

    #[test]
    fn test_arithmetic_and_strings() {
        assert_eq!(
            output("print 1 + 2 * 3; print (1 + 2) * 3; print 7 / 2; print \"a\" + \"b\"; print -0.5;"),
            vec!["7", "9", "3.5", "ab", "-0.5"]
        );
    }

    #[test]
    fn test_division_by_zero_follows_ieee() {
        assert_eq!(output("print 1 / 0; print -1 / 0;"), vec!["inf", "-inf"]);
        assert_eq!(output("print 0 / 0;"), vec!["NaN"]);
    }

    #[test]
    fn test_large_numbers_print_in_full() {
        assert_eq!(
            output("print 100000000000000000000000; print 123456789012;"),
            vec!["100000000000000000000000", "123456789012"]
        );
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(
            output("print !nil; print !false; print !0; print !\"\"; if (0) print \"zero is true\";"),
            vec!["true", "true", "false", "false", "zero is true"]
        );
    }

    #[test]
    fn test_equality() {
        assert_eq!(
            output(
                "print nil == nil; print 1 == 1; print \"a\" == \"a\"; print 1 == \"1\"; \
                 print nil == false; print true != false;"
            ),
            vec!["true", "true", "true", "false", "false", "true"]
        );
    }

    #[test]
    fn test_logical_operators_return_operands() {
        assert_eq!(
            output("print nil or \"yes\"; print 1 and 2; print false and boom(); print 1 or boom();"),
            vec!["yes", "2", "false", "1"]
        );
    }

    #[test]
    fn test_scoping_and_shadowing() {
        let source = r#"
            var a = "global a";
            var b = "global b";
            {
                var a = "outer a";
                {
                    var a = "inner a";
                    print a;
                    print b;
                }
                print a;
            }
            print a;
        "#;

        assert_eq!(
            output(source),
            vec!["inner a", "global b", "outer a", "global a"]
        );
    }

    #[test]
    fn test_while_and_for_loops() {
        assert_eq!(
            output("var i = 0; while (i < 3) { print i; i = i + 1; } for (var j = 0; j < 2; j = j + 1) print j;"),
            vec!["0", "1", "2", "0", "1"]
        );
    }

    #[test]
    fn test_recursion() {
        let source = r#"
            fun fib(n) {
                if (n <= 1) return n;
                return fib(n - 2) + fib(n - 1);
            }
            print fib(10);
        "#;

        assert_eq!(output(source), vec!["55"]);
    }

    #[test]
    fn test_closures_keep_their_own_state() {
        let source = r#"
            fun makeCounter() {
                var count = 0;
                fun counter() {
                    count = count + 1;
                    return count;
                }
                return counter;
            }
            var a = makeCounter();
            var b = makeCounter();
            print a();
            print a();
            print b();
        "#;

        assert_eq!(output(source), vec!["1", "2", "1"]);
    }

    #[test]
    fn test_closures_bind_statically() {
        let source = r#"
            var a = "global";
            {
                fun showA() {
                    print a;
                }
                showA();
                var a = "block";
                showA();
            }
        "#;

        assert_eq!(output(source), vec!["global", "global"]);
    }

    #[test]
    fn test_forward_reference_to_global_function() {
        let source = r#"
            fun isEven(n) {
                if (n == 0) return true;
                return isOdd(n - 1);
            }
            fun isOdd(n) {
                if (n == 0) return false;
                return isEven(n - 1);
            }
            print isEven(4);
        "#;

        assert_eq!(output(source), vec!["true"]);
    }

    #[test]
    fn test_return_inside_loop_unwinds() {
        let source = r#"
            fun first() {
                for (var i = 0; i < 10; i = i + 1) {
                    while (true) {
                        return i;
                    }
                }
            }
            fun nothing() {}
            print first();
            print nothing();
        "#;

        assert_eq!(output(source), vec!["0", "nil"]);
    }

    #[test]
    fn test_value_rendering() {
        assert_eq!(
            output("fun f() {} class C {} print f; print clock; print C; print C(); print 3.0;"),
            vec!["<fn f>", "<native fn>", "C", "C instance", "3"]
        );
    }

    #[test]
    fn test_classes_fields_and_methods() {
        let source = r#"
            class Bacon {
                eat() {
                    print "Crunch crunch crunch!";
                }
            }
            Bacon().eat();

            var box = Bacon();
            box.content = "jam";
            print box.content;
        "#;

        assert_eq!(output(source), vec!["Crunch crunch crunch!", "jam"]);
    }

    #[test]
    fn test_bound_methods_remember_this() {
        let source = r#"
            class Person {
                init(name) {
                    this.name = name;
                }
                sayName() {
                    print this.name;
                }
            }
            var jane = Person("Jane");
            var bill = Person("Bill");
            bill.sayName = jane.sayName;
            bill.sayName();
        "#;

        assert_eq!(output(source), vec!["Jane"]);
    }

    #[test]
    fn test_initializer_returns_instance() {
        let source = r#"
            class Foo {
                init() {
                    this.x = 1;
                    return;
                }
            }
            var foo = Foo();
            print foo.init();
            print foo.x;
        "#;

        assert_eq!(output(source), vec!["Foo instance", "1"]);
    }

    #[test]
    fn test_inheritance_and_super() {
        let source = r#"
            class A {
                method() {
                    print "A method";
                }
                describe() {
                    return "A";
                }
            }
            class B < A {
                method() {
                    print "B method";
                }
                test() {
                    super.method();
                }
            }
            class C < B {}
            C().test();
            print C().describe();
        "#;

        assert_eq!(output(source), vec!["A method", "A"]);
    }

    #[test]
    fn test_inherited_initializer() {
        let source = r#"
            class Base {
                init(x) { this.x = x; }
            }
            class Derived < Base {
                init(x, y) {
                    super.init(x);
                    this.y = y;
                }
            }
            var d = Derived(1, 2);
            print d.x + d.y;
        "#;

        assert_eq!(output(source), vec!["3"]);
    }

    #[test]
    fn test_clock_is_a_number() {
        assert_eq!(output("print clock() > 0;"), vec!["true"]);
    }

    #[test]
    fn test_operand_type_errors() {
        assert_eq!(
            runtime_error("print -\"a\";"),
            "Operand must be a number.\n[line 1]"
        );
        assert_eq!(
            runtime_error("print 1 < \"2\";"),
            "Operands must be numbers.\n[line 1]"
        );
        assert_eq!(
            runtime_error("print 1 + \"2\";"),
            "Operands must be two numbers or two strings.\n[line 1]"
        );
    }

    #[test]
    fn test_undefined_variable_and_assignment() {
        assert_eq!(
            runtime_error("print nope;"),
            "Undefined variable 'nope'.\n[line 1]"
        );
        assert_eq!(
            runtime_error("\nnope = 1;"),
            "Undefined variable 'nope'.\n[line 2]"
        );
    }

    #[test]
    fn test_call_errors() {
        assert_eq!(
            runtime_error("fun f(a, b) {} f(1);"),
            "Expected 2 arguments but got 1.\n[line 1]"
        );
        assert_eq!(
            runtime_error("class A { init(x) {} } A();"),
            "Expected 1 arguments but got 0.\n[line 1]"
        );
        assert_eq!(
            runtime_error("\"text\"();"),
            "Can only call functions and classes.\n[line 1]"
        );
    }

    #[test]
    fn test_arity_is_checked_before_the_body_runs() {
        let result: Run = run("fun f(a) { print \"body\"; } f();");

        assert!(result.had_runtime_error);
        assert_eq!(result.stdout, Vec::<String>::new());
        assert_eq!(
            result.stderr,
            vec!["Expected 1 arguments but got 0.\n[line 1]"]
        );
    }

    #[test]
    fn test_unbounded_recursion_is_a_runtime_error() {
        assert_eq!(
            runtime_error("fun f(n) { return f(n + 1); } f(0);"),
            "Stack overflow.\n[line 1]"
        );
        assert_eq!(
            runtime_error("class A { init() { A(); } }\nA();"),
            "Stack overflow.\n[line 1]"
        );
    }

    #[test]
    fn test_deep_recursion_below_the_limit() {
        let source = r#"
            fun count(n) {
                if (n == 0) return 0;
                return 1 + count(n - 1);
            }
            print count(1000);
        "#;

        assert_eq!(output(source), vec!["1000"]);
    }

    #[test]
    fn test_session_recovers_after_stack_overflow() {
        let capture: Capture = Capture::new();
        let mut lox: Lox = Lox::new(Rc::new(capture.clone()));

        lox.run("fun f() { f(); } fun g(n) { if (n > 0) g(n - 1); else print \"done\"; }");
        lox.run("f();");
        assert!(lox.had_runtime_error());

        capture.clear();
        lox.run("g(1000);");

        assert_eq!(capture.lines(), vec![Line::Out("done".to_string())]);
    }

    #[test]
    fn test_property_errors() {
        assert_eq!(
            runtime_error("class A {} print A().missing;"),
            "Undefined property 'missing'.\n[line 1]"
        );
        assert_eq!(
            runtime_error("var x = 1; print x.y;"),
            "Only instances have properties.\n[line 1]"
        );
        assert_eq!(
            runtime_error("var x = 1; x.y = 2;"),
            "Only instances have fields.\n[line 1]"
        );
    }

    #[test]
    fn test_superclass_must_be_a_class() {
        assert_eq!(
            runtime_error("var NotAClass = \"x\";\nclass B < NotAClass {}"),
            "Superclass must be a class.\n[line 2]"
        );
    }

    #[test]
    fn test_runtime_error_stops_execution_but_keeps_output() {
        let result: Run = run("print \"before\"; print nil + 1; print \"after\";");

        assert_eq!(result.stdout, vec!["before"]);
        assert!(result.had_runtime_error);
    }

    #[test]
    fn test_output_and_errors_interleave_in_order() {
        let capture: Capture = Capture::new();
        let mut lox: Lox = Lox::new(Rc::new(capture.clone()));

        lox.run("print 1; print x;");

        assert_eq!(
            capture.lines(),
            vec![
                Line::Out("1".to_string()),
                Line::Err("Undefined variable 'x'.\n[line 1]".to_string()),
            ]
        );
    }

    #[test]
    fn test_static_error_prevents_execution() {
        let result: Run = run("print \"never\"; print ;");

        assert!(result.had_error);
        assert_eq!(result.stdout, Vec::<String>::new());
        assert_eq!(
            result.stderr,
            vec!["[line 1] Error at ';': Expect expression."]
        );
    }

    #[test]
    fn test_session_keeps_globals_between_runs() {
        let capture: Capture = Capture::new();
        let mut lox: Lox = Lox::new(Rc::new(capture.clone()));

        lox.run("var greeting = \"hi\";");
        lox.run("fun greet() { return greeting; }");
        lox.run("print ;");
        assert!(lox.had_error());

        capture.clear();
        lox.reset_error();
        lox.run("print greet();");

        assert!(!lox.had_error());
        assert_eq!(capture.lines(), vec![Line::Out("hi".to_string())]);
    }

    #[test]
    fn test_closure_survives_across_runs() {
        let capture: Capture = Capture::new();
        let mut lox: Lox = Lox::new(Rc::new(capture.clone()));

        lox.run("fun make() { var n = 0; fun inc() { n = n + 1; return n; } return inc; } var c = make();");
        lox.run("c();");
        lox.run("print c();");

        assert_eq!(capture.stdout(), vec!["2"]);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let source = r#"
            class Node { init(v, next) { this.v = v; this.next = next; } }
            var list = Node(1, Node(2, Node(3, nil)));
            var sum = 0;
            while (list != nil) { sum = sum + list.v; list = list.next; }
            print sum;
        "#;

        assert_eq!(output(source), output(source));
        assert_eq!(output(source), vec!["6"]);
    }
}

#[cfg(test)]
mod interpreter_tests {
    use lox_interpreter as lox;

    use std::thread;

    use lox::driver::{self, Status};
    use lox::interpreter::Interpreter;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner::Scanner;

    struct Outcome {
        status: Status,
        stdout: String,
        stderr: String,
    }

    fn run(source: &str) -> Outcome {
        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();

        let status = driver::run(source, &mut out, &mut err).expect("in-memory sinks never fail");

        Outcome {
            status,
            stdout: String::from_utf8(out).unwrap(),
            stderr: String::from_utf8(err).unwrap(),
        }
    }

    fn run_ok(source: &str) -> String {
        let outcome = run(source);
        assert_eq!(
            outcome.status,
            Status::Success,
            "program failed:\n{}",
            outcome.stderr
        );
        outcome.stdout
    }

    // ── expressions ─────────────────────────────────────────────────────

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(run_ok("print 1 + 2 * 3;"), "7\n");
        assert_eq!(run_ok("print (1 + 2) * 3;"), "9\n");
        assert_eq!(run_ok("print 10 / 4;"), "2.5\n");
        assert_eq!(run_ok("print -0.5 + 3.0;"), "2.5\n");
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        assert_eq!(run_ok("print 1 / 0;"), "inf\n");
        assert_eq!(run_ok("print -1 / 0;"), "-inf\n");
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(run_ok("print \"foo\" + \"bar\";"), "foobar\n");
    }

    #[test]
    fn test_truthiness_and_equality() {
        assert_eq!(
            run_ok("print !nil; print !0; print !\"\"; print nil == false; print 1 == 1; print \"a\" != \"a\";"),
            "true\nfalse\nfalse\nfalse\ntrue\nfalse\n"
        );
    }

    #[test]
    fn test_logical_operators_return_operands() {
        assert_eq!(
            run_ok("print nil or \"x\"; print 1 and 2; print false and undefined;"),
            "x\n2\nfalse\n"
        );
    }

    #[test]
    fn test_operand_type_errors() {
        let outcome = run("print \"a\" + 1;");
        assert_eq!(outcome.status, Status::RuntimeError);
        assert_eq!(
            outcome.stderr,
            "Operands must be two numbers or two strings.\n[line 1]\n"
        );

        let outcome = run("\n-\"a\";");
        assert_eq!(outcome.status, Status::RuntimeError);
        assert_eq!(outcome.stderr, "Operand must be a number.\n[line 2]\n");

        let outcome = run("print 1 < \"2\";");
        assert_eq!(outcome.stderr, "Operands must be numbers.\n[line 1]\n");
    }

    // ── variables and scope ─────────────────────────────────────────────

    #[test]
    fn test_undefined_variable_is_runtime_error() {
        let outcome = run("var a = 1;\nprint b;");

        assert_eq!(outcome.status, Status::RuntimeError);
        assert_eq!(outcome.status.exit_code(), 70);
        assert_eq!(outcome.stderr, "Undefined variable 'b'.\n[line 2]\n");
    }

    #[test]
    fn test_assigning_undeclared_global_fails() {
        let outcome = run("x = 1;");

        assert_eq!(outcome.status, Status::RuntimeError);
        assert_eq!(outcome.stderr, "Undefined variable 'x'.\n[line 1]\n");
    }

    #[test]
    fn test_output_before_runtime_error_is_kept() {
        let outcome = run("print 1;\nprint nope;\nprint 2;");

        assert_eq!(outcome.status, Status::RuntimeError);
        assert_eq!(outcome.stdout, "1\n");
    }

    #[test]
    fn test_block_scoping_and_shadowing() {
        assert_eq!(
            run_ok(
                "var a = \"outer\";
                 {
                   var a = \"inner\";
                   print a;
                 }
                 print a;"
            ),
            "inner\nouter\n"
        );
    }

    #[test]
    fn test_closures_bind_lexically() {
        assert_eq!(
            run_ok(
                "var a = \"global\";
                 {
                   fun show() { print a; }
                   show();
                   var a = \"block\";
                   show();
                 }"
            ),
            "global\nglobal\n"
        );
    }

    #[test]
    fn test_global_redefinition() {
        assert_eq!(run_ok("var a = 1; var a = a + 1; print a;"), "2\n");
    }

    // ── control flow ────────────────────────────────────────────────────

    #[test]
    fn test_if_else() {
        assert_eq!(
            run_ok("if (1 > 2) print \"yes\"; else print \"no\"; if (nil) print \"never\";"),
            "no\n"
        );
    }

    #[test]
    fn test_while_loop() {
        assert_eq!(
            run_ok("var i = 3; while (i > 0) { print i; i = i - 1; }"),
            "3\n2\n1\n"
        );
    }

    #[test]
    fn test_for_loop() {
        assert_eq!(
            run_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
            "0\n1\n2\n"
        );
    }

    #[test]
    fn test_break_exits_innermost_loop_only() {
        assert_eq!(
            run_ok(
                "for (var i = 0; i < 2; i = i + 1) {
                   for (var j = 0; j < 10; j = j + 1) {
                     if (j == 1) break;
                     print i * 10 + j;
                   }
                 }
                 print \"done\";"
            ),
            "0\n10\ndone\n"
        );
    }

    #[test]
    fn test_break_from_while_true() {
        assert_eq!(
            run_ok("var n = 0; while (true) { n = n + 1; if (n == 4) break; } print n;"),
            "4\n"
        );
    }

    // ── functions ───────────────────────────────────────────────────────

    #[test]
    fn test_recursion() {
        assert_eq!(
            run_ok(
                "fun fib(n) {
                   if (n < 2) return n;
                   return fib(n - 1) + fib(n - 2);
                 }
                 print fib(10);"
            ),
            "55\n"
        );
    }

    #[test]
    fn test_return_from_inside_loop() {
        assert_eq!(
            run_ok(
                "fun first() {
                   for (var i = 0; ; i = i + 1) {
                     if (i == 3) return i;
                   }
                 }
                 print first();"
            ),
            "3\n"
        );
    }

    #[test]
    fn test_function_without_return_yields_nil() {
        assert_eq!(run_ok("fun f() {} print f();"), "nil\n");
    }

    #[test]
    fn test_counters_do_not_share_state() {
        assert_eq!(
            run_ok(
                "fun makeCounter() {
                   var i = 0;
                   fun count() {
                     i = i + 1;
                     return i;
                   }
                   return count;
                 }
                 var c1 = makeCounter();
                 var c2 = makeCounter();
                 print c1();
                 print c1();
                 print c2();"
            ),
            "1\n2\n1\n"
        );
    }

    #[test]
    fn test_callable_rendering() {
        assert_eq!(
            run_ok("fun f() {} print f; print clock;"),
            "<fn f>\n<native fn>\n"
        );
    }

    #[test]
    fn test_clock_returns_seconds() {
        assert_eq!(run_ok("print clock() > 1000000000;"), "true\n");
    }

    #[test]
    fn test_call_errors() {
        let outcome = run("\"x\"();");
        assert_eq!(outcome.status, Status::RuntimeError);
        assert_eq!(
            outcome.stderr,
            "Can only call functions and classes.\n[line 1]\n"
        );

        let outcome = run("fun f(a, b) {}\nf(1);");
        assert_eq!(outcome.stderr, "Expected 2 arguments but got 1.\n[line 2]\n");

        let outcome = run("clock(1);");
        assert_eq!(outcome.stderr, "Expected 0 arguments but got 1.\n[line 1]\n");
    }

    /// Deep recursion needs more stack than the default test thread has.
    fn run_with_large_stack(source: &'static str) -> Outcome {
        thread::Builder::new()
            .stack_size(256 * 1024 * 1024)
            .spawn(move || run(source))
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn test_runaway_recursion_is_runtime_error() {
        let outcome = run_with_large_stack("fun f(n) {\n  return f(n + 1);\n}\nf(0);");

        assert_eq!(outcome.status, Status::RuntimeError);
        assert_eq!(outcome.stderr, "Stack overflow.\n[line 2]\n");
    }

    #[test]
    fn test_recursion_below_depth_limit() {
        let outcome = run_with_large_stack(
            "fun depth(n) {
               if (n == 0) return 0;
               return depth(n - 1) + 1;
             }
             print depth(900);",
        );

        assert_eq!(outcome.status, Status::Success, "{}", outcome.stderr);
        assert_eq!(outcome.stdout, "900\n");
    }

    // ── classes ─────────────────────────────────────────────────────────

    #[test]
    fn test_class_and_instance_rendering() {
        assert_eq!(
            run_ok("class Bag {} var b = Bag(); print Bag; print b;"),
            "Bag\nBag instance\n"
        );
    }

    #[test]
    fn test_instance_fields_are_independent() {
        assert_eq!(
            run_ok(
                "class Point {}
                 var a = Point();
                 var b = Point();
                 a.x = 1;
                 b.x = 2;
                 print a.x;
                 print b.x;"
            ),
            "1\n2\n"
        );
    }

    #[test]
    fn test_methods_and_this() {
        assert_eq!(
            run_ok(
                "class Greeter {
                   init(name) { this.name = name; }
                   greet() { return \"hi \" + this.name; }
                 }
                 var g = Greeter(\"bob\");
                 print g.greet();
                 var m = g.greet;
                 g.name = \"alice\";
                 print m();"
            ),
            "hi bob\nhi alice\n"
        );
    }

    #[test]
    fn test_fields_shadow_methods() {
        assert_eq!(
            run_ok(
                "class A { m() { return \"method\"; } }
                 var a = A();
                 a.m = \"field\";
                 print a.m;"
            ),
            "field\n"
        );
    }

    #[test]
    fn test_initializer_returns_instance() {
        assert_eq!(
            run_ok(
                "class P {
                   init(x) {
                     this.x = x;
                     return;
                   }
                 }
                 var p = P(3);
                 print p.x;
                 print p.init(4) == p;
                 print p.x;"
            ),
            "3\ntrue\n4\n"
        );
    }

    #[test]
    fn test_class_arity_follows_init() {
        let outcome = run("class P { init(a) {} }\nP();");

        assert_eq!(outcome.status, Status::RuntimeError);
        assert_eq!(outcome.stderr, "Expected 1 arguments but got 0.\n[line 2]\n");
    }

    #[test]
    fn test_property_errors() {
        let outcome = run("var x = 1;\nprint x.y;");
        assert_eq!(outcome.stderr, "Only instances have properties.\n[line 2]\n");

        let outcome = run("var x = 1; x.y = 2;");
        assert_eq!(outcome.stderr, "Only instances have fields.\n[line 1]\n");

        let outcome = run("class A {}\nprint A().nope;");
        assert_eq!(outcome.stderr, "Undefined property 'nope'.\n[line 2]\n");
    }

    #[test]
    fn test_inherited_methods() {
        assert_eq!(
            run_ok(
                "class A { hi() { print \"hi from A\"; } }
                 class B < A {}
                 B().hi();"
            ),
            "hi from A\n"
        );
    }

    #[test]
    fn test_super_calls() {
        assert_eq!(
            run_ok(
                "class A { method() { return \"A\"; } }
                 class B < A { method() { return \"B then \" + super.method(); } }
                 class C < B {}
                 print C().method();"
            ),
            "B then A\n"
        );
    }

    #[test]
    fn test_super_init_chain() {
        assert_eq!(
            run_ok(
                "class Base { init(a) { this.a = a; } }
                 class Derived < Base {
                   init(a, b) {
                     super.init(a);
                     this.b = b;
                   }
                 }
                 var d = Derived(1, 2);
                 print d.a + d.b;"
            ),
            "3\n"
        );
    }

    #[test]
    fn test_superclass_must_be_a_class() {
        let outcome = run("var NotClass = 1;\nclass B < NotClass {}");

        assert_eq!(outcome.status, Status::RuntimeError);
        assert_eq!(outcome.stderr, "Superclass must be a class.\n[line 2]\n");
    }

    // ── static errors stop execution ────────────────────────────────────

    #[test]
    fn test_static_errors_prevent_execution() {
        let outcome = run("print 1;\nprint ;");
        assert_eq!(outcome.status, Status::StaticError);
        assert_eq!(outcome.stdout, "");
        assert_eq!(outcome.stderr, "[line 2] Error at ';': Expect expression.\n");

        let outcome = run("print 1;\n{ var a = 1; var a = 2; }");
        assert_eq!(outcome.status.exit_code(), 65);
        assert_eq!(outcome.stdout, "");

        let outcome = run("print 1;\n@");
        assert_eq!(outcome.status, Status::StaticError);
        assert_eq!(outcome.stdout, "");
        assert_eq!(outcome.stderr, "[line 2] Error: Unexpected character: @\n");
    }

    // ── direct interpreter use ──────────────────────────────────────────

    #[test]
    fn test_interpreter_with_captured_output() {
        let (tokens, _) = Scanner::new("var x = 2; print x * x;").scan_tokens();
        let statements = Parser::new(&tokens).parse().unwrap();
        let locals = Resolver::new().resolve(&statements).unwrap();

        let mut interpreter = Interpreter::with_output(Vec::new());
        interpreter.resolve(locals);
        interpreter.interpret(&statements).unwrap();

        assert_eq!(interpreter.output().as_slice(), b"4\n");
        assert_eq!(String::from_utf8(interpreter.into_output()).unwrap(), "4\n");
    }

    #[test]
    fn test_scope_restored_after_error_in_block() {
        let (first_tokens, _) =
            Scanner::new("var a = \"global\"; { var a = \"local\"; nil(); }").scan_tokens();
        let (second_tokens, _) = Scanner::new("var b = a + \" again\"; print b;").scan_tokens();

        let first = Parser::new(&first_tokens).parse().unwrap();
        let second = Parser::new(&second_tokens).parse().unwrap();

        let mut interpreter = Interpreter::with_output(Vec::new());

        interpreter.resolve(Resolver::new().resolve(&first).unwrap());
        let error = interpreter.interpret(&first).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Can only call functions and classes.\n[line 1]"
        );

        // With the block's frame gone, `b` is defined as a global and `a`
        // reads the outer binding.
        interpreter.resolve(Resolver::new().resolve(&second).unwrap());
        interpreter.interpret(&second).unwrap();

        assert_eq!(interpreter.output().as_slice(), b"global again\n");
    }
}

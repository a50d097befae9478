#[cfg(test)]
mod parser_tests {
    use lox_interpreter as lox;

    use lox::ast_printer::AstPrinter;
    use lox::parser::*;
    use lox::scanner::Scanner;

    fn print_expression(source: &str) -> Result<String, Vec<String>> {
        let (tokens, errors) = Scanner::new(source).scan_tokens();
        assert!(errors.is_empty(), "unexpected scan errors: {:?}", errors);

        let result = Parser::new(&tokens)
            .parse_expression()
            .map(|expr| AstPrinter::print(&expr))
            .map_err(|errors| errors.iter().map(ToString::to_string).collect());

        result
    }

    fn print_program(source: &str) -> Result<Vec<String>, Vec<String>> {
        let (tokens, errors) = Scanner::new(source).scan_tokens();
        assert!(errors.is_empty(), "unexpected scan errors: {:?}", errors);

        let result = Parser::new(&tokens)
            .parse()
            .map(|statements| {
                statements
                    .iter()
                    .map(|stmt| AstPrinter::print_stmt(stmt))
                    .collect()
            })
            .map_err(|errors| errors.iter().map(ToString::to_string).collect());

        result
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(print_expression("1 + 2 * 3").unwrap(), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(print_expression("1 - 2 - 3").unwrap(), "(- (- 1.0 2.0) 3.0)");
        assert_eq!(
            print_expression("-123 * (45.67)").unwrap(),
            "(* (- 123.0) (group 45.67))"
        );
        assert_eq!(
            print_expression("1 < 2 == !false").unwrap(),
            "(== (< 1.0 2.0) (! false))"
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(print_expression("\"hello\"").unwrap(), "hello");
        assert_eq!(print_expression("nil").unwrap(), "nil");
        assert_eq!(print_expression("true").unwrap(), "true");
        assert_eq!(print_expression("0.5").unwrap(), "0.5");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(print_expression("a = b = c").unwrap(), "(= a (= b c))");
    }

    #[test]
    fn test_logical_operators() {
        assert_eq!(
            print_expression("a or b and c").unwrap(),
            "(or a (and b c))"
        );
    }

    #[test]
    fn test_calls_and_properties() {
        assert_eq!(
            print_expression("obj.method(1, 2)").unwrap(),
            "(call (. obj method) 1.0 2.0)"
        );
        assert_eq!(print_expression("obj.field = 3").unwrap(), "(= obj.field 3.0)");
        assert_eq!(print_expression("f()()").unwrap(), "(call (call f))");
    }

    #[test]
    fn test_print_statement_rendering_is_stable() {
        let (tokens, _) = Scanner::new("print (1 + 2);").scan_tokens();
        let statements = Parser::new(&tokens).parse().unwrap();

        let first = AstPrinter::print_stmt(&statements[0]);
        let second = AstPrinter::print_stmt(&statements[0]);

        assert_eq!(first, "(print (group (+ 1.0 2.0)))");
        assert_eq!(first, second);
    }

    #[test]
    fn test_declarations() {
        assert_eq!(
            print_program("var a; var b = 1; fun add(x, y) { return x + y; }").unwrap(),
            vec![
                "(var a)",
                "(var b = 1.0)",
                "(fun add (x y) (return (+ x y)))",
            ]
        );
    }

    #[test]
    fn test_class_declaration() {
        assert_eq!(
            print_program("class B < A { init(x) { this.x = x; } get() { return super.get(); } }")
                .unwrap(),
            vec![
                "(class B < A (method init (x) (; (= this.x x))) (method get () (return (call (super get)))))"
            ]
        );
    }

    #[test]
    fn test_control_flow() {
        assert_eq!(
            print_program("if (a) print 1; else { print 2; } while (b) break;").unwrap(),
            vec![
                "(if-else a (print 1.0) (block (print 2.0)))",
                "(while b (break))",
            ]
        );

        assert_eq!(
            print_program("if (a) print 1;").unwrap(),
            vec!["(if a (print 1.0))"]
        );
    }

    #[test]
    fn test_for_desugars_to_while() {
        assert_eq!(
            print_program("for (var i = 0; i < 3; i = i + 1) print i;").unwrap(),
            vec![
                "(block (var i = 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
            ]
        );

        assert_eq!(
            print_program("for (;;) break;").unwrap(),
            vec!["(while true (break))"]
        );
    }

    #[test]
    fn test_missing_expression_at_end() {
        assert_eq!(
            print_expression("1 +").unwrap_err(),
            vec!["[line 1] Error at end: Expect expression."]
        );
    }

    #[test]
    fn test_unclosed_group() {
        assert_eq!(
            print_expression("(1").unwrap_err(),
            vec!["[line 1] Error at end: Expect ')' after expression."]
        );
    }

    #[test]
    fn test_multiple_errors_in_one_pass() {
        assert_eq!(
            print_program("print ;\nvar = 1;\nprint 2;").unwrap_err(),
            vec![
                "[line 1] Error at ';': Expect expression.",
                "[line 2] Error at '=': Expect variable name.",
            ]
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(
            print_program("1 = 2;\na + b = c;").unwrap_err(),
            vec![
                "[line 1] Error at '=': Invalid assignment target.",
                "[line 2] Error at '=': Invalid assignment target.",
            ]
        );
    }

    #[test]
    fn test_break_outside_loop() {
        assert_eq!(
            print_program("break;").unwrap_err(),
            vec!["[line 1] Error at 'break': Must be inside a loop to use break."]
        );

        // A function body does not inherit the loop around its declaration.
        assert_eq!(
            print_program("while (true) {\n  fun f() { break; }\n}").unwrap_err(),
            vec!["[line 2] Error at 'break': Must be inside a loop to use break."]
        );
    }

    #[test]
    fn test_missing_semicolon() {
        assert_eq!(
            print_program("print 1").unwrap_err(),
            vec!["[line 1] Error at end: Expect ';' after value."]
        );
    }

    #[test]
    fn test_too_many_arguments() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});", args.join(", "));

        assert_eq!(
            print_program(&source).unwrap_err(),
            vec!["[line 1] Error at '255': Can't have more than 255 arguments."]
        );
    }

    #[test]
    fn test_too_many_parameters() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{}}\nprint 1 +;", params.join(", "));

        // The arity error is recorded without abandoning the declaration, so
        // the next statement is still checked.
        assert_eq!(
            print_program(&source).unwrap_err(),
            vec![
                "[line 1] Error at 'p255': Can't have more than 255 parameters.",
                "[line 2] Error at ';': Expect expression.",
            ]
        );
    }
}

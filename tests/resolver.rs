#[cfg(test)]
mod resolver_tests {
    use lox_interpreter as lox;

    use lox::parser::Parser;
    use lox::resolver::{Locals, Resolver};
    use lox::scanner::Scanner;

    fn resolve(source: &str) -> Result<Locals, Vec<String>> {
        let (tokens, errors) = Scanner::new(source).scan_tokens();
        assert!(errors.is_empty(), "unexpected scan errors: {:?}", errors);

        let statements = Parser::new(&tokens).parse().expect("program should parse");

        let result = Resolver::new()
            .resolve(&statements)
            .map_err(|errors| errors.iter().map(ToString::to_string).collect());

        result
    }

    fn resolve_errors(source: &str) -> Vec<String> {
        resolve(source).err().unwrap_or_default()
    }

    #[test]
    fn test_local_distances() {
        let locals = resolve("{ var a = 1; { { print a; } } }").unwrap();

        assert_eq!(locals.values().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_globals_are_left_unresolved() {
        let locals = resolve("var a = 1; print a; a = 2;").unwrap();

        assert!(locals.is_empty());
    }

    #[test]
    fn test_closure_capture_distance() {
        let locals = resolve(
            "fun outer() {
               var x = 1;
               fun inner() { return x; }
               return inner;
             }",
        )
        .unwrap();

        // `x` inside `inner` is one frame out; `inner` in the return is local.
        let mut distances: Vec<usize> = locals.values().copied().collect();
        distances.sort_unstable();

        assert_eq!(distances, vec![0, 1]);
    }

    #[test]
    fn test_read_in_own_initializer() {
        assert_eq!(
            resolve_errors("{ var a = a; }"),
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );

        // Globals may refer to themselves; the failure happens at runtime.
        assert!(resolve_errors("var a = a;").is_empty());
    }

    #[test]
    fn test_redeclaration_in_local_scope() {
        assert_eq!(
            resolve_errors("{ var a = 1; var a = 2; }"),
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );

        assert!(resolve_errors("var a = 1; var a = 2;").is_empty());
        assert_eq!(
            resolve_errors("fun f(x, x) {}"),
            vec!["[line 1] Error at 'x': Already a variable with this name in this scope."]
        );
    }

    #[test]
    fn test_return_placement() {
        assert_eq!(
            resolve_errors("return 1;"),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );

        assert_eq!(
            resolve_errors("class A { init() { return 1; } }"),
            vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
        );

        assert!(resolve_errors("class A { init() { return; } }").is_empty());
        assert!(resolve_errors("fun f() { return 1; }").is_empty());
    }

    #[test]
    fn test_this_outside_class() {
        assert_eq!(
            resolve_errors("print this;"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );

        assert_eq!(
            resolve_errors("fun f() { return this; }"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );
    }

    #[test]
    fn test_super_misuse() {
        assert_eq!(
            resolve_errors("super.m();"),
            vec!["[line 1] Error at 'super': Can't use 'super' outside of a class."]
        );

        assert_eq!(
            resolve_errors("class A { m() { super.m(); } }"),
            vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
        );

        assert!(resolve_errors("class A {} class B < A { m() { super.m(); } }").is_empty());
    }

    #[test]
    fn test_class_inheriting_from_itself() {
        assert_eq!(
            resolve_errors("class A < A {}"),
            vec!["[line 1] Error at 'A': A class can't inherit from itself."]
        );
    }

    #[test]
    fn test_errors_accumulate() {
        assert_eq!(
            resolve_errors("return 1;\nprint this;\n{ var b = b; }"),
            vec![
                "[line 1] Error at 'return': Can't return from top-level code.",
                "[line 2] Error at 'this': Can't use 'this' outside of a class.",
                "[line 3] Error at 'b': Can't read local variable in its own initializer.",
            ]
        );
    }
}

use crate::{
    analysis::{analyze, Facts},
    options::Options,
    passes::{self, PassContext},
    registry::Registry,
};
use ast::{Program, ProgramData};
use tracing::{debug, warn};

/// Optimizes `program` in place. Returns whether anything changed.
///
/// The program is analyzed until the facts about function boundaries stop
/// changing, then the first pass that finds something to do rewrites it and
/// the analysis starts over from scratch. Programs that use `with` or direct
/// `eval` are left alone.
pub fn optimize(program: &mut Program, program_data: &mut ProgramData, options: &Options) -> bool {
    let mut registry = Registry::default();
    let mut facts = Facts::default();
    let mut changed = false;

    for round in 0..options.max_iterations {
        let result = analyze(program, options, &mut registry, &facts);
        if round == 0 && result.scopes.has_with_or_eval {
            debug!("program uses `with` or direct `eval`; not optimizing");
            return false;
        }
        if result.facts != facts {
            facts = result.facts;
            continue;
        }

        let cx = PassContext {
            options,
            result: &result,
            registry: &registry,
        };
        match passes::run(program, program_data, &cx) {
            Some(pass) => {
                debug!(round, pass, "rewrote program");
                changed = true;
                // The old facts describe nodes that may no longer exist.
                facts = Facts::default();
            }
            None => {
                debug!(round, "reached fixed point");
                return changed;
            }
        }
    }

    warn!(
        "stopped after {} rounds without reaching a fixed point",
        options.max_iterations
    );
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_transform;

    #[test]
    fn constant_variable() {
        test_transform(
            Options::trusting(),
            "var x = 1; console.log(x);",
            "console.log(1);",
        );
    }

    #[test]
    fn constant_branch() {
        test_transform(
            Options::trusting(),
            "if (true) { console.log(1); } else { console.log(2); }",
            "console.log(1);",
        );
    }

    #[test]
    fn property_store_and_read() {
        test_transform(
            Options::trusting(),
            "var o = { x: 1 }; o.x = 2; console.log(o.x);",
            "console.log(2);",
        );
    }

    #[test]
    fn pure_call() {
        test_transform(
            Options::trusting(),
            "function f(a) { return a + 1; } console.log(f(1));",
            "console.log(2);",
        );
    }

    #[test]
    fn for_in_over_known_object() {
        test_transform(
            Options::trusting(),
            "var o = { a: 1, b: 2 }; for (var k in o) { console.log(k); }",
            "console.log('a'); console.log('b');",
        );
    }

    #[test]
    fn with_statement_disables_everything() {
        let src = "var x = 1; with (o) { foo(x); }";
        test_transform(Options::trusting(), src, src);
    }

    #[test]
    fn direct_eval_disables_everything() {
        let src = "var x = 1; eval('x'); foo(x);";
        test_transform(Options::trusting(), src, src);
    }

    #[test]
    fn escaped_object_is_not_folded() {
        let src = "var o = { x: 1 }; foo(o); console.log(o.x);";
        test_transform(Options::trusting(), src, src);
    }

    fn fold_only() -> Options {
        Options {
            passes: crate::options::PassConfig {
                fold_constants: true,
                ..crate::options::PassConfig::none()
            },
            ..Options::trusting()
        }
    }

    #[test]
    fn global_mutated_by_called_function() {
        let src = "var o = { x: 1 }; function g() { o.x = 5; } g(); console.log(o.x);";
        test_transform(fold_only(), src, src);
    }

    #[test]
    fn global_mutated_by_escaped_function() {
        let src = "var o = { x: 1 }; var g = function () { o.x = 5; }; foo(g); console.log(o.x);";
        test_transform(fold_only(), src, src);
    }

    #[test]
    fn untrusted_globals_are_kept() {
        test_transform(
            Options::default(),
            "var x = 1; function f() { var y = 2; return y; } foo(f);",
            "var x = 1; function f() { return 2; } foo(f);",
        );
    }

    #[test]
    fn iteration_cap() {
        let mut program_data = ProgramData::default();
        let mut program = parser::parse_program("var x = 1; foo(x);", &mut program_data)
            .expect("failed to parse");
        let options = Options {
            max_iterations: 0,
            ..Options::trusting()
        };
        assert!(!optimize(&mut program, &mut program_data, &options));
    }
}

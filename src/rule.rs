use crate::cursor::Input;
use crate::logging::Loggable;
use crate::output::Output;

/// Runs the body of a named grammar rule.
///
/// The rule occupies one unit of the nesting budget while its body runs. If the
/// budget is already spent, or the native stack has grown past the stack budget,
/// the rule fails at once. On the way out the remainder gets the caller's nesting
/// level back, and a failure always reports the cursor the rule was entered with.
pub fn rule<'a, T>(
    name: &'static str,
    input: Input<'a>,
    body: impl FnOnce(Input<'a>) -> Output<'a, T>,
) -> Output<'a, T> {
    let marker = 0u8;
    let stack_pos = std::ptr::addr_of!(marker) as usize;
    let Some(inner) = input.descend(stack_pos) else {
        input.log_exhausted(name);
        return Output::failure(input);
    };
    inner.log_enter(name);
    let out = body(inner);
    if out.is_success() {
        let remainder = out.remainder();
        inner.log_success(name, inner.span_to(&remainder));
        out.with_remainder(remainder.ascend_to(&input))
    } else {
        inner.log_failure(name, out.furthest());
        Output::failure(input).reach(out.furthest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseOptions;
    use crate::cst::Terminal;
    use crate::parser::Parser;
    use crate::terminal::literal;
    use test_log::test;

    // nested = "(" [ nested ] ")"
    fn nested<'a>(input: Input<'a>) -> Output<'a, usize> {
        rule("nested", input, |i| {
            literal("(")
                .then(nested.opt())
                .then(literal(")"))
                .map(|((_, inner), _): ((Terminal, Option<usize>), Terminal)| {
                    inner.map_or(1, |n| n + 1)
                })
                .parse(i)
        })
    }

    #[test]
    fn test_recursion() {
        let out = nested(Input::new("((()))x"));
        assert_eq!(out.value(), Some(&3));
        assert_eq!(out.remainder().rest(), "x");
        assert_eq!(out.remainder().depth(), 0);

        let inp = Input::new("((x");
        let out = nested(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);
        assert_eq!(out.furthest(), 2);
    }

    #[test]
    fn test_depth_budget() {
        let deep = "(".repeat(50) + &")".repeat(50);
        let opts = ParseOptions::default().with_max_depth(10);
        let inp = Input::with_options(&deep, &opts);
        let out = nested(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);

        let shallow = "(".repeat(10) + &")".repeat(10);
        let out = nested(Input::with_options(&shallow, &opts));
        assert_eq!(out.value(), Some(&10));
    }

    #[test]
    fn test_stack_budget() {
        // far more nesting than the depth budget would stop, on a small stack
        let deep = "(".repeat(100_000) + &")".repeat(100_000);
        let opts = ParseOptions::default()
            .with_max_depth(u32::MAX)
            .with_max_stack(256 * 1024);
        let handle = std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(move || {
                let inp = Input::with_options(&deep, &opts);
                let out = nested(inp);
                (out.is_success(), out.remainder() == inp)
            })
            .unwrap();
        assert_eq!(handle.join().unwrap(), (false, true));

        let shallow = "(".repeat(5) + &")".repeat(5);
        let out = nested(Input::with_options(&shallow, &opts));
        assert_eq!(out.value(), Some(&5));
    }
}

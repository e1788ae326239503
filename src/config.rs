/// Default nesting budget: the number of rule invocations that may be active at once.
pub const DEFAULT_MAX_DEPTH: u32 = 256;

/// Default stack budget in bytes, measured from the outermost rule invocation.
///
/// Sits well inside the 2 MiB that `std::thread` gives a spawned thread, leaving
/// room for the caller's own frames and for the frames of the rule that trips it.
pub const DEFAULT_MAX_STACK: usize = 1536 * 1024;

/// Settings applied to a single parse.
///
/// Every rule invocation consumes one unit of the depth budget for as long as it is
/// active. Independently of that count, a rule is refused once the native stack has
/// grown by more than `max_stack` bytes since the outermost rule was entered. Frame
/// sizes differ between debug and release builds, so the depth count alone cannot
/// bound stack use. Either budget running out makes the rule fail instead of
/// recursing further, so adversarially nested input (`((((((...`) cannot overflow
/// the native stack.
///
/// Callers parsing on a thread with a smaller stack than the default should lower
/// `max_stack` to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub max_depth: u32,
    pub max_stack: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_stack: DEFAULT_MAX_STACK,
        }
    }
}

impl ParseOptions {
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_stack(mut self, max_stack: usize) -> Self {
        self.max_stack = max_stack;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_options() {
        let opts = ParseOptions::default();
        assert_eq!(opts.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(opts.max_stack, DEFAULT_MAX_STACK);
        assert_eq!(opts.with_max_depth(3).max_depth, 3);
        let opts = opts.with_max_stack(64 * 1024);
        assert_eq!(opts.max_stack, 64 * 1024);
        assert_eq!(opts.max_depth, DEFAULT_MAX_DEPTH);
    }
}

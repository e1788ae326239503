use log::Level::Trace;
use log::{debug, log_enabled, trace};

use crate::cursor::Input;
use crate::{util, LOG_TARGET};

/// Rule-level tracing. Each line shows the upcoming input, the nesting depth and
/// the rule, so a `RUST_LOG=odata=trace` run reads as an indented parse trace.
pub(crate) trait Loggable {
    const LABEL_WIDTH: usize = 28;
    const INPUT_WIDTH: usize = 35;
    fn log_enter(&self, rule: &str);
    fn log_success(&self, rule: &str, consumed: &str);
    fn log_failure(&self, rule: &str, furthest: usize);
    fn log_exhausted(&self, rule: &str);
}

impl<'a> Loggable for Input<'a> {
    fn log_enter(&self, rule: &str) {
        if log_enabled!(target: LOG_TARGET, Trace) {
            trace!(
                target: LOG_TARGET,
                "{inp:<iw$} {depth:>4} {label:<lw$} : enter",
                iw = Self::INPUT_WIDTH,
                lw = Self::LABEL_WIDTH,
                depth = self.depth(),
                label = format!("{:indent$}{rule}", "", indent = self.depth() as usize % 40),
                inp = util::formatter_str(self.rest()),
            );
        }
    }

    fn log_success(&self, rule: &str, consumed: &str) {
        if log_enabled!(target: LOG_TARGET, Trace) {
            trace!(
                target: LOG_TARGET,
                "{inp:<iw$} {depth:>4} {label:<lw$} : ok -> {res}",
                iw = Self::INPUT_WIDTH,
                lw = Self::LABEL_WIDTH,
                depth = self.depth(),
                label = format!("{:indent$}{rule}", "", indent = self.depth() as usize % 40),
                inp = util::formatter_str(self.rest()),
                res = util::formatter_str(consumed).trim_end(),
            );
        }
    }

    fn log_failure(&self, rule: &str, furthest: usize) {
        if log_enabled!(target: LOG_TARGET, Trace) {
            trace!(
                target: LOG_TARGET,
                "{inp:<iw$} {depth:>4} {label:<lw$} : no match (furthest {furthest})",
                iw = Self::INPUT_WIDTH,
                lw = Self::LABEL_WIDTH,
                depth = self.depth(),
                label = format!("{:indent$}{rule}", "", indent = self.depth() as usize % 40),
                inp = util::formatter_str(self.rest()),
            );
        }
    }

    fn log_exhausted(&self, rule: &str) {
        debug!(
            target: LOG_TARGET,
            "nesting budget ({max} rules, {stack} stack bytes) spent at offset {offset} entering {rule}",
            max = self.max_depth(),
            stack = self.max_stack(),
            offset = self.offset(),
        );
    }
}

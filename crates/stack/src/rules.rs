//! Ordered decision tables evaluated first-match-wins.
//!
//! Package manager selection, runtime version resolution and framework
//! classification are all expressed as static slices of rules. The position of
//! a rule in its table is its priority; [`first_match`] walks the table and
//! stops at the first rule that produces an outcome.

use tracing::trace;

pub trait Rule<C: ?Sized> {
    type Output;

    /// Short label used in logs
    fn name(&self) -> &str;

    fn evaluate(&self, ctx: &C) -> Option<Self::Output>;
}

/// Evaluate `rules` in order and return the first outcome with the rule that produced it.
pub fn first_match<'r, C, R>(rules: &'r [R], ctx: &C) -> Option<(&'r R, R::Output)>
where
    C: ?Sized,
    R: Rule<C>,
{
    for rule in rules {
        if let Some(output) = rule.evaluate(ctx) {
            trace!(rule = rule.name(), "Rule matched");
            return Some((rule, output));
        }
    }
    None
}

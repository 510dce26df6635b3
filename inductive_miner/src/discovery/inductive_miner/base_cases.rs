use crate::event_log::uvcl_struct::{Activity, UVCL};

/// Result of a base case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseCase {
    /// The log has no behavior: a silent step
    Empty,
    /// Every trace consists of the same single activity
    SingleActivity(Activity),
}

///
/// Detect a base case of the Inductive Miner
///
/// - a log without traces, or with only empty traces, is [`BaseCase::Empty`]
/// - a log `{(a): n}` is [`BaseCase::SingleActivity`]
///
pub fn find_base_case(log: &UVCL) -> Option<BaseCase> {
    if log.iter().all(|(variant, _)| variant.is_empty()) {
        return Some(BaseCase::Empty);
    }
    match log.variants.keys().collect::<Vec<_>>().as_slice() {
        [variant] => match variant.as_slice() {
            [a] => Some(BaseCase::SingleActivity(a.clone())),
            _ => None,
        },
        _ => None,
    }
}

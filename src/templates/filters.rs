//! Text filters available inside templates
//!
//! Plain functions over `&str`; the template environment registers thin
//! wrappers around them.

/// Times `repeat` concatenates when no count is given
pub const DEFAULT_REPEAT: usize = 2;

/// Characters in reverse order
pub fn reverse_string(s: &str) -> String {
    s.chars().rev().collect()
}

/// `s` concatenated with itself `times` times
pub fn repeat(s: &str, times: usize) -> String {
    s.repeat(times)
}

/// Uppercase at even character positions, lowercase at odd ones.
///
/// Positions are counted on the input, and full Unicode case mapping applies,
/// so `ß` at an even position becomes `SS` and the output grows.
pub fn alternate_case(s: &str) -> String {
    s.chars()
        .enumerate()
        .flat_map(|(i, c)| {
            let mapped: Vec<char> = if i % 2 == 0 {
                c.to_uppercase().collect()
            } else {
                c.to_lowercase().collect()
            };
            mapped
        })
        .collect()
}

/// `repeat` as exposed to templates, where the count is optional
pub(super) fn repeat_filter(s: &str, times: Option<usize>) -> String {
    repeat(s, times.unwrap_or(DEFAULT_REPEAT))
}

//! Direct balanced-bracket check.

use super::stack::{is_closer, is_opener, opener_for};

/// True iff every `( [ { <` is closed by its partner in LIFO order. Other bytes
/// are ignored.
pub fn is_balanced(input: &str) -> bool {
    let mut stack: Vec<u8> = Vec::new();

    for b in input.bytes() {
        if is_opener(b) {
            stack.push(b);
        } else if is_closer(b) {
            match stack.pop() {
                Some(open) if Some(open) == opener_for(b) => {}
                _ => return false,
            }
        }
    }

    stack.is_empty()
}

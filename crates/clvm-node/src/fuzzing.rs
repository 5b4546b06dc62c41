use arbitrary::Unstructured;

use crate::{Allocator, NodeError, NodePtr};

const MAX_OPS: usize = 10_000;

/// Builds a random tree out of fuzzer input.
///
/// Besides fresh atoms and pairs, the input can ask for an earlier node to be
/// pushed again, so the result shares sub-trees by identity.
pub fn make_tree(a: &mut Allocator, u: &mut Unstructured<'_>) -> Result<NodePtr, NodeError> {
    let mut stack = Vec::<NodePtr>::new();
    let mut history = Vec::<NodePtr>::new();

    for _ in 0..MAX_OPS {
        if u.is_empty() {
            break;
        }
        let Ok(op) = u.int_in_range::<u8>(0..=3) else {
            break;
        };
        let node = match op {
            0 => {
                let len = u.int_in_range::<usize>(0..=300).unwrap_or(0);
                let bytes = u.bytes(len).unwrap_or_default();
                a.new_atom(bytes)?
            }
            1 => {
                let byte = u.arbitrary::<u8>().unwrap_or(0);
                a.new_atom(&[byte])?
            }
            2 => {
                if stack.len() < 2 {
                    continue;
                }
                let rest = stack.pop().unwrap_or_default();
                let first = stack.pop().unwrap_or_default();
                a.new_pair(first, rest)?
            }
            _ => {
                if history.is_empty() {
                    continue;
                }
                let idx = u.choose_index(history.len()).unwrap_or(0);
                history[idx]
            }
        };
        stack.push(node);
        history.push(node);
    }

    while stack.len() > 1 {
        let rest = stack.pop().unwrap_or_default();
        let first = stack.pop().unwrap_or_default();
        stack.push(a.new_pair(first, rest)?);
    }
    Ok(stack.pop().unwrap_or_default())
}

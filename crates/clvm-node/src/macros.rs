/// Builds a proper list out of its arguments: each value becomes the first of
/// a pair whose rest holds the remaining values, and the last rest is `()`.
/// The result is a value for [`ToNode`](crate::ToNode).
#[macro_export]
macro_rules! node_list {
    () => {
        ()
    };
    ( $first:expr $( , $rest:expr )* $(,)? ) => {
        ($first, $crate::node_list!( $( $rest ),* ))
    };
}

/// Like [`node_list!`], except that the final argument takes the place of the
/// `()` terminator. `node_tuple!(1, 2)` is the pair `(1 . 2)`, and a single
/// argument is passed through as is.
#[macro_export]
macro_rules! node_tuple {
    () => {
        ()
    };
    ( $first:expr $(,)? ) => {
        $first
    };
    ( $first:expr $( , $rest:expr )* $(,)? ) => {
        ($first, $crate::node_tuple!( $( $rest ),* ))
    };
}

#[cfg(test)]
mod tests {
    use crate::{Allocator, FromNode, ToNode};

    #[test]
    fn test_node_list() {
        let a = &mut Allocator::new();
        let node = node_list!(1, "two", (3, 4)).to_node(a).unwrap();
        let items = a.list(node).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(<(u8, u8)>::from_node(a, items[2]).unwrap(), (3, 4));
        assert_eq!(node_list!().to_node(a).unwrap(), a.nil());
    }

    #[test]
    fn test_node_tuple() {
        let a = &mut Allocator::new();
        let node = node_tuple!(1, 2, 3).to_node(a).unwrap();
        let value = <(u8, (u8, u8))>::from_node(a, node).unwrap();
        assert_eq!(value, (1, (2, 3)));
        let single = node_tuple!(7).to_node(a).unwrap();
        assert_eq!(u8::from_node(a, single).unwrap(), 7);
    }
}

#![no_main]
use libfuzzer_sys::{arbitrary, fuzz_target};

use clvm_node::{Allocator, make_tree, node_eq};
use clvm_serialize::{
    has_backrefs, node_from_bytes, node_from_bytes_backrefs, node_to_bytes,
    node_to_bytes_backrefs, node_to_bytes_limit, serialized_length_from_bytes,
};

fuzz_target!(|data: &[u8]| {
    let mut a = Allocator::new();
    let mut unstructured = arbitrary::Unstructured::new(data);
    let Ok(input) = make_tree(&mut a, &mut unstructured) else {
        return;
    };

    // shared sub-trees can make the expanded tree exponentially large
    let Ok(plain) = node_to_bytes_limit(&a, input, 1 << 24) else {
        return;
    };
    assert_eq!(
        serialized_length_from_bytes(&plain).expect("serialized_length_from_bytes"),
        plain.len() as u64
    );
    let mut b = Allocator::new();
    let output = node_from_bytes(&mut b, &plain).expect("node_from_bytes");
    assert!(node_eq(&a, input, &b, output));

    let compressed = node_to_bytes_backrefs(&a, input).expect("node_to_bytes_backrefs");
    assert!(compressed.len() <= plain.len());
    if has_backrefs(&compressed).expect("has_backrefs") {
        assert!(compressed.len() < plain.len());
        assert!(node_from_bytes(&mut b, &compressed).is_err());
    }
    let mut b = Allocator::new();
    let output = node_from_bytes_backrefs(&mut b, &compressed).expect("node_from_bytes_backrefs");
    assert!(node_eq(&a, input, &b, output));
    assert_eq!(node_to_bytes(&b, output).expect("node_to_bytes"), plain);
});

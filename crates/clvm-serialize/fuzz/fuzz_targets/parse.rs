#![no_main]
use libfuzzer_sys::fuzz_target;

use clvm_node::{Allocator, node_eq};
use clvm_serialize::{
    ALLOW_BACKREFS, node_buffer_from_stream, node_from_bytes_backrefs, node_from_stream_flags,
    node_to_bytes_backrefs, serialized_length_from_bytes_flags,
};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    for flags in [0, ALLOW_BACKREFS] {
        let mut a = Allocator::new_limited(1 << 20);
        let mut cursor = Cursor::new(data);
        let decoded = node_from_stream_flags(&mut a, &mut cursor, flags);
        let length = serialized_length_from_bytes_flags(data, flags);

        let mut cursor2 = Cursor::new(data);
        let buffer = node_buffer_from_stream(&mut cursor2, flags);

        let Ok(node) = decoded else {
            continue;
        };
        // whatever the decoder accepts, the scanner accepts too, and both
        // stop at the same byte
        let length = length.expect("serialized_length_from_bytes_flags");
        assert_eq!(length, cursor.position());
        assert_eq!(buffer.expect("node_buffer_from_stream"), &data[..length as usize]);

        let bytes = node_to_bytes_backrefs(&a, node).expect("node_to_bytes_backrefs");
        let mut b = Allocator::new();
        let output = node_from_bytes_backrefs(&mut b, &bytes).expect("node_from_bytes_backrefs");
        assert!(node_eq(&a, node, &b, output));
    }
});

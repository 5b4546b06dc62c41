// flags controlling how serialized trees are parsed

// when this flag is set, the serialization is allowed to contain
// back-references
pub const ALLOW_BACKREFS: u32 = 0x0200_0000;

//! Interned strings for identifiers, property names and string literals.

include!(concat!(env!("OUT_DIR"), "/js_word.rs"));

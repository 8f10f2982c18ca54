//! Driver type registry.
//!
//! Rows arrive from the database in a nullable wire form. The driver says,
//! for each supported Rust type, what that wire form is and which snippets
//! decode it into the native value and encode a native value for binding.

use rustc_hash::FxHashMap;

/// Wire representation of a native Rust type.
///
/// `decode` and `encode` are expression templates. `{src}` is replaced with
/// the source expression and `{column}` with the column name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NullableType {
    pub native: String,
    pub nullable: String,
    pub decode: String,
    pub encode: String,
}

impl NullableType {
    /// Expression turning the nullable value `src` into the native value.
    pub fn decode(&self, src: &str, column: &str) -> String {
        self.decode.replace("{src}", src).replace("{column}", column)
    }

    /// Expression binding the native value `src` as a query argument.
    pub fn encode(&self, src: &str) -> String {
        self.encode.replace("{src}", src)
    }
}

pub trait Driver: Send + Sync {
    fn name(&self) -> &str;

    /// Look up a native type such as `i64` or `Vec<u8>`. Whitespace inside
    /// the type is not significant.
    fn lookup_nullable_type(&self, native: &str) -> Option<NullableType>;
}

/// Scalar types every driver is expected to handle.
const STANDARD_TYPES: &[&str] = &[
    "bool", "i16", "i32", "i64", "f32", "f64", "String", "Vec<u8>",
];

/// Driver covering the standard scalar types.
#[derive(Clone, Debug)]
pub struct StandardDriver {
    types: FxHashMap<String, NullableType>,
}

impl StandardDriver {
    pub const NAME: &'static str = "standard";

    pub fn new() -> Self {
        let types = STANDARD_TYPES
            .iter()
            .map(|native| {
                let ty = NullableType {
                    native: (*native).to_string(),
                    nullable: format!("Option<{native}>"),
                    decode: "qlgen::required({src}, \"{column}\")?".to_string(),
                    encode: "&{src}".to_string(),
                };
                ((*native).to_string(), ty)
            })
            .collect();
        StandardDriver { types }
    }
}

impl Default for StandardDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for StandardDriver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn lookup_nullable_type(&self, native: &str) -> Option<NullableType> {
        let key: String = native.split_whitespace().collect();
        self.types.get(&key).cloned()
    }
}

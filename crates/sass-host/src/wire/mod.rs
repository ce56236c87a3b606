//! Translation between protocol messages and host types.
//!
//! Pure and stateless, except that decoding tracks which argument
//! lists it produced so their keyword accesses can be reported back to
//! the compiler.

pub(crate) mod decode;
pub(crate) mod encode;

//! Per-language extraction rule tables.
//!
//! Each module exposes a `RULES` table consumed by the syntax walker.
//! TypeScript and TSX share the JavaScript table; C and C++ share one table;
//! languages without bespoke rules use `generic`.

pub mod c_family;
pub mod generic;
pub mod go;
pub mod java;
pub mod javascript;
pub mod php;
pub mod python;
pub mod ruby;
pub mod rust_lang;

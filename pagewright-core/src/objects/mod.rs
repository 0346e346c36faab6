mod dictionary;
mod name;
mod primitive;
mod stream;
mod string;

pub use dictionary::Dictionary;
pub use name::{escape_name, unescape_name};
pub use primitive::{Object, ObjectId};
pub use stream::Stream;
pub use string::{decode_text, encode_text, HexString};

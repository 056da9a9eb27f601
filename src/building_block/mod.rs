pub mod circuit;
pub mod combined_key;
pub mod evaluate;
pub mod garble;
pub mod garbled_table;
pub mod gate;
pub mod ot;
pub mod row_cipher;
pub mod util;
pub mod wire_label;

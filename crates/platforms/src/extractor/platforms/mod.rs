pub mod kakaotv;

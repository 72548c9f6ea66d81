pub mod alert;
pub mod employee;
pub mod product;
pub mod restock;

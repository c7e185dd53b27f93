pub mod excel_write;
pub mod fetch;
pub mod gviz;

pub mod csv_parser;
pub mod stock_store;

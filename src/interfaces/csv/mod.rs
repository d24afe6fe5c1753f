pub mod delivery_writer;
pub mod script_reader;

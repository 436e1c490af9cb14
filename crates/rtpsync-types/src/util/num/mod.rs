pub mod dec_spec;

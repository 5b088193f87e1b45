/// Tracing subscriber setup: console layer plus optional rolling JSON files.
pub mod loggerlocal;

pub mod engine;
pub(crate) mod worker;

#[cfg(test)]
pub(crate) mod testing;

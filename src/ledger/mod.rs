pub mod aggregation;
pub mod filter;
pub mod settlement;

#[cfg(test)]
pub(crate) mod test_support;

/// A module containing exact inference on discrete factor graphs by variable elimination
pub mod core;
/// A module containing the population counting model built on top of the exact engine
pub mod counting;

#[cfg(test)]
mod tests;

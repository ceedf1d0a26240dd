pub mod grid;
pub mod morton;

#[cfg(test)]
mod grid_test;

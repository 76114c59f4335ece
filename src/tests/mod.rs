mod discrete_tests;
mod elimination_tests;
mod factor_tests;
mod property_tests;
mod utils;

pub mod position_test;

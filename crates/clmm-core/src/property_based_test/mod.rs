pub mod pool_property_tests;

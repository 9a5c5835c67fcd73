//! Transaction test suite

mod transaction_tests;

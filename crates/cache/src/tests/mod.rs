pub mod test_mocks;

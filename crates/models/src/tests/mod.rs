/// Entity CRUD against a live Postgres
pub mod crud_tests;

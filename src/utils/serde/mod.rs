mod u256_deserializer;
pub use u256_deserializer::*;

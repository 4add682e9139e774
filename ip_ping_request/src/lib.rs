pub mod checksum;
pub mod ping;

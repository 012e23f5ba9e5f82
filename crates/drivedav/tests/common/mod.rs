pub mod harness;

pub use harness::TestServer;

pub mod push_server;

pub mod generate;
pub mod init_config;
pub mod modules;
pub mod prerequisites;

pub mod import;
pub mod init;
pub mod schemes;
pub mod sheet;
pub mod validate;

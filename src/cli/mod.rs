pub mod approve;
pub mod init;
pub mod next;
pub mod regenerate;
pub mod show;
pub mod status;

pub mod buttons;
pub mod check;
pub mod config;
pub mod init;
pub mod login;
pub mod logout;
pub mod menus;
pub mod refresh;
pub mod whoami;

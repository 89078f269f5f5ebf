pub mod fxa;

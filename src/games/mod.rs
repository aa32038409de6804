pub mod snakego;

#![doc = include_str!("../README.md")]

mod error;

pub mod framing;
pub mod lab;
pub mod rdb;
pub mod subtap;

pub use error::{Error, Result};

#![allow(dead_code)]

pub mod db;

pub use db::TestDb;

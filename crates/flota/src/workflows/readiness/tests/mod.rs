mod common;

mod service;

pub mod demo;

pub use demo::{DemoApp, DemoReport, PipelineReport};

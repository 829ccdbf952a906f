//! # Processing Module
//!
//! Turns the current overlay into an exported cut-out and delivers it to the configured
//! sinks.

pub mod export;

pub use export::{
    ExportMultiplexer, ExportReport, HttpMaskSink, LocalFileSink, MaskSink, SinkKind,
    SinkOutcome, SinkReceipt,
};

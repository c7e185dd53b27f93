//! Core library for the rent-invoice command line application.
//!
//! The library turns a cell range of a link-shared Google Sheet into room
//! records and renders monthly rent invoices from them. Range and URL handling
//! lives in [`boarding::invoice::range`], header matching in
//! [`boarding::invoice::header`], the network exchange and record extraction
//! under [`boarding::invoice::io`], and invoice output in
//! [`boarding::invoice::render`] and [`boarding::invoice::draft`].

pub mod boarding;

pub use boarding::invoice::{
    FailureKind, InvoiceError, Result, draft, error, header, io, model, range, render, settings,
    sync,
};

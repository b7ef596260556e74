//! Statistical Model Nodes
//!
//! Connectable implementations that estimate model parameters from the data
//! arriving on their input sockets and serve diagnostic series (fitted
//! values, residuals) on their outputs. Models accept univariate series or
//! longitudinal (panel) data; a panel is fitted under shared coefficients
//! by pooling observations across its members.

mod autoregressive;

pub use autoregressive::{AutoregressiveModel, FitMethod};

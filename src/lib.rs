//! Exchange a GitHub App private key for an installation access token and
//! publish it as a masked workflow output.

pub mod actions;
pub mod config;
pub mod env;
pub mod error;
pub mod exchange;
pub mod git;
pub mod github;
pub mod installation;
pub mod jwt;
pub mod key;
pub mod pipeline;
pub mod publish;
pub mod redact;

pub use config::{Inputs, RawInputs};
pub use error::{Error, Result};
pub use pipeline::{run, Outcome};

//! Shared tideline data model, configuration primitives, and the unified error type.
#![warn(missing_docs)]

mod config;
mod error;
mod record;
mod reports;
mod request;
mod role;
mod samples;
mod settings;
pub mod time_format;

pub use config::TidelineConfig;
pub use error::TidelineError;
pub use record::{RawRecord, Record};
pub use reports::AggregateReport;
pub use request::{DataRequest, Include, Window};
pub use role::Role;
pub use samples::{BasalBucket, BasalSample, CbgBucket, CbgSample, DeliveryType};
pub use settings::{
    BasalSecurityProfile, ParameterChange, ParameterChangeGroup, ParameterHistory, PumpSettings,
};

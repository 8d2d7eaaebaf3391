//! # Meridian HL7 v2
//!
//! An immutable HL7 v2.x message tree with an ER7 (pipe-delimited) parser and
//! serializer, plus the message-level operations built on it:
//!
//! - [`generate_ack`]: original-mode acknowledgments (`MSH` + `MSA`), read
//!   back with [`read_ack`] and [`extract_ack_errors`]
//! - [`create_batch`] / [`split_batch`]: `BHS`/`BTS` batch envelopes
//! - [`compare`]: positional diff with a text and JSON report
//! - [`merge`] / [`merge_by_segment_type`]: folding several messages into one
//! - [`json`]: a lossless JSON form of the tree
//!
//! ```
//! use meridian_hl7v2::{AckCode, AckOptions, generate_ack, parse, to_er7};
//!
//! let message = parse("MSH|^~\\&|SND|FAC|RCV|FAC|20240101120000||ADT^A01|MSG00001|P|2.5\rPID|1\r")?;
//! let ack = generate_ack(&message, AckCode::Accept, &AckOptions::default())?;
//! assert_eq!(ack.msh().unwrap().field(3).value(), "RCV");
//! assert!(to_er7(&ack)?.contains("\rMSA|AA|MSG00001\r"));
//! # Ok::<(), meridian_hl7v2::Hl7Error>(())
//! ```

pub mod ack;
pub mod batch;
pub mod diff;
pub mod encoding;
pub mod error;
pub mod escape;
pub mod json;
pub mod merge;
pub mod model;
pub mod parser;
pub mod serializer;

pub use ack::{AckCode, AckOptions, AckStatus, extract_ack_errors, generate_ack, read_ack};
pub use batch::{BatchOptions, batch_to_er7, create_batch, split_batch, validate_batch};
pub use diff::{FieldDifference, MessageDiff, SegmentDifference, compare};
pub use encoding::EncodingCharacters;
pub use error::{Hl7Error, Result};
pub use merge::{MergeStrategy, merge, merge_by_segment_type};
pub use model::{Component, Field, Message, Segment, Subcomponent};
pub use parser::{ParseOptions, parse, parse_with};
pub use serializer::to_er7;

//! Submission assembly, queries and review

mod assembler;

pub use assembler::SubmissionAssembler;
